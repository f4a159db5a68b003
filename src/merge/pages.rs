//! Output page tree.
//!
//! This module handles page-level operations including:
//! - Appending every page of a source document
//! - Inserting blank pages at an index
//! - Page tree bookkeeping (Kids and Count)

use crate::error::{BinderError, Result};
use log::{debug, trace};
use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::HashMap;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Parent chains longer than this are treated as malformed.
const MAX_TREE_DEPTH: usize = 64;

/// The document being assembled.
///
/// Pages are kept under a single flat Pages node; `page_ids` mirrors its
/// Kids array in order.
#[derive(Debug)]
pub struct OutputDocument {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl OutputDocument {
    /// Create an empty document with a catalog and an empty page tree.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Object id of the page at zero-based `index`.
    pub fn page_id(&self, index: usize) -> Option<ObjectId> {
        self.page_ids.get(index).copied()
    }

    /// All page object ids in order.
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    /// The underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the underlying document.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Append every page of `source`.
    ///
    /// Source objects are renumbered above the current maximum id, so
    /// annotations and explicit link destinations between the source's own
    /// pages stay valid. Links to named destinations are rewritten to the
    /// explicit destination the source's catalog maps the name to, since the
    /// source catalog is not carried over. Inherited page attributes are
    /// copied onto each page before it is moved under the output page tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the output page tree is missing.
    pub fn append_document(&mut self, mut source: Document) -> Result<usize> {
        source.renumber_objects_with(self.document.max_id + 1);

        let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();

        let destinations = named_destinations(&source);
        if !destinations.is_empty() {
            let rewritten = resolve_named_links(&mut source, &source_pages, &destinations);
            debug!(
                "Resolved {rewritten} link(s) against {} named destination(s)",
                destinations.len()
            );
        }

        for &page_id in &source_pages {
            let inherited = inherited_attributes(&source, page_id);
            let page = source
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| BinderError::page_tree(format!("page {page_id:?}: {e}")))?;
            for (key, value) in inherited {
                page.set(key, value);
            }
            page.set("Parent", self.pages_id);
        }

        trace!(
            "Appending {} page(s), objects {}..={}",
            source_pages.len(),
            self.document.max_id + 1,
            source.max_id
        );

        self.document.max_id = self.document.max_id.max(source.max_id);
        self.document.objects.extend(source.objects);
        self.page_ids.extend_from_slice(&source_pages);
        self.sync_page_tree()?;

        Ok(source_pages.len())
    }

    /// Insert an empty page of `width` × `height` points at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is past the end of the document.
    pub fn insert_blank_page(&mut self, index: usize, width: f32, height: f32) -> Result<ObjectId> {
        if index > self.page_ids.len() {
            return Err(BinderError::page_tree(format!(
                "cannot insert page at index {index}, document has {} page(s)",
                self.page_ids.len()
            )));
        }

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => Dictionary::new(),
        });
        self.page_ids.insert(index, page_id);
        self.sync_page_tree()?;

        Ok(page_id)
    }

    /// Finish assembly and hand out the document.
    pub fn into_document(self) -> Document {
        self.document
    }

    fn sync_page_tree(&mut self) -> Result<()> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let count = self.page_ids.len() as i64;

        let pages = self
            .document
            .get_object_mut(self.pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| BinderError::page_tree(format!("Failed to get pages object: {e}")))?;
        pages.set("Kids", Object::Array(kids));
        pages.set("Count", Object::Integer(count));

        Ok(())
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Explicit destination array of a destination value, which is either the
/// array itself or a dictionary holding it under `/D`.
fn explicit_destination(doc: &Document, value: &Object) -> Option<Vec<Object>> {
    match resolve(doc, value) {
        Object::Array(dest) => Some(dest.clone()),
        Object::Dictionary(dict) => match resolve(doc, dict.get(b"D").ok()?) {
            Object::Array(dest) => Some(dest.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Named destinations of `doc`, from the catalog's `/Dests` dictionary and
/// the `/Names /Dests` name tree.
fn named_destinations(doc: &Document) -> HashMap<Vec<u8>, Vec<Object>> {
    let mut destinations = HashMap::new();
    let Ok(catalog) = doc.catalog() else {
        return destinations;
    };

    if let Ok(Object::Dictionary(dests)) = catalog.get(b"Dests").map(|o| resolve(doc, o)) {
        for (name, value) in dests.iter() {
            if let Some(dest) = explicit_destination(doc, value) {
                destinations.insert(name.clone(), dest);
            }
        }
    }

    let tree = catalog
        .get(b"Names")
        .map(|o| resolve(doc, o))
        .and_then(Object::as_dict)
        .and_then(|names| names.get(b"Dests"))
        .map(|o| resolve(doc, o));
    if let Ok(Object::Dictionary(root)) = tree {
        collect_name_tree(doc, root, 0, &mut destinations);
    }

    destinations
}

fn collect_name_tree(
    doc: &Document,
    node: &Dictionary,
    depth: usize,
    destinations: &mut HashMap<Vec<u8>, Vec<Object>>,
) {
    if depth > MAX_TREE_DEPTH {
        return;
    }

    if let Ok(Object::Array(pairs)) = node.get(b"Names").map(|o| resolve(doc, o)) {
        for pair in pairs.chunks_exact(2) {
            if let Object::String(key, _) = resolve(doc, &pair[0]) {
                if let Some(dest) = explicit_destination(doc, &pair[1]) {
                    destinations.insert(key.clone(), dest);
                }
            }
        }
    }

    if let Ok(Object::Array(kids)) = node.get(b"Kids").map(|o| resolve(doc, o)) {
        for kid in kids {
            if let Object::Dictionary(child) = resolve(doc, kid) {
                collect_name_tree(doc, child, depth + 1, destinations);
            }
        }
    }
}

/// Replace a named destination stored under `key` with its explicit array.
fn rewrite_destination(
    dict: &mut Dictionary,
    key: &[u8],
    destinations: &HashMap<Vec<u8>, Vec<Object>>,
) -> bool {
    let target = match dict.get(key) {
        Ok(Object::Name(name)) | Ok(Object::String(name, _)) => destinations.get(name).cloned(),
        _ => None,
    };
    match target {
        Some(dest) => {
            dict.set(key.to_vec(), Object::Array(dest));
            true
        }
        None => false,
    }
}

fn is_goto(action: &Dictionary) -> bool {
    matches!(action.get(b"S"), Ok(Object::Name(kind)) if kind.as_slice() == b"GoTo")
}

/// Rewrite the named destinations of the link annotations on `pages`.
///
/// Covers `/Dest` on the annotation and `/D` of a `/GoTo` action, inline or
/// indirect. Returns the number of destinations rewritten.
fn resolve_named_links(
    doc: &mut Document,
    pages: &[ObjectId],
    destinations: &HashMap<Vec<u8>, Vec<Object>>,
) -> usize {
    let mut annotations = Vec::new();
    for &page_id in pages {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };
        let Ok(Object::Array(annots)) = page.get(b"Annots").map(|o| resolve(doc, o)) else {
            continue;
        };
        annotations.extend(annots.iter().filter_map(|annot| annot.as_reference().ok()));
    }

    let mut rewritten = 0;
    for annot_id in annotations {
        let action_id = doc
            .get_dictionary(annot_id)
            .and_then(|annot| annot.get(b"A"))
            .and_then(Object::as_reference)
            .ok();

        if let Ok(annot) = doc.get_dictionary_mut(annot_id) {
            if rewrite_destination(annot, b"Dest", destinations) {
                rewritten += 1;
            }
            if let Ok(Object::Dictionary(action)) = annot.get_mut(b"A") {
                if is_goto(action) && rewrite_destination(action, b"D", destinations) {
                    rewritten += 1;
                }
            }
        }

        if let Some(action) = action_id.and_then(|id| doc.get_dictionary_mut(id).ok()) {
            if is_goto(action) && rewrite_destination(action, b"D", destinations) {
                rewritten += 1;
            }
        }
    }

    rewritten
}

/// Collect the inheritable attributes `page_id` lacks, from its nearest
/// ancestor that defines them.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let mut found = Vec::new();
    let Ok(page) = doc.get_dictionary(page_id) else {
        return found;
    };

    let mut missing: Vec<&'static [u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let Some(node) = parent.and_then(|id| doc.get_dictionary(id).ok()) else {
            break;
        };
        if missing.is_empty() {
            break;
        }

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    found
}
