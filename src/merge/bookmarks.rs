//! Document outline (bookmarks).
//!
//! The outline mirrors the visible TOC entries: one item per entry,
//! nested by level, each pointing at the first page of its section.

use crate::error::{BinderError, Result};
use crate::utils::pdf_text_string;
use crate::walk::TocEntry;
use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId};

struct OutlineNode<'e> {
    title: &'e str,
    page_id: ObjectId,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Builds the outline tree of the output document.
#[derive(Debug, Default)]
pub struct OutlineBuilder;

impl OutlineBuilder {
    /// Create a new outline builder.
    pub fn new() -> Self {
        Self
    }

    /// Add an outline built from `entries` to `doc`.
    ///
    /// Hidden entries are skipped, as are entries whose page does not
    /// exist in `page_ids` (a section whose files were all missing at the
    /// end of the document). An entry becomes a child of the closest
    /// preceding entry with a lower level. All items are open.
    ///
    /// Returns the number of outline items written.
    ///
    /// # Errors
    ///
    /// Returns [`BinderError::OutlineFailed`] if the catalog cannot be
    /// updated.
    pub fn add_outline<'e>(
        &self,
        doc: &mut Document,
        entries: impl IntoIterator<Item = &'e TocEntry>,
        page_ids: &[ObjectId],
    ) -> Result<usize> {
        let mut nodes: Vec<OutlineNode<'e>> = Vec::new();
        let mut roots = Vec::new();
        let mut stack: Vec<(u32, usize)> = Vec::new();

        for entry in entries.into_iter().filter(|e| e.visible) {
            let Some(&page_id) = page_ids.get(entry.page_index() as usize) else {
                debug!("Skipping outline item {:?}: no page {}", entry.title, entry.page);
                continue;
            };

            while stack.last().is_some_and(|&(level, _)| level >= entry.level) {
                stack.pop();
            }

            let index = nodes.len();
            let parent = stack.last().map(|&(_, parent)| parent);
            match parent {
                Some(parent) => nodes[parent].children.push(index),
                None => roots.push(index),
            }
            nodes.push(OutlineNode {
                title: &entry.title,
                page_id,
                parent,
                children: Vec::new(),
            });
            stack.push((entry.level, index));
        }

        if nodes.is_empty() {
            return Ok(0);
        }

        let outline_id = doc.new_object_id();
        let ids: Vec<ObjectId> = nodes.iter().map(|_| doc.new_object_id()).collect();

        // Children always follow their parent, so one reverse pass sums
        // every subtree.
        let mut descendants = vec![0_i64; nodes.len()];
        for index in (0..nodes.len()).rev() {
            let count = nodes[index]
                .children
                .iter()
                .map(|&child| 1 + descendants[child])
                .sum();
            descendants[index] = count;
        }

        for (index, node) in nodes.iter().enumerate() {
            let siblings = match node.parent {
                Some(parent) => &nodes[parent].children,
                None => &roots,
            };
            let position = siblings.iter().position(|&s| s == index).unwrap_or(0);

            let mut item = Dictionary::new();
            item.set("Title", pdf_text_string(node.title));
            item.set(
                "Parent",
                Object::Reference(node.parent.map_or(outline_id, |parent| ids[parent])),
            );
            item.set(
                "Dest",
                Object::Array(vec![
                    Object::Reference(node.page_id),
                    Object::Name(b"XYZ".to_vec()),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ]),
            );
            if position > 0 {
                item.set("Prev", Object::Reference(ids[siblings[position - 1]]));
            }
            if let Some(&next) = siblings.get(position + 1) {
                item.set("Next", Object::Reference(ids[next]));
            }
            if let (Some(&first), Some(&last)) = (node.children.first(), node.children.last()) {
                item.set("First", Object::Reference(ids[first]));
                item.set("Last", Object::Reference(ids[last]));
                item.set("Count", Object::Integer(descendants[index]));
            }

            doc.objects.insert(ids[index], Object::Dictionary(item));
        }

        let mut outline = Dictionary::new();
        outline.set("Type", Object::Name(b"Outlines".to_vec()));
        outline.set("Count", Object::Integer(nodes.len() as i64));
        if let (Some(&first), Some(&last)) = (roots.first(), roots.last()) {
            outline.set("First", Object::Reference(ids[first]));
            outline.set("Last", Object::Reference(ids[last]));
        }
        doc.objects.insert(outline_id, Object::Dictionary(outline));

        let catalog = doc
            .catalog_mut()
            .map_err(|e| BinderError::outline_failed(format!("Failed to get catalog: {e}")))?;
        catalog.set("Outlines", Object::Reference(outline_id));
        catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

        debug!("Wrote outline with {} item(s)", nodes.len());
        Ok(nodes.len())
    }

    /// Check if a document has an outline.
    pub fn has_outline(&self, doc: &Document) -> bool {
        doc.catalog()
            .map(|catalog| catalog.has(b"Outlines"))
            .unwrap_or(false)
    }
}
