//! Integration tests for pdfbinder.
//!
//! These tests exercise the full application flow on PDFs generated into a
//! temporary directory, next to a configuration file that refers to them.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use pdfbinder::config::{Config, ConfigFile, OverwriteMode};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Get the path to a test fixture in tests/fixtures/.
pub fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

/// Write a PDF with `pages` pages into `dir`.
///
/// Each page shows the file name and its page number.
pub fn write_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for number in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("{name} {number}"))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture directory");
    }
    doc.save(&path).expect("save fixture PDF");
    path
}

/// Write `binder.json` into `dir` and return its path.
pub fn write_config(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("binder.json");
    std::fs::write(&path, json).expect("write configuration");
    path
}

/// Load a configuration the way the CLI does, without prompting.
pub async fn load_config(path: &Path) -> Config {
    let file = ConfigFile::load(path).await.expect("load configuration");
    let mut config = Config::from_file(file).expect("build configuration");
    config.overwrite_mode = OverwriteMode::Force;
    config.quiet = true;
    config
}

/// One-based page number of every page object in `doc`.
pub fn page_numbers(doc: &Document) -> HashMap<ObjectId, u32> {
    doc.get_pages()
        .into_iter()
        .map(|(number, id)| (id, number))
        .collect()
}

/// Page number a `[page /XYZ ...]` destination points at.
fn dest_page(doc: &Document, dict: &lopdf::Dictionary) -> Option<u32> {
    let dest = dict.get(b"Dest").ok()?.as_array().ok()?;
    let id = dest.first()?.as_reference().ok()?;
    page_numbers(doc).get(&id).copied()
}

fn text(object: &Object) -> String {
    match object {
        Object::String(bytes, _) => String::from_utf8_lossy(bytes).into_owned(),
        _ => String::new(),
    }
}

/// Outline items in reading order as `(depth, title, page)`.
pub fn outline(doc: &Document) -> Vec<(usize, String, u32)> {
    fn collect(
        doc: &Document,
        first: Option<ObjectId>,
        depth: usize,
        items: &mut Vec<(usize, String, u32)>,
    ) {
        let mut next = first;
        while let Some(id) = next {
            let Ok(item) = doc.get_dictionary(id) else {
                return;
            };
            let title = item.get(b"Title").map(text).unwrap_or_default();
            items.push((depth, title, dest_page(doc, item).unwrap_or(0)));

            let child = item.get(b"First").and_then(Object::as_reference).ok();
            collect(doc, child, depth + 1, items);
            next = item.get(b"Next").and_then(Object::as_reference).ok();
        }
    }

    let mut items = Vec::new();
    let first = doc
        .catalog()
        .and_then(|catalog| catalog.get(b"Outlines"))
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .and_then(|outlines| outlines.get(b"First"))
        .and_then(Object::as_reference)
        .ok();
    collect(doc, first, 0, &mut items);
    items
}

/// Target page of every link annotation on page `page`.
pub fn link_targets(doc: &Document, page: u32) -> Vec<u32> {
    let Some(&page_id) = doc.get_pages().get(&page) else {
        return Vec::new();
    };
    let Ok(annots) = doc
        .get_dictionary(page_id)
        .and_then(|dict| dict.get(b"Annots"))
        .and_then(Object::as_array)
    else {
        return Vec::new();
    };

    annots
        .iter()
        .filter_map(|annot| {
            let id = annot.as_reference().ok()?;
            let dict = doc.get_dictionary(id).ok()?;
            dest_page(doc, dict)
        })
        .collect()
}
