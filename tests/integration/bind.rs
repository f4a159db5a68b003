//! Integration tests for full binds written to disk.

use lopdf::{Document, Object};
use pdfbinder::Warning;
use pdfbinder::merge::bind_pdfs;
use tempfile::TempDir;

use crate::common::{
    fixture_path, link_targets, load_config, outline, write_config, write_pdf,
};

const DOSSIER: &str = r#"{
    "output": "out/dossier.pdf",
    "metadata": { "title": "Dossier", "author": "Records Office" },
    "schema": {
        "Contents": { "_toc_": true },
        "A": { "X": ["a.pdf"] },
        "B": ["b.pdf"]
    }
}"#;

#[tokio::test]
async fn test_bind_dossier() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "a.pdf", 2);
    write_pdf(dir.path(), "b.pdf", 3);
    let config = load_config(&write_config(dir.path(), DOSSIER)).await;

    let report = bind_pdfs(&config).await.unwrap();

    assert_eq!(report.total_pages, 6);
    assert_eq!(report.toc_page, 1);
    assert!(report.toc_from_marker);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let pages: Vec<(&str, u32)> = report
        .entries
        .iter()
        .map(|entry| (entry.title.as_str(), entry.page))
        .collect();
    assert_eq!(pages, vec![("A", 2), ("X", 2), ("B", 4)]);

    let doc = Document::load(dir.path().join("out/dossier.pdf")).unwrap();
    assert_eq!(doc.get_pages().len(), 6);
}

#[tokio::test]
async fn test_toc_links_and_outline_point_at_sections() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "a.pdf", 2);
    write_pdf(dir.path(), "b.pdf", 3);
    let config = load_config(&write_config(dir.path(), DOSSIER)).await;

    bind_pdfs(&config).await.unwrap();
    let doc = Document::load(&config.output).unwrap();

    assert_eq!(link_targets(&doc, 1), vec![2, 2, 4]);
    assert_eq!(
        outline(&doc),
        vec![
            (0, "A".to_string(), 2),
            (1, "X".to_string(), 2),
            (0, "B".to_string(), 4),
        ]
    );
}

#[tokio::test]
async fn test_metadata_written() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "a.pdf", 2);
    write_pdf(dir.path(), "b.pdf", 3);
    let config = load_config(&write_config(dir.path(), DOSSIER)).await;

    bind_pdfs(&config).await.unwrap();
    let doc = Document::load(&config.output).unwrap();

    let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = doc.get_dictionary(info_id).unwrap();
    assert!(matches!(info.get(b"Title").unwrap(), Object::String(bytes, _) if bytes == b"Dossier"));
    assert!(info.has(b"CreationDate"));
}

#[tokio::test]
async fn test_missing_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "present.pdf", 1);
    write_pdf(dir.path(), "present2.pdf", 1);
    let config = load_config(&write_config(
        dir.path(),
        r#"{
            "output": "out.pdf",
            "schema": {
                "Contents": { "_toc_": true },
                "S": ["present.pdf", "missing.pdf", "present2.pdf"]
            }
        }"#,
    ))
    .await;

    let report = bind_pdfs(&config).await.unwrap();

    assert_eq!(report.total_pages, 3);
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        &report.warnings[0],
        Warning::MissingFile { path } if path.ends_with("missing.pdf")
    ));

    let doc = Document::load(&config.output).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[tokio::test]
async fn test_outline_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "a.pdf", 1);
    let config = load_config(&write_config(
        dir.path(),
        r#"{
            "output": "out.pdf",
            "toc": { "outline": false, "heading": "Index" },
            "schema": { "T": { "_toc_": true }, "A": ["a.pdf"] }
        }"#,
    ))
    .await;

    let report = bind_pdfs(&config).await.unwrap();
    assert_eq!(report.outline_items, 0);

    let doc = Document::load(&config.output).unwrap();
    assert!(outline(&doc).is_empty());
    assert_eq!(link_targets(&doc, 1), vec![2]);
}

#[tokio::test]
async fn test_toc_embeds_configured_font() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "a.pdf", 1);
    let font = serde_json::to_string(&fixture_path("fonts/Montserrat-Regular.ttf")).unwrap();
    let config = load_config(&write_config(
        dir.path(),
        &format!(
            r#"{{
                "output": "out.pdf",
                "toc": {{ "title_font": {font} }},
                "schema": {{ "T": {{ "_toc_": true }}, "A": ["a.pdf"] }}
            }}"#
        ),
    ))
    .await;

    let report = bind_pdfs(&config).await.unwrap();
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let doc = Document::load(&config.output).unwrap();
    let toc_page = *doc.get_pages().get(&1).unwrap();
    let fonts = doc
        .get_dictionary(toc_page)
        .and_then(|page| page.get(b"Resources"))
        .and_then(Object::as_dict)
        .and_then(|resources| resources.get(b"Font"))
        .and_then(Object::as_dict)
        .unwrap();

    let title = doc
        .get_dictionary(fonts.get(b"F1").and_then(Object::as_reference).unwrap())
        .unwrap();
    assert_eq!(title.get(b"Subtype").and_then(Object::as_name).unwrap(), b"TrueType");
    assert_eq!(title.get(b"Widths").and_then(Object::as_array).unwrap().len(), 224);

    let text = doc
        .get_dictionary(fonts.get(b"F2").and_then(Object::as_reference).unwrap())
        .unwrap();
    assert_eq!(text.get(b"BaseFont").and_then(Object::as_name).unwrap(), b"Helvetica");
}
