//! Integration tests for hidden sections, globs and TOC placement.

use lopdf::Document;
use pdfbinder::Warning;
use pdfbinder::merge::bind_pdfs;
use tempfile::TempDir;

use crate::common::{link_targets, load_config, outline, write_config, write_pdf};

#[tokio::test]
async fn test_hidden_section_keeps_pages_but_not_entries() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "cover.pdf", 1);
    write_pdf(dir.path(), "notes.pdf", 2);
    write_pdf(dir.path(), "body.pdf", 1);
    let config = load_config(&write_config(
        dir.path(),
        r#"{
            "output": "out.pdf",
            "schema": {
                "Front": { "_hidden_": true, "Cover": ["cover.pdf"], "Inner": { "Notes": ["notes.pdf"] } },
                "Contents": { "_toc_": true },
                "Body": ["body.pdf"]
            }
        }"#,
    ))
    .await;

    let report = bind_pdfs(&config).await.unwrap();

    // cover(1) notes(2) toc(4) body(5)
    assert_eq!(report.total_pages, 5);
    assert_eq!(report.toc_page, 4);

    let visible: Vec<&str> = report
        .visible_entries()
        .map(|entry| entry.title.as_str())
        .collect();
    assert_eq!(visible, vec!["Body"]);
    assert_eq!(report.entries.len(), 5);

    let doc = Document::load(&config.output).unwrap();
    assert_eq!(link_targets(&doc, 4), vec![5]);
    assert_eq!(outline(&doc), vec![(0, "Body".to_string(), 5)]);
}

#[tokio::test]
async fn test_missing_marker_puts_toc_first() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "a.pdf", 2);
    write_pdf(dir.path(), "b.pdf", 1);
    let config = load_config(&write_config(
        dir.path(),
        r#"{ "output": "out.pdf", "schema": { "A": ["a.pdf"], "B": ["b.pdf"] } }"#,
    ))
    .await;

    let report = bind_pdfs(&config).await.unwrap();

    assert_eq!(report.total_pages, 4);
    assert_eq!(report.toc_page, 1);
    assert!(!report.toc_from_marker);
    assert_eq!(report.warnings, vec![Warning::MissingTocMarker]);

    let doc = Document::load(&config.output).unwrap();
    assert_eq!(link_targets(&doc, 1), vec![2, 4]);
}

#[tokio::test]
async fn test_glob_pattern_expands_in_sorted_order() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "scans/p2.pdf", 1);
    write_pdf(dir.path(), "scans/p1.pdf", 2);
    let config = load_config(&write_config(
        dir.path(),
        r#"{
            "output": "out.pdf",
            "schema": { "T": { "_toc_": true }, "Scans": ["scans/*.pdf"], "Empty": ["none/*.pdf"] }
        }"#,
    ))
    .await;

    let report = bind_pdfs(&config).await.unwrap();

    assert_eq!(report.total_pages, 4);
    assert_eq!(report.files.len(), 2);
    assert!(report.files[0].path.ends_with("scans/p1.pdf"));
    assert_eq!(report.files[1].first_page, 4);
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(report.warnings[0], Warning::NoMatches { .. }));
}

#[tokio::test]
async fn test_long_toc_is_truncated_with_warning() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "page.pdf", 1);

    let sections: Vec<String> = (1..=40)
        .map(|n| format!(r#""Section {n:02}": ["page.pdf"]"#))
        .collect();
    let json = format!(
        r#"{{ "output": "out.pdf", "schema": {{ "T": {{ "_toc_": true }}, {} }} }}"#,
        sections.join(", ")
    );
    let config = load_config(&write_config(dir.path(), &json)).await;

    let report = bind_pdfs(&config).await.unwrap();

    assert_eq!(report.total_pages, 41);
    assert_eq!(report.toc_rows, 36);
    assert!(report.warnings.contains(&Warning::TocOverflow { omitted: 4 }));

    // The outline is not limited by the page
    assert_eq!(report.outline_items, 40);
    let doc = Document::load(&config.output).unwrap();
    assert_eq!(link_targets(&doc, 1).len(), 36);
}
