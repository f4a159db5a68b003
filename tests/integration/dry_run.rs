//! Integration tests for dry run mode.

use clap::Parser;
use pdfbinder::cli::Cli;
use pdfbinder::merge::{Binder, bind_pdfs};
use tempfile::TempDir;

use crate::common::{write_config, write_pdf};

const CONFIG: &str = r#"{
    "output": "out/dossier.pdf",
    "schema": {
        "Cover": { "_hidden_": true, "Front": ["cover.pdf"] },
        "Contents": { "_toc_": true },
        "Chapter 1": ["ch1.pdf", "missing.pdf"],
        "Chapter 2": { "Part": ["ch2.pdf"] }
    }
}"#;

fn setup(dir: &std::path::Path) -> std::path::PathBuf {
    write_pdf(dir, "cover.pdf", 1);
    write_pdf(dir, "ch1.pdf", 3);
    write_pdf(dir, "ch2.pdf", 2);
    write_config(dir, CONFIG)
}

#[tokio::test]
async fn test_dry_run_creates_no_output() {
    let dir = TempDir::new().unwrap();
    let config_path = setup(dir.path());

    let cli = Cli::parse_from(["pdfbinder", config_path.to_str().unwrap(), "--dry-run", "-q"]);
    let config = cli.load_config().await.unwrap();
    assert!(config.dry_run);

    let report = bind_pdfs(&config).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.file_size, None);
    assert!(!dir.path().join("out/dossier.pdf").exists());
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_dry_run_reports_what_bind_produces() {
    let dir = TempDir::new().unwrap();
    let config_path = setup(dir.path());

    let cli = Cli::parse_from(["pdfbinder", config_path.to_str().unwrap(), "-n", "--force"]);
    let mut config = cli.load_config().await.unwrap();

    let planned = bind_pdfs(&config).await.unwrap();

    config.dry_run = false;
    let bound = Binder::new().bind(&config).await.unwrap().report;

    assert_eq!(planned.total_pages, bound.total_pages);
    assert_eq!(planned.toc_page, bound.toc_page);
    assert_eq!(planned.entries, bound.entries);
    assert_eq!(planned.warnings, bound.warnings);
    assert_eq!(planned.toc_rows, bound.toc_rows);

    // cover(1) toc(2) ch1(3-5) ch2(6-7)
    assert_eq!(planned.total_pages, 7);
    assert_eq!(planned.toc_page, 2);
    let visible: Vec<(&str, u32)> = planned
        .visible_entries()
        .map(|entry| (entry.title.as_str(), entry.page))
        .collect();
    assert_eq!(
        visible,
        vec![("Chapter 1", 3), ("Chapter 2", 6), ("Part", 6)]
    );
}
