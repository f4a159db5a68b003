//! Integration tests for error handling and edge cases.

use clap::Parser;
use pdfbinder::Warning;
use pdfbinder::cli::Cli;
use pdfbinder::error::BinderError;
use pdfbinder::merge::bind_pdfs;
use std::path::Path;
use tempfile::TempDir;

use crate::common::{load_config, write_config, write_pdf};

async fn cli_config(config_path: &Path, extra: &[&str]) -> Result<pdfbinder::Config, BinderError> {
    let mut args = vec!["pdfbinder", config_path.to_str().unwrap(), "--force"];
    args.extend_from_slice(extra);
    Cli::parse_from(args).load_config().await
}

#[tokio::test]
async fn test_error_missing_config_file() {
    let dir = TempDir::new().unwrap();

    let err = cli_config(&dir.path().join("nope.json"), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, BinderError::FailedToReadConfig { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_error_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), r#"{ "output": "out.pdf", "schema": { "A": ["a.pdf"] "#);

    let err = cli_config(&path, &[]).await.unwrap_err();

    assert!(matches!(err, BinderError::FailedToParseConfig { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_error_leaf_with_non_string_entry() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), r#"{ "output": "out.pdf", "schema": { "A": [1, 2] } }"#);

    let err = cli_config(&path, &[]).await.unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_error_duplicate_toc_marker() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        r#"{
            "output": "out.pdf",
            "schema": {
                "T1": { "_toc_": true },
                "A": { "T2": { "_toc_": true } }
            }
        }"#,
    );

    let err = cli_config(&path, &[]).await.unwrap_err();

    assert!(matches!(err, BinderError::InvalidSchema { .. }));
    assert!(err.to_string().contains("only one is allowed"));
}

#[tokio::test]
async fn test_error_no_output_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), r#"{ "schema": { "A": ["a.pdf"] } }"#);

    let err = cli_config(&path, &[]).await.unwrap_err();
    assert!(matches!(err, BinderError::InvalidConfig { .. }));

    // --output supplies it
    let config = cli_config(&path, &["-o", "cli.pdf"]).await.unwrap();
    assert!(config.output.ends_with("cli.pdf"));
}

#[tokio::test]
async fn test_error_corrupted_pdf() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.pdf"), b"not a pdf at all").unwrap();
    let path = write_config(
        dir.path(),
        r#"{ "output": "out.pdf", "schema": { "T": { "_toc_": true }, "A": ["broken.pdf"] } }"#,
    );
    let config = load_config(&path).await;

    let err = bind_pdfs(&config).await.unwrap_err();

    assert!(matches!(err, BinderError::FailedToLoadPdf { .. }));
    assert_eq!(err.exit_code(), 3);
    assert!(!config.output.exists());
}

#[tokio::test]
async fn test_continue_on_error_skips_corrupted_pdf() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.pdf"), b"not a pdf at all").unwrap();
    write_pdf(dir.path(), "good.pdf", 2);
    let path = write_config(
        dir.path(),
        r#"{
            "output": "out.pdf",
            "schema": { "T": { "_toc_": true }, "A": ["broken.pdf", "good.pdf"] }
        }"#,
    );

    let config = cli_config(&path, &["--continue-on-error", "-q"]).await.unwrap();
    let report = bind_pdfs(&config).await.unwrap();

    assert_eq!(report.total_pages, 3);
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(report.warnings[0], Warning::SkippedFile { .. }));
    assert!(config.output.exists());
}

#[tokio::test]
async fn test_bad_font_falls_back() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "a.pdf", 1);
    std::fs::write(dir.path().join("bad.ttf"), b"definitely not a font").unwrap();
    let path = write_config(
        dir.path(),
        r#"{
            "output": "out.pdf",
            "toc": { "title_font": "bad.ttf" },
            "schema": { "T": { "_toc_": true }, "A": ["a.pdf"] }
        }"#,
    );
    let config = load_config(&path).await;

    let report = bind_pdfs(&config).await.unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        &report.warnings[0],
        Warning::FontFallback { fallback, .. } if fallback == "Helvetica-Bold"
    ));
    assert!(config.output.exists());
}
