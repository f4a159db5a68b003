//! Document assembly.
//!
//! This module turns a walked schema into the output document:
//! - Page tree assembly and blank page insertion
//! - TOC page rendering (through [`crate::toc`])
//! - Outline (bookmarks)
//! - Metadata management
//!
//! # Examples
//!
//! ```no_run
//! use pdfbinder::merge::Binder;
//! use pdfbinder::config::Config;
//!
//! # async fn example(config: Config) -> Result<(), Box<dyn std::error::Error>> {
//! let result = Binder::new().bind(&config).await?;
//! println!("Bound {} pages", result.report.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod bookmarks;
pub mod merger;
pub mod metadata;
pub mod pages;

pub use bookmarks::OutlineBuilder;
pub use merger::{Assembly, BindReport, BindResult, Binder, PageCounter};
pub use metadata::MetadataManager;
pub use pages::OutputDocument;

use crate::config::Config;
use crate::error::Result;
use crate::io::{PdfWriter, WriteOptions};

/// Bind the documents described by `config` and write the output.
///
/// In a dry run nothing is assembled or written; the returned report
/// describes what a real run would produce. Overwrite checks are the
/// caller's concern.
///
/// # Errors
///
/// Returns an error if any step of the bind or the write fails.
///
/// # Examples
///
/// ```no_run
/// use pdfbinder::merge::bind_pdfs;
/// use pdfbinder::config::Config;
///
/// # async fn example(config: Config) -> Result<(), Box<dyn std::error::Error>> {
/// let report = bind_pdfs(&config).await?;
/// println!("Created {} page document", report.total_pages);
/// # Ok(())
/// # }
/// ```
pub async fn bind_pdfs(config: &Config) -> Result<BindReport> {
    let binder = Binder::new();
    if config.dry_run {
        return binder.plan(config).await;
    }

    let BindResult { document, mut report } = binder.bind(config).await?;

    let writer = PdfWriter::with_options(WriteOptions::for_compression(config.compression));
    let stats = writer.save(document, &config.output).await?;

    report.file_size = Some(stats.file_size);
    report.elapsed += stats.write_time;
    Ok(report)
}
