//! pdfbinder - Bind PDF files into one document with a table of contents.
//!
//! This library assembles a set of PDF files according to a hierarchical
//! schema and generates a clickable table of contents page. It supports:
//!
//! - Nested sections, hidden sections and glob patterns for source files
//! - A TOC page placed wherever the schema marks it
//! - Dot leaders, per-level styles and embedded TrueType/OpenType fonts
//! - Link annotations and a document outline
//! - Metadata management
//! - Comprehensive error handling with non-fatal warnings
//!
//! # Examples
//!
//! ## Basic Bind
//!
//! ```no_run
//! use pdfbinder::config::ConfigFile;
//! use pdfbinder::{Config, merge};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let file = ConfigFile::load(Path::new("dossier.json")).await?;
//! let config = Config::from_file(file)?;
//! config.validate()?;
//!
//! let report = merge::bind_pdfs(&config).await?;
//! println!("Created {} page document", report.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use pdfbinder::schema::Schema;
//! use pdfbinder::merge::Assembly;
//! use pdfbinder::io::{PdfReader, PdfWriter};
//! use pdfbinder::walk::{self, WalkOptions};
//! use std::path::Path;
//!
//! # async fn example(schema: Schema) -> Result<(), Box<dyn std::error::Error>> {
//! let mut assembly = Assembly::new(PdfReader::new(), 595.0, 842.0);
//! let outcome = walk::walk(&schema, &mut assembly, &WalkOptions::default()).await?;
//! println!("TOC goes on page {}", outcome.toc.index + 1);
//!
//! let document = assembly.into_output().into_document();
//! PdfWriter::new().save(document, Path::new("out.pdf")).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod schema;
pub mod toc;
pub mod utils;
pub mod walk;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use config::Config;
pub use error::{BinderError, Result, Warning};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
