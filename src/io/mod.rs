//! I/O operations for pdfbinder.
//!
//! This module handles all file I/O operations including:
//! - Loading source PDF documents from disk
//! - Writing the bound PDF to disk
//!
//! # Examples
//!
//! ```no_run
//! use pdfbinder::io::{PdfReader, PdfWriter};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(Path::new("input.pdf")).await?;
//!
//! let writer = PdfWriter::new();
//! writer.save(loaded.document, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
