//! PDF reading and loading operations.
//!
//! Source documents are read with `tokio::fs` and parsed from memory, one at
//! a time, in schema order.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbinder::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(Path::new("chapter1.pdf")).await?;
//! println!("Loaded {} pages in {:?}", loaded.page_count, loaded.load_time);
//! # Ok(())
//! # }
//! ```

use log::debug;
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{BinderError, Result};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

/// PDF reader.
///
/// A document without pages loads successfully and contributes no pages.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - File is not a valid PDF
    /// - PDF is encrypted
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let path_buf = path.to_path_buf();
        let start = Instant::now();

        let bytes = tokio::fs::read(&path_buf)
            .await
            .map_err(|e| BinderError::failed_to_load_pdf(path_buf.clone(), e.to_string()))?;
        let file_size = bytes.len() as u64;

        let document = Document::load_mem(&bytes).map_err(|e| {
            let err_msg = e.to_string();
            let lowered = err_msg.to_lowercase();
            if lowered.contains("encrypt") || lowered.contains("password") {
                BinderError::encrypted_pdf(path_buf.clone())
            } else {
                BinderError::failed_to_load_pdf(path_buf.clone(), err_msg)
            }
        })?;

        let page_count = document.get_pages().len();
        if page_count == 0 {
            debug!("{} has no pages", path_buf.display());
        }

        Ok(LoadedPdf {
            document,
            path: path_buf,
            page_count,
            load_time: start.elapsed(),
            file_size,
        })
    }
}
