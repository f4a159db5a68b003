//! PDF writing and saving operations.
//!
//! This module provides safe PDF writing with:
//! - Atomic writes (write to temp file, then rename)
//! - Compression and pruning of unreferenced objects
//! - Creation of the output directory
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfbinder::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! let stats = writer.save(doc, Path::new("out/dossier.pdf")).await?;
//! println!("Wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use log::debug;
use lopdf::Document;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::CompressionLevel;
use crate::error::{BinderError, Result};
use crate::utils::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Compress content streams before writing.
    pub compress: bool,

    /// Drop unreferenced objects and renumber the rest.
    pub prune: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl WriteOptions {
    /// Options matching a compression level.
    pub fn for_compression(level: CompressionLevel) -> Self {
        let (compress, prune) = match level {
            CompressionLevel::None => (false, false),
            CompressionLevel::Standard => (true, false),
            CompressionLevel::Maximum => (true, true),
        };

        Self {
            compress,
            prune,
            ..Self::default()
        }
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compress: true,
            prune: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Whether compression was applied.
    pub compressed: bool,

    /// Whether unreferenced objects were pruned.
    pub pruned: bool,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Save a PDF document and return statistics about the operation.
    ///
    /// The output directory is created if it does not exist. Serialization
    /// runs on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output directory cannot be created
    /// - Insufficient permissions
    /// - Disk full
    /// - Write operation fails
    ///
    /// A partially written temporary file is removed before returning.
    pub async fn save(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                BinderError::FailedToCreateOutput {
                    path: parent.to_path_buf(),
                    source: e,
                }
            })?;
        }

        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        task::spawn_blocking(move || write_document(doc, path_buf, options))
            .await
            .map_err(|e| BinderError::other(format!("Write task failed: {e}")))?
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

fn write_document(mut doc: Document, path: PathBuf, options: WriteOptions) -> Result<WriteStatistics> {
    let start = Instant::now();

    if options.prune {
        let pruned = doc.prune_objects();
        debug!("Pruned {} unreferenced object(s)", pruned.len());
        doc.renumber_objects();
    }

    if options.compress {
        doc.compress();
    }

    // Determine write path (temp or final)
    let write_path = if options.atomic {
        temp_path(&path)
    } else {
        path.clone()
    };

    let result = write_file(&mut doc, &write_path, options.buffer_size).and_then(|()| {
        if options.atomic {
            std::fs::rename(&write_path, &path).map_err(|e| BinderError::FailedToWrite {
                path: path.clone(),
                source: e,
            })
        } else {
            Ok(())
        }
    });

    if let Err(err) = result {
        if options.atomic {
            let _ = std::fs::remove_file(&write_path);
        }
        return Err(err);
    }

    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size,
        output_path: path,
        compressed: options.compress,
        pruned: options.prune,
    })
}

fn write_file(doc: &mut Document, write_path: &Path, buffer_size: usize) -> Result<()> {
    let file =
        std::fs::File::create(write_path).map_err(|e| BinderError::FailedToCreateOutput {
            path: write_path.to_path_buf(),
            source: e,
        })?;

    let mut writer = std::io::BufWriter::with_capacity(buffer_size, file);

    doc.save_to(&mut writer)
        .map_err(|e| BinderError::FailedToWrite {
            path: write_path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;

    writer.flush().map_err(|e| BinderError::FailedToWrite {
        path: write_path.to_path_buf(),
        source: e,
    })
}

/// Sibling of `path` used while writing, e.g. `dossier.pdf.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}
