//! Error and warning types for pdfbinder.
//!
//! Errors abort a run. Warnings are recorded in the bind report and the run
//! continues; they describe inputs that were skipped or degraded.
//!
//! # Error Categories
//!
//! - **Configuration Errors**: unreadable or malformed configuration file,
//!   invalid schema
//! - **PDF Errors**: source documents that cannot be loaded
//! - **Output Errors**: the merged document cannot be written
//! - **Assembly Errors**: page tree, outline or metadata manipulation failed

use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Result type alias for pdfbinder operations.
pub type Result<T> = std::result::Result<T, BinderError>;

/// Main error type for pdfbinder operations.
#[derive(Debug, thiserror::Error)]
pub enum BinderError {
    /// Configuration file could not be read.
    #[error("Failed to read configuration file: {}\n  Reason: {source}", path.display())]
    FailedToReadConfig {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Configuration file is not valid JSON or does not match the expected shape.
    #[error("Failed to parse configuration file: {}\n  Reason: {source}", path.display())]
    FailedToParseConfig {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The document schema is malformed.
    #[error("Invalid schema: {message}")]
    InvalidSchema {
        /// Description of what is wrong with the schema.
        message: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Failed to load a source PDF.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Source PDF is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// Font file could not be loaded or parsed.
    #[error("Failed to load font: {}\n  Reason: {reason}", path.display())]
    FontUnavailable {
        /// Path to the font file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Page tree manipulation failed.
    #[error("Failed to assemble pages: {reason}")]
    PageTree {
        /// Description of what went wrong.
        reason: String,
    },

    /// Outline (bookmark) creation failed.
    #[error("Failed to build document outline: {reason}")]
    OutlineFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Metadata operation failed.
    #[error("Failed to set metadata: {reason}")]
    MetadataFailed {
        /// Details about the failure.
        reason: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for BinderError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl BinderError {
    /// Create an InvalidSchema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create a FontUnavailable error.
    pub fn font_unavailable(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FontUnavailable {
            path,
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a PageTree error.
    pub fn page_tree(reason: impl Into<String>) -> Self {
        Self::PageTree {
            reason: reason.into(),
        }
    }

    /// Create an OutlineFailed error.
    pub fn outline_failed(reason: impl Into<String>) -> Self {
        Self::OutlineFailed {
            reason: reason.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (the input can be skipped).
    ///
    /// Returns true for errors that are downgraded to warnings in
    /// continue-on-error mode.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FailedToLoadPdf { .. }
                | Self::EncryptedPdf { .. }
                | Self::NotAFile { .. }
                | Self::FontUnavailable { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::InvalidSchema { .. }
                | Self::Cancelled
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FailedToReadConfig { .. } => 2,
            Self::FailedToParseConfig { .. } => 1,
            Self::InvalidSchema { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::NotAFile { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::FontUnavailable { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::PageTree { .. } => 6,
            Self::OutlineFailed { .. } => 6,
            Self::MetadataFailed { .. } => 6,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}

/// A non-fatal condition recorded while binding.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A listed source document does not exist.
    #[error("File not found: {}", path.display())]
    MissingFile {
        /// Resolved path of the missing document.
        path: PathBuf,
    },

    /// A glob pattern in a leaf matched nothing.
    #[error("Pattern matched no files: {pattern}")]
    NoMatches {
        /// The pattern as resolved against the input directory.
        pattern: String,
    },

    /// A source document was skipped because it failed to load.
    #[error("Skipping {}: {reason}", path.display())]
    SkippedFile {
        /// Path of the skipped document.
        path: PathBuf,
        /// Why loading failed.
        reason: String,
    },

    /// The schema has no TOC placement marker.
    #[error("No TOC placement marker in schema; inserting the table of contents at the start")]
    MissingTocMarker,

    /// A font file could not be used and a built-in font replaced it.
    #[error("Font not loaded ({reason}); falling back to {fallback}")]
    FontFallback {
        /// Path of the font file that failed.
        path: PathBuf,
        /// Why loading failed.
        reason: String,
        /// Name of the built-in replacement.
        fallback: String,
    },

    /// Some TOC rows did not fit on the TOC page.
    #[error("Table of contents does not fit on one page; {omitted} row(s) omitted")]
    TocOverflow {
        /// Number of rows that were not drawn.
        omitted: usize,
    },
}
