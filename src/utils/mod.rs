//! Utilities for leaf pattern expansion, PDF strings and formatting.

use crate::error::{BinderError, Result};
use lopdf::{Object, StringFormat};
use std::path::PathBuf;

/// Whether a leaf entry should be expanded as a glob pattern.
pub fn is_glob_pattern(name: &str) -> bool {
    name.contains(['*', '?', '['])
}

/// Expand a single glob pattern into file paths.
///
/// Matches are returned in lexical order; directories are skipped.
///
/// Pattern examples:
/// - `"payslips/*.pdf"`
/// - `"docs/2024-0?.pdf"`
///
/// Errors:
/// - Malformed patterns are reported as schema errors.
/// - Propagates filesystem errors from the glob iterator.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|err| {
        BinderError::invalid_schema(format!("invalid file pattern \"{pattern}\": {err}"))
    })?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| BinderError::Io {
            source: err.into(),
        })?;
        if path.is_file() {
            resolved_paths.push(path);
        }
    }

    resolved_paths.sort();
    Ok(resolved_paths)
}

/// Encode text as a PDF text string.
///
/// Plain ASCII is written as a literal string; anything else as UTF-16BE
/// with a byte order mark.
pub fn pdf_text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = Vec::with_capacity(2 + text.len() * 2);
    bytes.extend_from_slice(&[0xFE, 0xFF]);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
