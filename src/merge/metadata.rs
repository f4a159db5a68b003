//! PDF metadata management.
//!
//! This module handles the output's Info dictionary:
//! - Title, Author, Subject, Keywords
//! - Creator, Producer
//! - Creation and modification dates

use crate::config::Metadata;
use crate::error::{BinderError, Result};
use crate::utils::pdf_text_string;
use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, StringFormat};

/// Name recorded as Creator and Producer.
const PRODUCER: &str = "pdfbinder";

/// Manager for PDF metadata.
#[derive(Debug, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Write the Info dictionary of `doc`.
    ///
    /// Only fields present in `metadata` are set. Creator, Producer and
    /// both dates are always written, dated `now`.
    ///
    /// # Errors
    ///
    /// Returns [`BinderError::MetadataFailed`] if the trailer points at an
    /// Info object that is not a dictionary.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfbinder::merge::metadata::MetadataManager;
    /// # use pdfbinder::config::Metadata;
    /// # use lopdf::Document;
    /// # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let metadata = Metadata::new(Some("Dossier".to_string()), None, None, None);
    /// MetadataManager::new().set_metadata(&mut doc, &metadata, chrono::Utc::now())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_metadata(
        &self,
        doc: &mut Document,
        metadata: &Metadata,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let info_id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
            Ok(id) => id,
            Err(_) => {
                let id = doc.add_object(Dictionary::new());
                doc.trailer.set("Info", Object::Reference(id));
                id
            }
        };

        let info = doc
            .get_object_mut(info_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| BinderError::MetadataFailed {
                reason: format!("Info dictionary is unusable: {e}"),
            })?;

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, pdf_text_string(value));
            }
        }

        info.set("Creator", pdf_text_string(PRODUCER));
        info.set("Producer", pdf_text_string(PRODUCER));

        let date = format_pdf_date(now);
        info.set(
            "CreationDate",
            Object::String(date.clone().into_bytes(), StringFormat::Literal),
        );
        info.set(
            "ModDate",
            Object::String(date.into_bytes(), StringFormat::Literal),
        );

        Ok(())
    }

    /// Read the descriptive fields of the Info dictionary.
    pub fn get_metadata(&self, doc: &Document) -> Metadata {
        let Ok(info) = doc
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
        else {
            return Metadata::default();
        };

        Metadata::new(
            text_field(info, b"Title"),
            text_field(info, b"Author"),
            text_field(info, b"Subject"),
            text_field(info, b"Keywords"),
        )
    }
}

/// Decode a text string field (PDFDocEncoding-as-Latin-1 or UTF-16BE).
fn text_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let bytes = dict.get(key).and_then(Object::as_str).ok()?;
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        _ => Some(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Format a timestamp as a PDF date string, e.g. `D:20260102030405Z`.
pub fn format_pdf_date(time: DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%SZ").to_string()
}
