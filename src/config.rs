//! Configuration module for pdfbinder.
//!
//! A run is described by a JSON configuration file holding the document
//! schema and the output settings. The CLI can override most settings. This
//! module handles:
//! - Loading and parsing the configuration file
//! - Resolution of relative paths against the file's directory
//! - Application of defaults
//! - Validation of the combined settings

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{BinderError, Result};
use crate::schema::Schema;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - preserves exact quality and structure.
    None,
    /// Compress content streams.
    Standard,
    /// Compress streams and drop unreferenced objects.
    #[default]
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = BinderError;

    /// Parse compression level from string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string doesn't match a valid compression level.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(BinderError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }

    /// Fill fields missing here from `fallback`.
    pub fn or(self, fallback: Metadata) -> Self {
        Self {
            title: self.title.or(fallback.title),
            author: self.author.or(fallback.author),
            subject: self.subject.or(fallback.subject),
            keywords: self.keywords.or(fallback.keywords),
        }
    }
}

/// Table of contents settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocOptions {
    /// Heading drawn at the top of the TOC page.
    pub heading: String,
    /// Word placed before each page number.
    pub page_label: String,
    /// Font file for the heading and level-1 rows.
    pub title_font: Option<PathBuf>,
    /// Font file for nested rows, leaders and page numbers.
    pub text_font: Option<PathBuf>,
    /// Write the document outline (bookmarks).
    pub outline: bool,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            heading: "Table of Contents".to_string(),
            page_label: "Page".to_string(),
            title_font: None,
            text_font: None,
            outline: true,
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Contents of a configuration file, as written.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Directory holding the source documents.
    #[serde(default)]
    pub input_dir: Option<PathBuf>,
    /// Output PDF path.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Compression level for the output.
    #[serde(default)]
    pub compression: Option<CompressionLevel>,
    /// Skip source documents that fail to load.
    #[serde(default)]
    pub continue_on_error: bool,
    /// Table of contents settings.
    #[serde(default)]
    pub toc: TocOptions,
    /// Info dictionary entries.
    #[serde(default)]
    pub metadata: Metadata,
    /// The document schema.
    pub schema: Schema,
}

impl ConfigFile {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or does not match the
    /// configuration shape. `path` is only used for the error message.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| BinderError::FailedToParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a configuration file.
    ///
    /// Relative paths inside the file are resolved against the directory
    /// that contains it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|source| {
            BinderError::FailedToReadConfig {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let file = Self::parse(&text, path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(file.relative_to(base_dir))
    }

    /// Resolve every relative path in the file against `base_dir`.
    pub fn relative_to(mut self, base_dir: &Path) -> Self {
        let resolve = |p: PathBuf| {
            if p.is_absolute() { p } else { base_dir.join(p) }
        };

        self.input_dir = Some(resolve(self.input_dir.unwrap_or_default()));
        self.output = self.output.map(resolve);
        self.toc.title_font = self.toc.title_font.map(resolve);
        self.toc.text_font = self.toc.text_font.map(resolve);
        self
    }
}

/// Complete configuration for a bind operation.
///
/// This structure contains all settings needed to perform a bind,
/// combined from the configuration file and the CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// The document schema.
    pub schema: Schema,

    /// Directory that leaf file names are resolved against.
    pub input_dir: PathBuf,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Dry run mode - walk and report without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Print the report as JSON.
    pub json: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Continue on load errors instead of stopping.
    pub continue_on_error: bool,

    /// Table of contents settings.
    pub toc: TocOptions,

    /// Metadata to set on output document.
    pub metadata: Metadata,
}

impl Config {
    /// Build a configuration from a parsed file with default run settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file names no output path.
    pub fn from_file(file: ConfigFile) -> Result<Self> {
        let output = file.output.ok_or_else(|| {
            BinderError::invalid_config(
                "No output path. Set \"output\" in the configuration file or pass --output",
            )
        })?;

        Ok(Self {
            schema: file.schema,
            input_dir: file.input_dir.unwrap_or_default(),
            output,
            dry_run: false,
            verbose: false,
            quiet: false,
            json: false,
            overwrite_mode: OverwriteMode::default(),
            compression: file.compression.unwrap_or_default(),
            continue_on_error: file.continue_on_error,
            toc: file.toc,
            metadata: Metadata::new(
                file.metadata.title,
                file.metadata.author,
                file.metadata.subject,
                file.metadata.keywords,
            ),
        })
    }

    /// Validate the configuration.
    ///
    /// Checks for logical inconsistencies and invalid combinations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The schema is malformed
    /// - Verbose and quiet modes are both enabled
    /// - The output path has no file name
    /// - The TOC heading or page label is empty
    pub fn validate(&self) -> Result<()> {
        self.schema.validate()?;

        if self.verbose && self.quiet {
            return Err(BinderError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if self.output.file_name().is_none() {
            return Err(BinderError::invalid_config(format!(
                "Output path has no file name: {}",
                self.output.display()
            )));
        }

        if self.toc.heading.trim().is_empty() {
            return Err(BinderError::invalid_config("TOC heading cannot be empty"));
        }

        if self.toc.page_label.trim().is_empty() {
            return Err(BinderError::invalid_config("TOC page label cannot be empty"));
        }

        Ok(())
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
