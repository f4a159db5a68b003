//! Core binding implementation.
//!
//! [`Binder`] runs the whole pipeline: walk the schema while appending
//! source pages to an [`OutputDocument`], draw the TOC on the reserved page,
//! then add the outline and the Info dictionary.

use chrono::Utc;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use log::debug;
use lopdf::Document;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{Result, Warning};
use crate::io::PdfReader;
use crate::merge::bookmarks::OutlineBuilder;
use crate::merge::metadata::MetadataManager;
use crate::merge::pages::OutputDocument;
use crate::toc::{FontSet, TocLayout, TocStyle, layout_toc, render_toc};
use crate::utils::format_file_size;
use crate::walk::{self, InsertedFile, PageSink, TocEntry, WalkOptions, WalkOutcome};

/// Page sink that appends every source document to the output.
#[derive(Debug)]
pub struct Assembly {
    output: OutputDocument,
    reader: PdfReader,
    page_size: (f32, f32),
    input_size: u64,
}

impl Assembly {
    /// Start an empty output whose blank pages are `width` × `height`.
    pub fn new(reader: PdfReader, width: f32, height: f32) -> Self {
        Self {
            output: OutputDocument::new(),
            reader,
            page_size: (width, height),
            input_size: 0,
        }
    }

    /// Total size of the source files read.
    pub fn input_size(&self) -> u64 {
        self.input_size
    }

    /// Finish and hand out the output document.
    pub fn into_output(self) -> OutputDocument {
        self.output
    }
}

impl PageSink for Assembly {
    fn append_file<'a>(&'a mut self, path: &'a Path) -> LocalBoxFuture<'a, Result<u32>> {
        async move {
            let loaded = self.reader.load(path).await?;
            debug!(
                "Loaded {} ({} pages, {}) in {:?}",
                path.display(),
                loaded.page_count,
                format_file_size(loaded.file_size),
                loaded.load_time
            );
            self.input_size += loaded.file_size;
            let pages = self.output.append_document(loaded.document)?;
            Ok(pages as u32)
        }
        .boxed_local()
    }

    fn insert_blank_page(&mut self, index: u32) -> Result<()> {
        let (width, height) = self.page_size;
        self.output
            .insert_blank_page(index as usize, width, height)
            .map(|_| ())
    }
}

/// Page sink that only counts pages, for dry runs.
#[derive(Debug, Default)]
pub struct PageCounter {
    reader: PdfReader,
    input_size: u64,
}

impl PageCounter {
    /// Create a counter that loads documents with `reader`.
    pub fn new(reader: PdfReader) -> Self {
        Self {
            reader,
            input_size: 0,
        }
    }
}

impl PageSink for PageCounter {
    fn append_file<'a>(&'a mut self, path: &'a Path) -> LocalBoxFuture<'a, Result<u32>> {
        async move {
            let loaded = self.reader.load(path).await?;
            self.input_size += loaded.file_size;
            Ok(loaded.page_count as u32)
        }
        .boxed_local()
    }

    fn insert_blank_page(&mut self, _index: u32) -> Result<()> {
        Ok(())
    }
}

/// What a bind did, or in a dry run, would do.
#[derive(Debug, Clone, Serialize)]
pub struct BindReport {
    /// Output path.
    pub output: PathBuf,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Pages in the output, TOC page included.
    pub total_pages: u32,
    /// 1-based page number of the TOC page.
    pub toc_page: u32,
    /// Whether the TOC position came from the schema marker.
    pub toc_from_marker: bool,
    /// Every TOC entry in walk order, hidden ones included.
    pub entries: Vec<TocEntry>,
    /// Rows drawn on the TOC page.
    pub toc_rows: usize,
    /// Outline items written.
    pub outline_items: usize,
    /// Source documents inserted.
    pub files: Vec<InsertedFile>,
    /// Total size of the source documents in bytes.
    pub input_size: u64,
    /// Size of the written file in bytes, once saved.
    pub file_size: Option<u64>,
    /// Non-fatal conditions met along the way.
    pub warnings: Vec<Warning>,
    /// Time taken.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl BindReport {
    fn from_outcome(config: &Config, outcome: WalkOutcome, input_size: u64) -> Self {
        Self {
            output: config.output.clone(),
            dry_run: config.dry_run,
            total_pages: outcome.total_pages,
            toc_page: outcome.toc.index + 1,
            toc_from_marker: outcome.toc.from_marker,
            entries: outcome.entries,
            toc_rows: 0,
            outline_items: 0,
            files: outcome.files,
            input_size,
            file_size: None,
            warnings: outcome.warnings,
            elapsed: Duration::ZERO,
        }
    }

    fn record_toc(&mut self, layout: &TocLayout, font_warnings: Vec<Warning>) {
        self.warnings.extend(font_warnings);
        if layout.omitted > 0 {
            self.warnings.push(Warning::TocOverflow {
                omitted: layout.omitted,
            });
        }
        self.toc_rows = layout.rows.len();
    }

    /// Entries shown in the TOC.
    pub fn visible_entries(&self) -> impl Iterator<Item = &TocEntry> {
        self.entries.iter().filter(|entry| entry.visible)
    }

    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Result of a bind.
#[derive(Debug)]
pub struct BindResult {
    /// The assembled document, not yet saved.
    pub document: Document,
    /// Report of the bind.
    pub report: BindReport,
}

/// Runs the binding pipeline.
#[derive(Debug, Default)]
pub struct Binder {
    reader: PdfReader,
    style: TocStyle,
    outline: OutlineBuilder,
    metadata: MetadataManager,
}

impl Binder {
    /// Create a binder with the default TOC style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a binder with a custom TOC style.
    pub fn with_style(style: TocStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    fn walk_options(config: &Config) -> WalkOptions {
        WalkOptions {
            input_dir: config.input_dir.clone(),
            continue_on_error: config.continue_on_error,
        }
    }

    async fn load_fonts(config: &Config) -> (FontSet, Vec<Warning>) {
        FontSet::load(
            config.toc.title_font.as_deref(),
            config.toc.text_font.as_deref(),
        )
        .await
    }

    fn layout(&self, config: &Config, outcome: &WalkOutcome, fonts: &FontSet) -> TocLayout {
        layout_toc(
            outcome.visible_entries(),
            &config.toc.heading,
            &config.toc.page_label,
            &self.style,
            fonts,
        )
    }

    /// Walk the schema and lay out the TOC without assembling anything.
    ///
    /// Every source document is still loaded, so page numbers, load
    /// failures and TOC warnings are exactly those a real bind would see.
    ///
    /// # Errors
    ///
    /// Returns the same errors as the walk of [`Binder::bind`].
    pub async fn plan(&self, config: &Config) -> Result<BindReport> {
        let start = Instant::now();
        let mut counter = PageCounter::new(self.reader.clone());
        let outcome = walk::walk(&config.schema, &mut counter, &Self::walk_options(config)).await?;

        let (fonts, font_warnings) = Self::load_fonts(config).await;
        let layout = self.layout(config, &outcome, &fonts);

        let mut report = BindReport::from_outcome(config, outcome, counter.input_size);
        report.record_toc(&layout, font_warnings);
        report.elapsed = start.elapsed();
        Ok(report)
    }

    /// Assemble the output document described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a source document cannot be loaded (unless skipped through
    ///   `continue_on_error`)
    /// - the page tree cannot be updated
    /// - the outline or Info dictionary cannot be written
    ///
    /// Font problems never fail a bind; they are reported as warnings.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfbinder::merge::Binder;
    /// # use pdfbinder::config::Config;
    /// # async fn example(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    /// let result = Binder::new().bind(&config).await?;
    /// println!("Bound {} pages", result.report.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn bind(&self, config: &Config) -> Result<BindResult> {
        let start = Instant::now();

        let mut assembly = Assembly::new(
            self.reader.clone(),
            self.style.page_width,
            self.style.page_height,
        );
        let outcome = walk::walk(&config.schema, &mut assembly, &Self::walk_options(config)).await?;
        debug!(
            "Walked schema: {} entries, {} files, {} pages",
            outcome.entries.len(),
            outcome.files.len(),
            outcome.total_pages
        );

        let input_size = assembly.input_size();
        let mut output = assembly.into_output();

        let (fonts, font_warnings) = Self::load_fonts(config).await;
        let layout = self.layout(config, &outcome, &fonts);
        render_toc(&mut output, outcome.toc.index, &layout, &fonts)?;

        let page_ids = output.page_ids().to_vec();
        let mut document = output.into_document();

        let outline_items = if config.toc.outline {
            self.outline
                .add_outline(&mut document, outcome.visible_entries(), &page_ids)?
        } else {
            0
        };

        self.metadata
            .set_metadata(&mut document, &config.metadata, Utc::now())?;

        let mut report = BindReport::from_outcome(config, outcome, input_size);
        report.record_toc(&layout, font_warnings);
        report.outline_items = outline_items;
        report.elapsed = start.elapsed();

        Ok(BindResult { document, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;
    use crate::error::BinderError;
    use crate::fixtures::write_sample_pdf;
    use tempfile::TempDir;

    fn config_in(dir: &Path, json: &str) -> Config {
        let file = ConfigFile::parse(json, &dir.join("binder.json"))
            .unwrap()
            .relative_to(dir);
        Config::from_file(file).unwrap()
    }

    fn dossier(dir: &Path) -> Config {
        write_sample_pdf(dir, "a.pdf", 2);
        write_sample_pdf(dir, "b.pdf", 3);
        config_in(
            dir,
            r#"{
                "output": "out.pdf",
                "schema": {
                    "Intro": { "_toc_": true },
                    "A": { "X": ["a.pdf"] },
                    "B": ["b.pdf"]
                }
            }"#,
        )
    }

    #[tokio::test]
    async fn test_bind_places_toc_and_sections() {
        let temp_dir = TempDir::new().unwrap();
        let config = dossier(temp_dir.path());

        let result = Binder::new().bind(&config).await.unwrap();
        let report = &result.report;

        assert_eq!(result.document.get_pages().len(), 6);
        assert_eq!(report.total_pages, 6);
        assert_eq!(report.toc_page, 1);
        assert!(report.toc_from_marker);
        assert_eq!(report.toc_rows, 3);
        assert_eq!(report.outline_items, 3);
        assert!(report.warnings.is_empty());

        let pages: Vec<(&str, u32)> = report
            .entries
            .iter()
            .map(|e| (e.title.as_str(), e.page))
            .collect();
        assert_eq!(pages, vec![("A", 2), ("X", 2), ("B", 4)]);
    }

    #[tokio::test]
    async fn test_plan_matches_bind() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = dossier(temp_dir.path());
        config.dry_run = true;

        let binder = Binder::new();
        let planned = binder.plan(&config).await.unwrap();
        let bound = binder.bind(&config).await.unwrap().report;

        assert!(planned.dry_run);
        assert_eq!(planned.entries, bound.entries);
        assert_eq!(planned.total_pages, bound.total_pages);
        assert_eq!(planned.files, bound.files);
        assert_eq!(planned.input_size, bound.input_size);
        assert!(!temp_dir.path().join("out.pdf").exists());
    }

    #[tokio::test]
    async fn test_outline_can_be_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = dossier(temp_dir.path());
        config.toc.outline = false;

        let result = Binder::new().bind(&config).await.unwrap();

        assert_eq!(result.report.outline_items, 0);
        assert!(!OutlineBuilder::new().has_outline(&result.document));
    }

    #[tokio::test]
    async fn test_missing_font_is_a_warning() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = dossier(temp_dir.path());
        config.toc.text_font = Some(temp_dir.path().join("nope.ttf"));

        let report = Binder::new().bind(&config).await.unwrap().report;

        assert!(matches!(
            report.warnings.as_slice(),
            [Warning::FontFallback { fallback, .. }] if fallback == "Helvetica"
        ));
    }

    #[tokio::test]
    async fn test_toc_overflow_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        write_sample_pdf(temp_dir.path(), "p.pdf", 1);
        let sections: Vec<String> = (0..40)
            .map(|i| format!(r#""Section {i:02}": ["p.pdf"]"#))
            .collect();
        let json = format!(
            r#"{{"output": "out.pdf", "schema": {{ {} }} }}"#,
            sections.join(", ")
        );
        let config = config_in(temp_dir.path(), &json);

        let report = Binder::new().bind(&config).await.unwrap().report;

        assert_eq!(report.total_pages, 41);
        assert_eq!(report.toc_rows, 36);
        assert!(report.warnings.contains(&Warning::MissingTocMarker));
        assert!(report.warnings.contains(&Warning::TocOverflow { omitted: 4 }));
    }

    #[tokio::test]
    async fn test_document_without_pages_adds_nothing() {
        let temp_dir = TempDir::new().unwrap();
        write_sample_pdf(temp_dir.path(), "empty.pdf", 0);
        write_sample_pdf(temp_dir.path(), "a.pdf", 2);
        let config = config_in(
            temp_dir.path(),
            r#"{"output": "out.pdf", "schema": {"T": {"_toc_": true}, "Empty": ["empty.pdf"], "A": ["a.pdf"]}}"#,
        );

        let result = Binder::new().bind(&config).await.unwrap();
        let report = result.report;

        assert_eq!(report.total_pages, 3);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].pages, 0);
        let pages: Vec<u32> = report.entries.iter().map(|e| e.page).collect();
        assert_eq!(pages, vec![2, 2]);
        assert_eq!(result.document.get_pages().len(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_bind() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("bad.pdf"), b"garbage").unwrap();
        let config = config_in(
            temp_dir.path(),
            r#"{"output": "out.pdf", "schema": {"T": {"_toc_": true}, "Bad": ["bad.pdf"]}}"#,
        );

        let err = Binder::new().bind(&config).await.unwrap_err();
        assert!(matches!(err, BinderError::FailedToLoadPdf { .. }));
    }
}
