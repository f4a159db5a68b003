//! Recursive schema walk.
//!
//! The walk visits the schema in declaration order. It records one
//! [`TocEntry`] per section and per leaf, hands every source document to a
//! [`PageSink`], and keeps the [`PageCursor`] in step with the pages the sink
//! actually received.
//!
//! All state lives in an explicit [`WalkContext`] that is threaded through the
//! recursion by `&mut`.

mod cursor;

pub use cursor::{InsertedFile, PageCursor, TocEntry, TocPlacement};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use log::{debug, trace};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{BinderError, Result, Warning};
use crate::schema::{Schema, SchemaChild, SchemaNode};
use crate::utils;

/// Receiver of the pages produced by the walk.
pub trait PageSink {
    /// Load the document at `path` and append all of its pages.
    ///
    /// Returns the number of pages appended.
    fn append_file<'a>(&'a mut self, path: &'a Path) -> LocalBoxFuture<'a, Result<u32>>;

    /// Insert an empty page at zero-based `index`.
    fn insert_blank_page(&mut self, index: u32) -> Result<()>;
}

/// Options controlling how leaf entries are resolved.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Directory that leaf file names are resolved against.
    pub input_dir: PathBuf,
    /// Skip documents that fail to load instead of aborting.
    pub continue_on_error: bool,
}

#[derive(Debug)]
struct Ancestor<'s> {
    title: &'s str,
    hidden: bool,
}

/// Mutable state of one walk.
#[derive(Debug)]
pub struct WalkContext<'s> {
    options: &'s WalkOptions,
    cursor: PageCursor,
    ancestors: Vec<Ancestor<'s>>,
    entries: Vec<TocEntry>,
    toc_index: Option<u32>,
    files: Vec<InsertedFile>,
    warnings: Vec<Warning>,
}

impl<'s> WalkContext<'s> {
    fn new(options: &'s WalkOptions) -> Self {
        Self {
            options,
            cursor: PageCursor::new(),
            ancestors: Vec::new(),
            entries: Vec::new(),
            toc_index: None,
            files: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn under_hidden_section(&self) -> bool {
        self.ancestors.iter().any(|ancestor| ancestor.hidden)
    }

    fn record_entry(&mut self, level: u32, title: &str, hidden: bool) {
        let visible = !hidden && !self.under_hidden_section();
        trace!(
            "entry level={level} page={} visible={visible}: {title}",
            self.cursor.current()
        );
        self.entries.push(TocEntry {
            level,
            title: title.to_string(),
            page: self.cursor.current(),
            visible,
        });
    }

    fn place_toc<S: PageSink>(&mut self, title: &str, sink: &mut S) -> Result<()> {
        if self.toc_index.is_some() {
            return Err(BinderError::invalid_schema(format!(
                "second TOC placement marker at \"{title}\""
            )));
        }

        let index = self.cursor.next_index();
        sink.insert_blank_page(index)?;
        self.toc_index = Some(index);
        self.cursor.advance(1);
        debug!("Reserved page {} for the table of contents", index + 1);
        Ok(())
    }

    fn resolve(&mut self, name: &str) -> Result<Vec<PathBuf>> {
        let path = self.options.input_dir.join(name);
        if !utils::is_glob_pattern(name) {
            return Ok(vec![path]);
        }

        // Only the leaf entry is a pattern; the directory is matched literally
        let escaped_dir = glob::Pattern::escape(&self.options.input_dir.to_string_lossy());
        let matches =
            utils::expand_glob(&Path::new(&escaped_dir).join(name).to_string_lossy())?;

        let pattern = path.to_string_lossy().into_owned();
        if matches.is_empty() {
            self.warnings.push(Warning::NoMatches { pattern });
        } else {
            debug!("Pattern {pattern} matched {} file(s)", matches.len());
        }
        Ok(matches)
    }

    async fn insert_file<S: PageSink>(&mut self, path: PathBuf, sink: &mut S) -> Result<()> {
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return self.skip_or_fail(BinderError::not_a_file(path)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.warnings.push(Warning::MissingFile { path });
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }

        match sink.append_file(&path).await {
            Ok(pages) => {
                debug!(
                    "Inserted {} ({pages} page(s)) at page {}",
                    path.display(),
                    self.cursor.current()
                );
                self.files.push(InsertedFile {
                    path,
                    first_page: self.cursor.current(),
                    pages,
                });
                self.cursor.advance(pages);
                Ok(())
            }
            Err(err) => self.skip_or_fail(err),
        }
    }

    fn skip_or_fail(&mut self, err: BinderError) -> Result<()> {
        if !(self.options.continue_on_error && err.is_recoverable()) {
            return Err(err);
        }

        let path = match &err {
            BinderError::FailedToLoadPdf { path, .. }
            | BinderError::EncryptedPdf { path }
            | BinderError::NotAFile { path } => path.clone(),
            _ => PathBuf::new(),
        };
        self.warnings.push(Warning::SkippedFile {
            path,
            reason: err.to_string(),
        });
        Ok(())
    }

    fn finish<S: PageSink>(mut self, sink: &mut S) -> Result<WalkOutcome> {
        let from_marker = self.toc_index.is_some();
        let index = match self.toc_index {
            Some(index) => index,
            None => {
                sink.insert_blank_page(0)?;
                self.cursor.advance(1);
                for entry in &mut self.entries {
                    entry.page += 1;
                }
                for file in &mut self.files {
                    file.first_page += 1;
                }
                self.warnings.push(Warning::MissingTocMarker);
                0
            }
        };

        Ok(WalkOutcome {
            entries: self.entries,
            toc: TocPlacement { index, from_marker },
            total_pages: self.cursor.pages_emitted(),
            files: self.files,
            warnings: self.warnings,
        })
    }
}

/// Frozen result of a completed walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkOutcome {
    /// Every entry in walk order, hidden ones included.
    pub entries: Vec<TocEntry>,
    /// Position of the TOC page.
    pub toc: TocPlacement,
    /// Pages in the output, TOC page included.
    pub total_pages: u32,
    /// Source documents that were inserted.
    pub files: Vec<InsertedFile>,
    /// Non-fatal conditions met during the walk.
    pub warnings: Vec<Warning>,
}

impl WalkOutcome {
    /// Entries shown in the TOC and the outline.
    pub fn visible_entries(&self) -> impl Iterator<Item = &TocEntry> {
        self.entries.iter().filter(|entry| entry.visible)
    }
}

/// Walk `schema`, feeding every resolved document to `sink`.
///
/// A TOC page is always reserved: at the marker when the schema has one,
/// otherwise at the front of the document, in which case every recorded page
/// number is shifted by one.
///
/// # Errors
///
/// Returns an error if:
/// - a file pattern is malformed
/// - a document fails to load (unless `continue_on_error` is set and the
///   failure is recoverable)
/// - the sink cannot insert the TOC page
pub async fn walk<S: PageSink>(
    schema: &Schema,
    sink: &mut S,
    options: &WalkOptions,
) -> Result<WalkOutcome> {
    let mut ctx = WalkContext::new(options);
    walk_children(schema.children(), 1, &mut ctx, sink).await?;
    ctx.finish(sink)
}

fn walk_children<'a, 's: 'a, S: PageSink + 'a>(
    children: &'s [SchemaChild],
    level: u32,
    ctx: &'a mut WalkContext<'s>,
    sink: &'a mut S,
) -> LocalBoxFuture<'a, Result<()>> {
    async move {
        for child in children {
            match &child.node {
                SchemaNode::TocMarker => ctx.place_toc(&child.title, sink)?,
                SchemaNode::Section(section) => {
                    ctx.record_entry(level, &child.title, section.hidden);
                    ctx.ancestors.push(Ancestor {
                        title: &child.title,
                        hidden: section.hidden,
                    });
                    walk_children(&section.children, level + 1, ctx, sink).await?;
                    if let Some(ancestor) = ctx.ancestors.pop() {
                        trace!("Leaving section {}", ancestor.title);
                    }
                }
                SchemaNode::Leaf(leaf) => {
                    ctx.record_entry(level, &child.title, false);
                    for name in &leaf.files {
                        for path in ctx.resolve(name)? {
                            ctx.insert_file(path, sink).await?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
    .boxed_local()
}
