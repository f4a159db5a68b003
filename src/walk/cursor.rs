//! Page accounting for the schema walk.

use serde::Serialize;
use std::path::PathBuf;

/// Next free 1-based page number in the output document.
///
/// The cursor starts at 1 and only moves forward: by the page count of each
/// inserted document, and by one for the reserved TOC page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    next: u32,
}

impl PageCursor {
    /// A cursor pointing at page 1 of an empty document.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// The page number the next inserted page will get.
    pub fn current(&self) -> u32 {
        self.next
    }

    /// Zero-based index of the next inserted page.
    pub fn next_index(&self) -> u32 {
        self.next - 1
    }

    /// Number of pages emitted so far.
    pub fn pages_emitted(&self) -> u32 {
        self.next - 1
    }

    /// Move past `pages` freshly inserted pages.
    pub fn advance(&mut self, pages: u32) {
        self.next = self.next.saturating_add(pages);
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Nesting depth, 1 for top-level sections.
    pub level: u32,
    /// Section or leaf title.
    pub title: String,
    /// 1-based page number of the first page of the entry.
    pub page: u32,
    /// Whether the entry is shown in the TOC and outline.
    pub visible: bool,
}

impl TocEntry {
    /// Zero-based index of the target page.
    pub fn page_index(&self) -> u32 {
        self.page.saturating_sub(1)
    }
}

/// Where the TOC page sits in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TocPlacement {
    /// Zero-based page index of the TOC page.
    pub index: u32,
    /// False when the schema had no marker and the TOC went to the front.
    pub from_marker: bool,
}

/// A source document whose pages made it into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertedFile {
    /// Resolved path of the source document.
    pub path: PathBuf,
    /// 1-based page number of its first page in the output.
    pub first_page: u32,
    /// Number of pages taken from it.
    pub pages: u32,
}
