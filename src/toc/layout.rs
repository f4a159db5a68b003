//! Geometry of the TOC page.
//!
//! Layout is pure: it turns visible TOC entries into positioned text runs
//! and link rectangles, measuring text through [`TextMeasure`]. Coordinates
//! here are top-down (y grows toward the bottom of the page); the renderer
//! flips them into PDF space.

use crate::walk::TocEntry;

/// Which of the two TOC fonts a run is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    /// Heading and top-level rows.
    Title,
    /// Nested rows, leaders, and page labels.
    Text,
}

/// Measures text the way it will be drawn.
pub trait TextMeasure {
    /// Width in points of `text` set in `role` at `size` points.
    fn text_width(&self, role: FontRole, text: &str, size: f32) -> f32;
}

/// Fixed geometry of the TOC page.
#[derive(Debug, Clone, PartialEq)]
pub struct TocStyle {
    /// Page width in points.
    pub page_width: f32,
    /// Page height in points.
    pub page_height: f32,
    /// Left edge of the content area.
    pub margin_left: f32,
    /// Distance from the right edge of the page to the content area.
    pub margin_right: f32,
    /// Rows are not drawn below `page_height - margin_bottom`.
    pub margin_bottom: f32,
    /// Baseline of the heading, from the top.
    pub heading_y: f32,
    /// Heading size.
    pub heading_size: f32,
    /// Baseline of the first row, from the top.
    pub first_row_y: f32,
    /// Horizontal indent per level below the top.
    pub indent_step: f32,
    /// Size of level-1 titles.
    pub top_level_size: f32,
    /// Size of deeper titles.
    pub nested_size: f32,
    /// Leader character.
    pub leader: char,
    /// Size of leaders and page labels.
    pub label_size: f32,
    /// Minimum space either side of the leader.
    pub gap: f32,
    /// Baseline-to-baseline distance between rows.
    pub row_advance: f32,
    /// Extra space before a level-1 row that follows a nested row.
    pub group_gap: f32,
    /// Link band extent above the baseline.
    pub link_above: f32,
    /// Link band extent below the baseline.
    pub link_below: f32,
}

impl Default for TocStyle {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin_left: 50.0,
            margin_right: 50.0,
            margin_bottom: 50.0,
            heading_y: 50.0,
            heading_size: 20.0,
            first_row_y: 90.0,
            indent_step: 20.0,
            top_level_size: 13.0,
            nested_size: 11.0,
            leader: '.',
            label_size: 11.0,
            gap: 5.0,
            row_advance: 20.0,
            group_gap: 5.0,
            link_above: 10.0,
            link_below: 4.0,
        }
    }
}

impl TocStyle {
    /// Width of the content area.
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Right edge of the content area.
    pub fn content_right(&self) -> f32 {
        self.page_width - self.margin_right
    }

    /// Lowest baseline a row may use.
    pub fn last_baseline(&self) -> f32 {
        self.page_height - self.margin_bottom
    }
}

/// A single run of text at a position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Font the run is drawn with.
    pub role: FontRole,
    /// Size in points.
    pub size: f32,
    /// Left edge of the run.
    pub x: f32,
    /// Baseline, from the top.
    pub y: f32,
    /// Text before encoding.
    pub text: String,
}

/// Clickable area, top-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkRect {
    /// Left edge.
    pub left: f32,
    /// Upper edge, from the top.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Lower edge, from the top.
    pub bottom: f32,
}

/// One laid-out TOC row.
#[derive(Debug, Clone, PartialEq)]
pub struct TocRow {
    /// Level of the entry.
    pub level: u32,
    /// Entry title.
    pub title: TextRun,
    /// Dot leader, absent when there is no room for a single dot.
    pub leader: Option<TextRun>,
    /// Right-aligned page label.
    pub page_label: TextRun,
    /// Number of leader characters.
    pub dots: usize,
    /// Link area covering the row.
    pub link: LinkRect,
    /// 0-based index of the page the row links to.
    pub target_index: u32,
}

/// Complete layout of the TOC page.
#[derive(Debug, Clone, PartialEq)]
pub struct TocLayout {
    /// Page width in points.
    pub page_width: f32,
    /// Page height in points.
    pub page_height: f32,
    /// Heading run.
    pub heading: TextRun,
    /// Rows that fit on the page, in order.
    pub rows: Vec<TocRow>,
    /// Visible entries that did not fit.
    pub omitted: usize,
}

/// Lay out the TOC page.
///
/// `entries` are filtered to visible ones here. Each row's label reads
/// `"{page_label} {page}"`. Rows that would fall below the bottom margin
/// are not drawn and are counted in [`TocLayout::omitted`].
pub fn layout_toc<'e, M: TextMeasure>(
    entries: impl IntoIterator<Item = &'e TocEntry>,
    heading: &str,
    page_label: &str,
    style: &TocStyle,
    measure: &M,
) -> TocLayout {
    let visible: Vec<&TocEntry> = entries.into_iter().filter(|e| e.visible).collect();

    let mut rows = Vec::with_capacity(visible.len());
    let mut y = style.first_row_y;
    let mut previous_level = None;
    let mut omitted = 0;

    for (position, entry) in visible.iter().enumerate() {
        if entry.level == 1 && previous_level.is_some_and(|level| level != 1) {
            y += style.group_gap;
        }
        if y > style.last_baseline() {
            omitted = visible.len() - position;
            break;
        }

        rows.push(layout_row(entry, y, page_label, style, measure));
        previous_level = Some(entry.level);
        y += style.row_advance;
    }

    TocLayout {
        page_width: style.page_width,
        page_height: style.page_height,
        heading: TextRun {
            role: FontRole::Title,
            size: style.heading_size,
            x: style.margin_left,
            y: style.heading_y,
            text: heading.to_string(),
        },
        rows,
        omitted,
    }
}

fn layout_row<M: TextMeasure>(
    entry: &TocEntry,
    y: f32,
    page_label: &str,
    style: &TocStyle,
    measure: &M,
) -> TocRow {
    let indent = style.indent_step * entry.level.saturating_sub(1) as f32;
    let (role, size) = if entry.level <= 1 {
        (FontRole::Title, style.top_level_size)
    } else {
        (FontRole::Text, style.nested_size)
    };

    let title_x = style.margin_left + indent;
    let title_width = measure.text_width(role, &entry.title, size);

    let label = format!("{} {}", page_label, entry.page);
    let label_width = measure.text_width(FontRole::Text, &label, style.label_size);
    let label_x = style.content_right() - label_width;

    let dots = leader_count(
        style.content_width() - indent - title_width - label_width - 2.0 * style.gap,
        measure.text_width(FontRole::Text, &style.leader.to_string(), style.label_size),
    );
    let leader = (dots > 0).then(|| TextRun {
        role: FontRole::Text,
        size: style.label_size,
        x: title_x + title_width + style.gap,
        y,
        text: std::iter::repeat_n(style.leader, dots).collect(),
    });

    TocRow {
        level: entry.level,
        title: TextRun {
            role,
            size,
            x: title_x,
            y,
            text: entry.title.clone(),
        },
        leader,
        page_label: TextRun {
            role: FontRole::Text,
            size: style.label_size,
            x: label_x,
            y,
            text: label,
        },
        dots,
        link: LinkRect {
            left: style.margin_left,
            top: y - style.link_above,
            right: style.content_right(),
            bottom: y + style.link_below,
        },
        target_index: entry.page_index(),
    }
}

/// Number of leader characters that fit in `available` points.
fn leader_count(available: f32, leader_width: f32) -> usize {
    if leader_width <= 0.0 || available <= 0.0 {
        return 0;
    }
    (available / leader_width).floor() as usize
}
