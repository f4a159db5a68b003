//! Table of contents page rendering.
//!
//! The TOC page is a blank page reserved during the walk. Once every
//! source document is in place, [`layout_toc`] positions the rows and
//! [`render_toc`] draws them onto that page together with one link
//! annotation per row.

pub mod encoding;
pub mod fonts;
pub mod layout;

pub use fonts::{BuiltinFont, EmbeddedFont, FontSet, TocFont};
pub use layout::{FontRole, LinkRect, TextMeasure, TextRun, TocLayout, TocRow, TocStyle, layout_toc};

use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{Object, ObjectId, Stream, StringFormat, dictionary};

use crate::error::{BinderError, Result};
use crate::merge::pages::OutputDocument;

fn font_resource(role: FontRole) -> &'static str {
    match role {
        FontRole::Title => "F1",
        FontRole::Text => "F2",
    }
}

/// Draw `layout` onto the page at `page_index`.
///
/// Replaces the page's resources and contents, and sets `/Annots` to one
/// link per row whose target page exists.
///
/// # Errors
///
/// Returns [`BinderError::PageTree`] if `page_index` is not a page of
/// `output`.
pub fn render_toc(
    output: &mut OutputDocument,
    page_index: u32,
    layout: &TocLayout,
    fonts: &FontSet,
) -> Result<()> {
    let page_id = output
        .page_id(page_index as usize)
        .ok_or_else(|| BinderError::page_tree(format!("TOC page {} does not exist", page_index + 1)))?;

    let targets: Vec<(LinkRect, ObjectId)> = layout
        .rows
        .iter()
        .filter_map(|row| match output.page_id(row.target_index as usize) {
            Some(target) => Some((row.link, target)),
            None => {
                debug!("No page {} for TOC row {:?}", row.target_index + 1, row.title.text);
                None
            }
        })
        .collect();

    let content = toc_content(layout).encode()?;

    let doc = output.document_mut();
    let title_font = fonts.title.embed(doc);
    let text_font = fonts.text.embed(doc);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let annotations: Vec<Object> = targets
        .iter()
        .map(|(rect, target)| {
            Object::Reference(doc.add_object(link_annotation(rect, *target, layout.page_height)))
        })
        .collect();
    let link_count = annotations.len();

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| BinderError::page_tree(format!("TOC page is not a dictionary: {e}")))?;
    page.set(
        "Resources",
        dictionary! {
            "Font" => dictionary! {
                font_resource(FontRole::Title) => title_font,
                font_resource(FontRole::Text) => text_font,
            },
        },
    );
    page.set("Contents", content_id);
    if !annotations.is_empty() {
        page.set("Annots", annotations);
    }

    debug!(
        "Rendered TOC on page {} ({} rows, {} links)",
        page_index + 1,
        layout.rows.len(),
        link_count
    );
    Ok(())
}

fn toc_content(layout: &TocLayout) -> Content {
    let mut operations = Vec::new();
    let height = layout.page_height;

    push_text(&mut operations, &layout.heading, height);
    for row in &layout.rows {
        push_text(&mut operations, &row.title, height);
        if let Some(leader) = &row.leader {
            push_text(&mut operations, leader, height);
        }
        push_text(&mut operations, &row.page_label, height);
    }

    Content { operations }
}

fn push_text(operations: &mut Vec<Operation>, run: &TextRun, page_height: f32) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new(
        "Tf",
        vec![Object::Name(font_resource(run.role).as_bytes().to_vec()), run.size.into()],
    ));
    operations.push(Operation::new("Td", vec![run.x.into(), (page_height - run.y).into()]));
    operations.push(Operation::new(
        "Tj",
        vec![Object::String(encoding::encode(&run.text), StringFormat::Hexadecimal)],
    ));
    operations.push(Operation::new("ET", vec![]));
}

fn link_annotation(rect: &LinkRect, target: ObjectId, page_height: f32) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![
            Object::Real(rect.left),
            Object::Real(page_height - rect.bottom),
            Object::Real(rect.right),
            Object::Real(page_height - rect.top),
        ],
        "Border" => vec![Object::Integer(0); 3],
        "Dest" => vec![
            Object::Reference(target),
            Object::Name(b"XYZ".to_vec()),
            Object::Null,
            Object::Null,
            Object::Null,
        ],
    }
}
