//! Fonts used on the TOC page.
//!
//! Each TOC font is either one of the standard Helvetica faces, which every
//! PDF viewer provides, or a TrueType/OpenType file embedded whole as a
//! simple font. Both kinds use WinAnsiEncoding and publish `/Widths`, so the
//! widths used for layout are exactly the widths the viewer draws with.

use log::debug;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::path::{Path, PathBuf};

use super::encoding::{self, FIRST_CHAR, LAST_CHAR};
use super::layout::{FontRole, TextMeasure};
use crate::error::{BinderError, Result, Warning};

/// Width used for glyphs without a better estimate.
const DEFAULT_WIDTH: u16 = 556;

/// Helvetica advance widths for codes 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32..47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48..63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64..79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80..95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96..111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112..126
];

/// Helvetica-Bold advance widths for codes 32..=126, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32..47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48..63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64..79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80..95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96..111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112..126
];

/// One of the standard 14 fonts used without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    /// Helvetica
    Helvetica,
    /// Helvetica-Bold
    HelveticaBold,
}

impl BuiltinFont {
    /// PostScript name used as `/BaseFont`.
    pub fn base_font(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Fallback face for a role.
    pub fn for_role(role: FontRole) -> Self {
        match role {
            FontRole::Title => Self::HelveticaBold,
            FontRole::Text => Self::Helvetica,
        }
    }

    fn ascii_widths(self) -> &'static [u16; 95] {
        match self {
            Self::Helvetica => &HELVETICA_WIDTHS,
            Self::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Advance width of an encoded byte, in 1/1000 em.
    ///
    /// Accented letters take the width of their base letter.
    pub fn code_width(self, code: u8) -> u16 {
        let table = self.ascii_widths();
        let Some(ch) = encoding::decode(code) else {
            return DEFAULT_WIDTH;
        };
        if let Some(width) = ascii_width(table, ch) {
            return width;
        }
        if let Some(width) = fold_to_ascii(ch).and_then(|base| ascii_width(table, base)) {
            return width;
        }
        symbol_width(ch).unwrap_or(DEFAULT_WIDTH)
    }
}

fn ascii_width(table: &[u16; 95], ch: char) -> Option<u16> {
    let index = u32::from(ch).checked_sub(u32::from(FIRST_CHAR))?;
    table.get(usize::try_from(index).ok()?).copied()
}

fn fold_to_ascii(ch: char) -> Option<char> {
    let base = match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ð' => 'D',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        'Þ' => 'P',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ð' | 'ò'..='ö' | 'ø' => 'o',
        'ñ' => 'n',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'þ' => 'p',
        'Š' => 'S',
        'š' => 's',
        'Ž' => 'Z',
        'ž' => 'z',
        '\u{A0}' => ' ',
        _ => return None,
    };
    Some(base)
}

fn symbol_width(ch: char) -> Option<u16> {
    let width = match ch {
        'Æ' | 'Œ' | '…' | '‰' | '—' | '™' => 1000,
        'æ' | 'œ' => 889,
        '×' | '÷' | '±' | '¬' => 584,
        '•' => 350,
        '‚' | '‘' | '’' => 222,
        '„' | '“' | '”' | '‹' | '›' | 'ˆ' | '˜' | '´' | '¨' | '¯' | '¸' => 333,
        _ => return None,
    };
    Some(width)
}

/// Metrics and program of a font file embedded in the output.
#[derive(Debug, Clone)]
pub struct EmbeddedFont {
    /// Sanitized PostScript name.
    pub name: String,
    /// Source path, for diagnostics.
    pub path: PathBuf,
    /// Advance widths for codes 32..=255, in 1/1000 em.
    pub widths: Vec<u16>,
    /// Ascent in 1/1000 em.
    pub ascent: i32,
    /// Descent in 1/1000 em.
    pub descent: i32,
    /// Cap height in 1/1000 em.
    pub cap_height: i32,
    /// Font bounding box in 1/1000 em.
    pub bbox: [i32; 4],
    /// Whether the outlines are CFF (an `OTTO` OpenType file).
    pub cff: bool,
    data: Vec<u8>,
}

impl EmbeddedFont {
    /// Parse a TrueType or OpenType font program.
    ///
    /// # Errors
    ///
    /// Returns [`BinderError::FontUnavailable`] when the data is not a font
    /// ttf-parser can read.
    pub fn parse(path: &Path, data: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| BinderError::font_unavailable(path.to_path_buf(), e.to_string()))?;

        let units_per_em = f32::from(face.units_per_em().max(1));
        let scale = |value: f32| (value * 1000.0 / units_per_em).round() as i32;

        let notdef_width = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .map(|advance| scale(f32::from(advance)))
            .unwrap_or(i32::from(DEFAULT_WIDTH));

        let widths = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                encoding::decode(code)
                    .and_then(|ch| face.glyph_index(ch))
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| scale(f32::from(advance)))
                    .unwrap_or(notdef_width)
                    .clamp(0, i32::from(u16::MAX)) as u16
            })
            .collect();

        let bbox = face.global_bounding_box();
        let ascent = scale(f32::from(face.ascender()));
        let name = postscript_name(&face).unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "EmbeddedFont".to_string())
        });

        let font = Self {
            name: sanitize_font_name(&name),
            path: path.to_path_buf(),
            widths,
            ascent,
            descent: scale(f32::from(face.descender())),
            cap_height: face
                .capital_height()
                .map(|value| scale(f32::from(value)))
                .unwrap_or(ascent),
            bbox: [
                scale(f32::from(bbox.x_min)),
                scale(f32::from(bbox.y_min)),
                scale(f32::from(bbox.x_max)),
                scale(f32::from(bbox.y_max)),
            ],
            cff: data.starts_with(b"OTTO"),
            data,
        };

        debug!(
            "Parsed font {} from {} ({} bytes, cff: {})",
            font.name,
            path.display(),
            font.data.len(),
            font.cff
        );
        Ok(font)
    }

    /// Advance width of an encoded byte, in 1/1000 em.
    pub fn code_width(&self, code: u8) -> u16 {
        code.checked_sub(FIRST_CHAR)
            .and_then(|index| self.widths.get(usize::from(index)))
            .copied()
            .unwrap_or(DEFAULT_WIDTH)
    }
}

fn postscript_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
        .find_map(|name| name.to_string())
        .filter(|name| !name.trim().is_empty())
}

/// Keep only characters that are safe in a PDF name.
fn sanitize_font_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '+'))
        .collect();
    if cleaned.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        cleaned
    }
}

/// A font ready to measure and draw TOC text.
#[derive(Debug, Clone)]
pub enum TocFont {
    /// Standard font, referenced by name.
    Builtin(BuiltinFont),
    /// Font program embedded in the output.
    Embedded(Box<EmbeddedFont>),
}

impl TocFont {
    /// Width of `text` at `size` points, as drawn after encoding.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = encoding::encode(text)
            .into_iter()
            .map(|code| u32::from(self.code_width(code)))
            .sum();
        units as f32 * size / 1000.0
    }

    fn code_width(&self, code: u8) -> u16 {
        match self {
            Self::Builtin(font) => font.code_width(code),
            Self::Embedded(font) => font.code_width(code),
        }
    }

    /// Name written as `/BaseFont`.
    pub fn base_font(&self) -> &str {
        match self {
            Self::Builtin(font) => font.base_font(),
            Self::Embedded(font) => &font.name,
        }
    }

    /// Add the font dictionary (and for embedded fonts the descriptor and
    /// program) to `doc`, returning the font dictionary's id.
    pub fn embed(&self, doc: &mut Document) -> ObjectId {
        match self {
            Self::Builtin(font) => doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            }),
            Self::Embedded(font) => embed_program(doc, font),
        }
    }
}

fn embed_program(doc: &mut Document, font: &EmbeddedFont) -> ObjectId {
    let mut program_dict = dictionary! {
        "Length1" => font.data.len() as i64,
    };
    if font.cff {
        program_dict.set("Subtype", "OpenType");
    }
    let program_id = doc.add_object(Stream::new(program_dict, font.data.clone()));

    let program_key = if font.cff { "FontFile3" } else { "FontFile2" };
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(font.name.clone().into_bytes()),
        "Flags" => 32,
        "FontBBox" => font.bbox.iter().map(|&v| Object::Integer(i64::from(v))).collect::<Vec<_>>(),
        "ItalicAngle" => 0,
        "Ascent" => font.ascent,
        "Descent" => font.descent,
        "CapHeight" => font.cap_height,
        "StemV" => 80,
        "MissingWidth" => i64::from(DEFAULT_WIDTH),
        program_key => program_id,
    });

    let widths: Vec<Object> = font
        .widths
        .iter()
        .map(|&width| Object::Integer(i64::from(width)))
        .collect();

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => if font.cff { "Type1" } else { "TrueType" },
        "BaseFont" => Object::Name(font.name.clone().into_bytes()),
        "FirstChar" => i64::from(FIRST_CHAR),
        "LastChar" => i64::from(LAST_CHAR),
        "Widths" => widths,
        "FontDescriptor" => descriptor_id,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// The pair of fonts the TOC is drawn with.
#[derive(Debug, Clone)]
pub struct FontSet {
    /// Heading and top-level rows.
    pub title: TocFont,
    /// Nested rows, leaders, and page labels.
    pub text: TocFont,
}

impl Default for FontSet {
    fn default() -> Self {
        Self {
            title: TocFont::Builtin(BuiltinFont::HelveticaBold),
            text: TocFont::Builtin(BuiltinFont::Helvetica),
        }
    }
}

impl FontSet {
    /// Load the configured fonts, falling back to Helvetica faces.
    ///
    /// A font that cannot be read or parsed never fails the bind; it is
    /// replaced and reported as a [`Warning::FontFallback`].
    pub async fn load(title: Option<&Path>, text: Option<&Path>) -> (Self, Vec<Warning>) {
        let mut warnings = Vec::new();
        let title = load_font(title, FontRole::Title, &mut warnings).await;
        let text = load_font(text, FontRole::Text, &mut warnings).await;
        (Self { title, text }, warnings)
    }

    /// Font for a role.
    pub fn font(&self, role: FontRole) -> &TocFont {
        match role {
            FontRole::Title => &self.title,
            FontRole::Text => &self.text,
        }
    }
}

impl TextMeasure for FontSet {
    fn text_width(&self, role: FontRole, text: &str, size: f32) -> f32 {
        self.font(role).text_width(text, size)
    }
}

async fn load_font(path: Option<&Path>, role: FontRole, warnings: &mut Vec<Warning>) -> TocFont {
    let fallback = BuiltinFont::for_role(role);
    let Some(path) = path else {
        return TocFont::Builtin(fallback);
    };

    let loaded = match tokio::fs::read(path).await {
        Ok(data) => EmbeddedFont::parse(path, data),
        Err(e) => Err(BinderError::font_unavailable(path.to_path_buf(), e.to_string())),
    };

    match loaded {
        Ok(font) => TocFont::Embedded(Box::new(font)),
        Err(err) => {
            debug!("Falling back to {}: {}", fallback.base_font(), err);
            warnings.push(Warning::FontFallback {
                path: path.to_path_buf(),
                reason: match err {
                    BinderError::FontUnavailable { reason, .. } => reason,
                    other => other.to_string(),
                },
                fallback: fallback.base_font().to_string(),
            });
            TocFont::Builtin(fallback)
        }
    }
}
