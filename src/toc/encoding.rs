//! WinAnsiEncoding for TOC text.
//!
//! TOC fonts are simple fonts with `/Encoding /WinAnsiEncoding`, so every
//! string drawn on the TOC page is one byte per character. Characters the
//! encoding cannot express are drawn as `?`.

/// First code point of the font's `/Widths` array.
pub const FIRST_CHAR: u8 = 32;

/// Last code point of the font's `/Widths` array.
pub const LAST_CHAR: u8 = 255;

/// Byte substituted for characters outside the encoding.
pub const REPLACEMENT: u8 = b'?';

/// Characters at codes 0x80..=0x9F. Unassigned codes are `None`.
const HIGH_CONTROL_RANGE: [Option<char>; 32] = [
    Some('\u{20AC}'), // 0x80 Euro
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None, // 0x90
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// The character drawn for `code`, if the encoding assigns one.
pub fn decode(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(char::from(code)),
        0x80..=0x9F => HIGH_CONTROL_RANGE[usize::from(code - 0x80)],
        _ => None,
    }
}

/// The code for `ch`, if the encoding has one.
pub fn encode_char(ch: char) -> Option<u8> {
    match ch {
        '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => u8::try_from(u32::from(ch)).ok(),
        _ => HIGH_CONTROL_RANGE
            .iter()
            .position(|&entry| entry == Some(ch))
            .and_then(|offset| u8::try_from(0x80 + offset).ok()),
    }
}

/// Encode `text`, replacing unsupported characters with `?`.
///
/// Tabs and newlines become spaces.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\t' | '\n' | '\r' => b' ',
            _ => encode_char(ch).unwrap_or(REPLACEMENT),
        })
        .collect()
}
