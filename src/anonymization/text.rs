//! Text helpers shared by detectors and the registry

use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// Format characters that split words without being visible
fn is_invisible(c: char) -> bool {
    matches!(c, '\u{ad}' | '\u{200b}'..='\u{200d}' | '\u{2060}' | '\u{feff}')
}

/// Non-breaking spaces used inside numbers and names
fn is_fixed_space(c: char) -> bool {
    matches!(c, '\u{a0}' | '\u{2007}' | '\u{202f}')
}

/// Document text as detectors see it
///
/// Non-breaking spaces become plain spaces and invisible format characters
/// are dropped. Every byte of the scanned text remembers the range of the
/// document character it came from, so detector offsets can be mapped back
/// onto the document.
#[derive(Debug)]
pub struct ScanText<'a> {
    document: &'a str,
    scanned: Cow<'a, str>,
    origins: Vec<(usize, usize)>,
}

impl<'a> ScanText<'a> {
    pub fn new(document: &'a str) -> Self {
        if !document.chars().any(|c| is_invisible(c) || is_fixed_space(c)) {
            return Self {
                document,
                scanned: Cow::Borrowed(document),
                origins: Vec::new(),
            };
        }

        let mut scanned = String::with_capacity(document.len());
        let mut origins = Vec::with_capacity(document.len());
        for (idx, c) in document.char_indices() {
            if is_invisible(c) {
                continue;
            }
            let origin = (idx, idx + c.len_utf8());
            let c = if is_fixed_space(c) { ' ' } else { c };
            scanned.push(c);
            origins.extend(std::iter::repeat(origin).take(c.len_utf8()));
        }

        Self {
            document,
            scanned: Cow::Owned(scanned),
            origins,
        }
    }

    /// Text handed to detectors
    pub fn as_str(&self) -> &str {
        &self.scanned
    }

    /// True when the document needed no cleaning
    pub fn is_verbatim(&self) -> bool {
        matches!(self.scanned, Cow::Borrowed(_))
    }

    /// Document byte range covering scanned range `start..end`
    pub fn document_range(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if self.is_verbatim() {
            return (start < end && end <= self.document.len()).then_some((start, end));
        }
        if start >= end {
            return None;
        }
        let (doc_start, _) = *self.origins.get(start)?;
        let (_, doc_end) = *self.origins.get(end - 1)?;
        Some((doc_start, doc_end))
    }
}

/// Normalize a value for identity comparison
///
/// NFC-composes, drops invisible format characters, collapses whitespace
/// runs (non-breaking spaces included) to one space, trims and lowercases. Diacritics are preserved, so `Šimon` and `Simon` stay distinct.
pub fn normalize_value(value: &str) -> String {
    let composed: String = value.nfc().filter(|c| !is_invisible(*c)).collect();
    composed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Up to `chars` characters immediately before byte offset `at`
pub fn preceding(text: &str, at: usize, chars: usize) -> &str {
    let at = floor_boundary(text, at);
    let head = &text[..at];
    match head.char_indices().rev().take(chars).last() {
        Some((idx, _)) => &head[idx..],
        None => "",
    }
}

/// Up to `chars` characters starting at byte offset `at`
pub fn following(text: &str, at: usize, chars: usize) -> &str {
    let at = floor_boundary(text, at);
    let tail = &text[at..];
    match tail.char_indices().nth(chars) {
        Some((idx, _)) => &tail[..idx],
        None => tail,
    }
}

/// Convert a character offset to a byte offset; `None` past the end
pub fn char_to_byte(text: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == char_offset {
            return Some(idx);
        }
        count += 1;
    }
    (count == char_offset).then_some(text.len())
}

/// True when the first character is uppercase and at least one more follows
pub fn is_capitalized(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_uppercase()) && chars.next().is_some()
}

/// Last whitespace-separated word before byte offset `at`, stripped of
/// trailing punctuation
pub fn previous_word(text: &str, at: usize) -> Option<&str> {
    let at = floor_boundary(text, at);
    text[..at]
        .split_whitespace()
        .next_back()
        .map(|w| w.trim_end_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|w| !w.is_empty())
}

fn floor_boundary(text: &str, at: usize) -> usize {
    let mut at = at.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}
