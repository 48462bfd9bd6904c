//! Phone, email and postal address detectors

use super::context::{has_label_before, is_legal_reference, ADDRESS_LABEL};
use super::PiiDetector;
use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::lexicon::Lexicon;
use crate::anonymization::models::{DetectionMethod, PiiCategory, SourcePriority, Span};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

// Lookarounds keep the nine digits from being cut out of longer numbers or
// account numbers followed by a bank code.
static PHONE: Lazy<fancy_regex::Regex> = Lazy::new(|| {
    fancy_regex::Regex::new(
        r"(?<![\d/\-])(?:(?:\+|00)420[ \-]?)?[2-9]\d{2}[ \-]?\d{3}[ \-]?\d{3}(?![\d])(?!\s*/\s*\d)",
    )
    .unwrap()
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}\b").unwrap()
});

static ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \b\p{Lu}[\p{L}.]*                                   # first street word, capitalized
        (?:[\x20\t]+\p{L}[\p{L}.]*){0,3}                    # up to three more words
        [\x20\t]+(?P<number>\d{1,4}(?:/\d{1,4})?[a-zA-Z]?)\b  # house number, optional orientation number
        (?P<postal>
            ,?[\x20\t]*\d{3}[\x20\t]?\d{2}                  # postal code
            [\x20\t]+\p{Lu}\p{L}+                           # city
            (?:[\x20\t]+(?:nad|pod|u)[\x20\t]+\p{Lu}\p{L}+)?
            (?:[\x20\t]*-[\x20\t]*\p{L}+)?                  # city part
            (?:[\x20\t]+\d{1,2}\b)?                         # district
        )?",
    )
    .unwrap()
});

static STREET_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\x20\t]+").unwrap());

/// Residence words that end a street name when they appear inside the
/// matched word run (`Jan Novák bytem Dlouhá 12`)
const STREET_BREAK_WORDS: &[&str] = &[
    "bytem", "bydlí", "bydlící", "bydlištěm", "trvale", "trvalým", "pobytem", "sídlem", "se",
];

/// Czech phone number with optional `+420` / `00420` prefix
#[derive(Debug, Default)]
pub struct PhoneDetector;

impl PhoneDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PiiDetector for PhoneDetector {
    fn name(&self) -> &'static str {
        "phone"
    }

    fn min_level(&self) -> AnonymizationLevel {
        AnonymizationLevel::Standard
    }

    fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
        let mut spans = Vec::new();
        for found in PHONE.find_iter(text) {
            let m = found.context("Phone pattern evaluation failed")?;
            if is_legal_reference(text, m.start(), m.end()) {
                continue;
            }
            spans.extend(Span::from_document(
                text,
                PiiCategory::Phone,
                m.start(),
                m.end(),
                SourcePriority::Pattern,
                DetectionMethod::Regex,
            ));
        }
        Ok(spans)
    }
}

/// Email address
#[derive(Debug, Default)]
pub struct EmailDetector;

impl EmailDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PiiDetector for EmailDetector {
    fn name(&self) -> &'static str {
        "email"
    }

    fn min_level(&self) -> AnonymizationLevel {
        AnonymizationLevel::Standard
    }

    fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
        Ok(EMAIL
            .find_iter(text)
            .filter_map(|m| {
                Span::from_document(
                    text,
                    PiiCategory::Email,
                    m.start(),
                    m.end(),
                    SourcePriority::Pattern,
                    DetectionMethod::Regex,
                )
            })
            .collect())
    }
}

/// Street, house number and optional postal code with city
///
/// A match with a postal code stands on its own; without one the address
/// must follow a label such as `bytem` or `sídlo`. The street never spans a
/// residence word, never starts on a lexicon stop word, and leading lexicon
/// names are left to the name detector when a street word follows them.
#[derive(Debug, Default)]
pub struct AddressDetector {
    lexicon: Option<Arc<Lexicon>>,
}

impl AddressDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the lexicon to keep names and common words out of street names
    pub fn with_lexicon(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon: Some(lexicon),
        }
    }

    fn is_street_break(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        STREET_BREAK_WORDS.contains(&lower.as_str())
            || ADDRESS_LABEL.is_match(word)
            || self.lexicon.as_ref().is_some_and(|lex| lex.is_stop_word(word))
    }

    fn is_name(&self, word: &str) -> bool {
        self.lexicon
            .as_ref()
            .is_some_and(|lex| lex.is_first_name(word) || lex.is_known_surname(word))
    }

    /// Byte offset where the street really begins inside `start..number`,
    /// or `None` when no street word survives
    fn street_start(&self, text: &str, start: usize, number: usize) -> Option<usize> {
        let words: Vec<(usize, &str)> = STREET_WORD
            .find_iter(&text[start..number])
            .map(|m| (start + m.start(), m.as_str()))
            .collect();

        let mut begin = 0;
        for (i, (_, word)) in words.iter().enumerate() {
            if self.is_street_break(word) {
                begin = i + 1;
            }
        }

        let rest = &words[begin..];
        if rest.iter().any(|(_, w)| !self.is_name(w)) {
            begin += rest.iter().take_while(|(_, w)| self.is_name(w)).count();
        }

        words.get(begin).map(|(offset, _)| *offset)
    }
}

impl PiiDetector for AddressDetector {
    fn name(&self) -> &'static str {
        "address"
    }

    fn min_level(&self) -> AnonymizationLevel {
        AnonymizationLevel::Standard
    }

    fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
        let mut spans = Vec::new();
        for caps in ADDRESS.captures_iter(text) {
            let (Some(whole), Some(number)) = (caps.get(0), caps.name("number")) else {
                continue;
            };
            let Some(start) = self.street_start(text, whole.start(), number.start()) else {
                continue;
            };
            let has_postal = caps.name("postal").is_some();
            if !has_postal && !has_label_before(&ADDRESS_LABEL, text, start) {
                continue;
            }
            let confidence = if has_postal { 0.95 } else { 0.8 };
            spans.extend(
                Span::from_document(
                    text,
                    PiiCategory::Address,
                    start,
                    whole.end(),
                    SourcePriority::Pattern,
                    DetectionMethod::Regex,
                )
                .map(|span| span.with_confidence(confidence)),
            );
        }
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn detect(detector: &dyn PiiDetector, text: &str) -> Vec<Span> {
        detector.detect(text, AnonymizationLevel::Standard).unwrap()
    }

    #[test_case("tel. 777 123 456", "777 123 456" ; "spaced mobile")]
    #[test_case("tel. +420 777 123 456", "+420 777 123 456" ; "international prefix")]
    #[test_case("tel. 00420777123456", "00420777123456" ; "double zero prefix")]
    #[test_case("tel. 602-123-456.", "602-123-456" ; "dashes")]
    fn test_phone_formats(text: &str, expected: &str) {
        let spans = detect(&PhoneDetector::new(), text);
        assert_eq!(spans.len(), 1, "{text}");
        assert_eq!(spans[0].text, expected);
    }

    #[test]
    fn test_phone_not_taken_from_longer_numbers() {
        assert!(detect(&PhoneDetector::new(), "č. 2000145399").is_empty());
        assert!(detect(&PhoneDetector::new(), "účet 777123456/0100").is_empty());
        assert!(detect(&PhoneDetector::new(), "777 123 45").is_empty());
    }

    #[test]
    fn test_email() {
        let spans = detect(&EmailDetector::new(), "Kontakt: jan.novak@example.cz.");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "jan.novak@example.cz");
    }

    #[test]
    fn test_address_with_postal_code_is_one_span() {
        let text = "Václavské náměstí 1, 110 00 Praha 1";
        let spans = detect(&AddressDetector::new(), text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, text);
    }

    #[test]
    fn test_address_in_sentence() {
        let text = "Nájemce bydlí v ulici Dlouhá 12/5a, 602 00 Brno - Střed. Dále";
        let spans = detect(&AddressDetector::new(), text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Dlouhá 12/5a, 602 00 Brno - Střed");
    }

    fn lexicon_detector() -> AddressDetector {
        AddressDetector::with_lexicon(Arc::new(Lexicon::embedded().unwrap()))
    }

    #[test]
    fn test_address_stops_at_residence_word() {
        let text = "Nájemce Jan Novák bytem Dlouhá 12, 602 00 Brno";
        for detector in [AddressDetector::new(), lexicon_detector()] {
            let spans = detect(&detector, text);
            assert_eq!(spans.len(), 1);
            assert_eq!(spans[0].text, "Dlouhá 12, 602 00 Brno");
        }
    }

    #[test]
    fn test_address_leaves_leading_name_to_name_detector() {
        let spans = detect(&lexicon_detector(), "Jan Novák Dlouhá 12, 602 00 Brno");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Dlouhá 12, 602 00 Brno");
    }

    #[test]
    fn test_street_named_after_person_kept_whole() {
        let spans = detect(&lexicon_detector(), "Jana Nováka 5, 120 00 Praha 2");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Jana Nováka 5, 120 00 Praha 2");
    }

    #[test]
    fn test_stop_word_is_not_a_street() {
        let text = "Článek 3, odst. 2 a Článek 12, 110 00 Praha";
        assert!(detect(&lexicon_detector(), text).is_empty());
    }

    #[test]
    fn test_address_without_postal_code_needs_label() {
        assert!(detect(&AddressDetector::new(), "Článek 5 smlouvy").is_empty());
        let spans = detect(&AddressDetector::new(), "trvale bytem Na Příkopě 12");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Na Příkopě 12");
    }
}
