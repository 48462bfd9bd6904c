//! Personal identifier detectors: birth numbers, ID cards, insurance numbers

use super::context::{
    has_label_before, is_legal_reference, BIRTH_NUMBER_LABEL, ID_CARD_LABEL, INSURANCE_LABEL,
};
use super::PiiDetector;
use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::models::{DetectionMethod, PiiCategory, SourcePriority, Span};
use anyhow::Result;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static BIRTH_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{6})[ \t]*/[ \t]*(\d{3,4})\b").unwrap());

static BIRTH_NUMBER_UNSEPARATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{6})(\d{3,4})\b").unwrap());

static ID_CARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:[A-Z]{2,3}[ \t]?\d{6,9}|\d{9})\b").unwrap());

static INSURANCE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\d{3}[ ]\d{2}[ ]\d{3}|\d{8,10})\b").unwrap());

/// Czech birth number (rodné číslo)
///
/// `YYMMDD/XXXX` (or `YYMMDD/XXX` before 1954). The date part must decode
/// to a real calendar date under the month encoding: +50 for women, +20
/// (men) and +70 (women) for numbers issued from 2004. Without the slash
/// the number is only accepted after a birth-number label.
#[derive(Debug, Default)]
pub struct BirthNumberDetector;

impl BirthNumberDetector {
    pub fn new() -> Self {
        Self
    }

    fn candidate(&self, text: &str, start: usize, end: usize, date: &str, suffix: &str) -> Option<Span> {
        if is_legal_reference(text, start, end) {
            return None;
        }
        decode_birth_date(date, suffix)?;
        let confidence = if birth_number_checksum_ok(date, suffix) {
            1.0
        } else {
            0.85
        };
        Span::from_document(
            text,
            PiiCategory::BirthId,
            start,
            end,
            SourcePriority::Pattern,
            DetectionMethod::Regex,
        )
        .map(|span| span.with_confidence(confidence))
    }
}

impl PiiDetector for BirthNumberDetector {
    fn name(&self) -> &'static str {
        "birth_number"
    }

    fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
        let mut spans = Vec::new();

        for caps in BIRTH_NUMBER.captures_iter(text) {
            let (Some(whole), Some(date), Some(suffix)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            spans.extend(self.candidate(text, whole.start(), whole.end(), date.as_str(), suffix.as_str()));
        }

        for caps in BIRTH_NUMBER_UNSEPARATED.captures_iter(text) {
            let (Some(whole), Some(date), Some(suffix)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if !has_label_before(&BIRTH_NUMBER_LABEL, text, whole.start()) {
                continue;
            }
            spans.extend(self.candidate(text, whole.start(), whole.end(), date.as_str(), suffix.as_str()));
        }

        Ok(spans)
    }
}

/// Decode the `YYMMDD` part of a birth number into a calendar date
pub fn decode_birth_date(date: &str, suffix: &str) -> Option<NaiveDate> {
    if date.len() != 6 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let yy: i32 = date[0..2].parse().ok()?;
    let mut month: u32 = date[2..4].parse().ok()?;
    let day: u32 = date[4..6].parse().ok()?;

    let year = match suffix.len() {
        // three-digit suffixes were issued only until 1953
        3 if yy < 54 => 1900 + yy,
        3 => return None,
        4 if yy >= 54 => 1900 + yy,
        4 => 2000 + yy,
        _ => return None,
    };

    let extended = if month > 70 {
        month -= 70;
        true
    } else if month > 50 {
        month -= 50;
        false
    } else if month > 20 {
        month -= 20;
        true
    } else {
        false
    };
    if extended && year < 2004 {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Mod-11 check of a ten-digit birth number
///
/// Nine-digit numbers carry no check digit and always pass.
pub fn birth_number_checksum_ok(date: &str, suffix: &str) -> bool {
    if suffix.len() == 3 {
        return true;
    }
    let digits = format!("{date}{suffix}");
    let Ok(full) = digits.parse::<u64>() else {
        return false;
    };
    if full % 11 == 0 {
        return true;
    }
    // numbers whose first nine digits leave remainder 10 end in 0
    let head = full / 10;
    head % 11 == 10 && full % 10 == 0
}

/// Identity card or passport number, only after an ID-card label
#[derive(Debug, Default)]
pub struct IdCardDetector;

impl IdCardDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PiiDetector for IdCardDetector {
    fn name(&self) -> &'static str {
        "id_card"
    }

    fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
        Ok(ID_CARD
            .find_iter(text)
            .filter(|m| has_label_before(&ID_CARD_LABEL, text, m.start()))
            .filter(|m| !is_legal_reference(text, m.start(), m.end()))
            .filter_map(|m| {
                Span::from_document(
                    text,
                    PiiCategory::IdCard,
                    m.start(),
                    m.end(),
                    SourcePriority::Pattern,
                    DetectionMethod::Regex,
                )
            })
            .map(|span| span.with_confidence(0.9))
            .collect())
    }
}

/// Insurance, company and other generic personal numbers after an
/// identification label
#[derive(Debug, Default)]
pub struct InsuranceNumberDetector;

impl InsuranceNumberDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PiiDetector for InsuranceNumberDetector {
    fn name(&self) -> &'static str {
        "insurance_number"
    }

    fn min_level(&self) -> AnonymizationLevel {
        AnonymizationLevel::Full
    }

    fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
        Ok(INSURANCE_NUMBER
            .find_iter(text)
            .filter(|m| has_label_before(&INSURANCE_LABEL, text, m.start()))
            .filter(|m| !is_legal_reference(text, m.start(), m.end()))
            .filter_map(|m| {
                Span::from_document(
                    text,
                    PiiCategory::SocialSecurity,
                    m.start(),
                    m.end(),
                    SourcePriority::Pattern,
                    DetectionMethod::Regex,
                )
            })
            .map(|span| span.with_confidence(0.7))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn detect(detector: &dyn PiiDetector, text: &str) -> Vec<Span> {
        detector.detect(text, AnonymizationLevel::Full).unwrap()
    }

    #[test_case("850315", "1234", Some((1985, 3, 15)) ; "male")]
    #[test_case("855315", "0001", Some((1985, 3, 15)) ; "female offset")]
    #[test_case("105212", "0003", Some((2010, 2, 12)) ; "female after 2000")]
    #[test_case("047215", "1234", Some((2004, 2, 15)) ; "extended female offset")]
    #[test_case("032215", "1234", None ; "extended offset before 2004")]
    #[test_case("851345", "1234", None ; "invalid month")]
    #[test_case("850230", "1234", None ; "invalid day")]
    #[test_case("450101", "123", Some((1945, 1, 1)) ; "three digit suffix")]
    #[test_case("850101", "123", None ; "three digit suffix after 1953")]
    fn test_decode_birth_date(date: &str, suffix: &str, expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(decode_birth_date(date, suffix), expected);
    }

    #[test]
    fn test_checksum() {
        assert!(birth_number_checksum_ok("850315", "1228"));
        assert!(!birth_number_checksum_ok("850315", "1234"));
        assert!(birth_number_checksum_ok("450101", "123"));
    }

    #[test]
    fn test_birth_number_detected_with_label_text() {
        let text = "Rodné číslo: 850315/1234";
        let spans = detect(&BirthNumberDetector::new(), text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "850315/1234");
        assert_eq!(spans[0].category, PiiCategory::BirthId);
    }

    #[test]
    fn test_birth_number_with_spaces_around_slash() {
        let spans = detect(&BirthNumberDetector::new(), "r.č. 850315 / 1228");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "850315 / 1228");
        assert_eq!(spans[0].confidence, 1.0);
    }

    #[test]
    fn test_unseparated_birth_number_needs_label() {
        assert!(detect(&BirthNumberDetector::new(), "kód 8503151228").is_empty());
        let spans = detect(&BirthNumberDetector::new(), "RČ 8503151228");
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_impossible_date_rejected() {
        assert!(detect(&BirthNumberDetector::new(), "číslo 991399/1234").is_empty());
    }

    #[test]
    fn test_id_card_requires_label() {
        assert!(detect(&IdCardDetector::new(), "objednávka 123456789").is_empty());
        let spans = detect(&IdCardDetector::new(), "číslo OP: 123456789");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].category, PiiCategory::IdCard);
    }

    #[test]
    fn test_insurance_number_requires_label_and_full_level() {
        let detector = InsuranceNumberDetector::new();
        assert_eq!(detector.min_level(), AnonymizationLevel::Full);
        assert!(detect(&detector, "faktura 12345678").is_empty());
        let spans = detect(&detector, "IČO: 12345678");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].category, PiiCategory::SocialSecurity);
    }
}
