//! Czech bank account and IBAN detectors

use super::context::{has_label_before, is_legal_reference, BANK_LABEL};
use super::PiiDetector;
use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::models::{DetectionMethod, PiiCategory, SourcePriority, Span};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static ACCOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:(\d{1,6})-)?(\d{2,10})/(\d{4})\b").unwrap());

static IBAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bCZ\d{2}(?:[ ]?\d{4}){5}\b").unwrap());

const PREFIX_WEIGHTS: [u32; 6] = [10, 5, 8, 4, 2, 1];
const NUMBER_WEIGHTS: [u32; 10] = [6, 3, 7, 9, 10, 5, 8, 4, 2, 1];

/// Domestic account number `prefix-number/bankcode`
///
/// Accepted when both parts pass the weighted mod-11 check, or when a
/// banking label precedes the match. Legal citations such as `89/2012 Sb.`
/// are never accepted.
#[derive(Debug, Default)]
pub struct BankAccountDetector;

impl BankAccountDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PiiDetector for BankAccountDetector {
    fn name(&self) -> &'static str {
        "bank_account"
    }

    fn min_level(&self) -> AnonymizationLevel {
        AnonymizationLevel::Standard
    }

    fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
        let mut spans = Vec::new();

        for caps in ACCOUNT.captures_iter(text) {
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            if is_legal_reference(text, whole.start(), whole.end()) {
                continue;
            }

            let prefix = caps.get(1).map_or("", |m| m.as_str());
            let checksum_ok = account_checksum_ok(prefix, number.as_str());
            let labelled = has_label_before(&BANK_LABEL, text, whole.start());
            if !checksum_ok && !labelled {
                continue;
            }

            let confidence = if checksum_ok { 1.0 } else { 0.8 };
            spans.extend(
                Span::from_document(
                    text,
                    PiiCategory::Bank,
                    whole.start(),
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

/// Weighted mod-11 check of a domestic account number
pub fn account_checksum_ok(prefix: &str, number: &str) -> bool {
    weighted_mod11(prefix, &PREFIX_WEIGHTS) && weighted_mod11(number, &NUMBER_WEIGHTS)
        && number.bytes().any(|b| b != b'0')
}

fn weighted_mod11(digits: &str, weights: &[u32]) -> bool {
    if digits.len() > weights.len() {
        return false;
    }
    let offset = weights.len() - digits.len();
    let sum: u32 = digits
        .chars()
        .zip(&weights[offset..])
        .map(|(c, w)| c.to_digit(10).unwrap_or(0) * w)
        .sum();
    sum % 11 == 0
}

/// Czech IBAN `CZkk` followed by twenty digits, optionally grouped by four
#[derive(Debug, Default)]
pub struct IbanDetector;

impl IbanDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PiiDetector for IbanDetector {
    fn name(&self) -> &'static str {
        "iban"
    }

    fn min_level(&self) -> AnonymizationLevel {
        AnonymizationLevel::Standard
    }

    fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
        Ok(IBAN
            .find_iter(text)
            .filter(|m| iban_checksum_ok(m.as_str()) || has_label_before(&BANK_LABEL, text, m.start()))
            .filter_map(|m| {
                Span::from_document(
                    text,
                    PiiCategory::Bank,
                    m.start(),
                    m.end(),
                    SourcePriority::Pattern,
                    DetectionMethod::Regex,
                )
            })
            .collect())
    }
}

/// ISO 13616 mod-97 check
pub fn iban_checksum_ok(iban: &str) -> bool {
    let compact: String = iban.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() < 5 {
        return false;
    }
    let (head, tail) = compact.split_at(4);
    let mut remainder: u64 = 0;
    for c in tail.chars().chain(head.chars()) {
        let Some(value) = c.to_digit(36) else {
            return false;
        };
        remainder = if value >= 10 {
            (remainder * 100 + u64::from(value)) % 97
        } else {
            (remainder * 10 + u64::from(value)) % 97
        };
    }
    remainder == 1
}
