//! Vehicle identification number and registration plate detectors

use super::context::is_legal_reference;
use super::PiiDetector;
use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::models::{DetectionMethod, PiiCategory, SourcePriority, Span};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static VIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-HJ-NPR-Z0-9]{17}\b").unwrap());

static PLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d[A-Z][A-Z0-9][ \t]?\d{4}\b").unwrap());

/// 17-character VIN without `I`, `O` or `Q`, mixing letters and digits
#[derive(Debug, Default)]
pub struct VinDetector;

impl VinDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PiiDetector for VinDetector {
    fn name(&self) -> &'static str {
        "vin"
    }

    fn min_level(&self) -> AnonymizationLevel {
        AnonymizationLevel::Full
    }

    fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
        Ok(VIN
            .find_iter(text)
            .filter(|m| {
                let value = m.as_str();
                value.bytes().any(|b| b.is_ascii_digit())
                    && value.bytes().any(|b| b.is_ascii_uppercase())
            })
            .filter(|m| !is_legal_reference(text, m.start(), m.end()))
            .filter_map(|m| {
                Span::from_document(
                    text,
                    PiiCategory::Vin,
                    m.start(),
                    m.end(),
                    SourcePriority::Pattern,
                    DetectionMethod::Regex,
                )
            })
            .collect())
    }
}

/// Czech registration plate such as `1A2 3456` or `5AB 1234`
#[derive(Debug, Default)]
pub struct LicensePlateDetector;

impl LicensePlateDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PiiDetector for LicensePlateDetector {
    fn name(&self) -> &'static str {
        "license_plate"
    }

    fn min_level(&self) -> AnonymizationLevel {
        AnonymizationLevel::Full
    }

    fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
        Ok(PLATE
            .find_iter(text)
            .filter(|m| !is_legal_reference(text, m.start(), m.end()))
            .filter_map(|m| {
                Span::from_document(
                    text,
                    PiiCategory::LicensePlate,
                    m.start(),
                    m.end(),
                    SourcePriority::Pattern,
                    DetectionMethod::Regex,
                )
                .map(|span| span.with_confidence(0.8))
            })
            .collect())
    }
}
