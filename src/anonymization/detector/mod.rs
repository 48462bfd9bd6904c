//! PII detection module
//!
//! Every detector implements [`PiiDetector`] and works on the document text
//! alone; none depends on another's output. [`DetectorSet`] hands detectors a
//! [`ScanText`] view with non-breaking spaces flattened and invisible format
//! characters removed, maps their spans back onto the document, drops
//! malformed candidates and turns detector errors into warnings.

pub mod contact;
pub mod context;
pub mod date;
pub mod financial;
pub mod identity;
pub mod names;
pub mod patterns;
pub mod regex;
pub mod vehicle;

use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::lexicon::Lexicon;
use crate::anonymization::models::Span;
use crate::anonymization::text::ScanText;
use anyhow::Result;
use std::sync::Arc;

/// Trait for PII detection implementations
pub trait PiiDetector: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Lowest level at which the detector runs
    fn min_level(&self) -> AnonymizationLevel {
        AnonymizationLevel::Minimal
    }

    /// Produce candidate spans for `text`
    fn detect(&self, text: &str, level: AnonymizationLevel) -> Result<Vec<Span>>;
}

/// Candidates from one detection pass plus the problems met on the way
#[derive(Debug, Default)]
pub struct DetectionOutcome {
    /// Well-formed candidate spans, unordered
    pub candidates: Vec<Span>,
    /// Recoverable detector failures
    pub warnings: Vec<String>,
}

/// Registered collection of detectors
#[derive(Default)]
pub struct DetectorSet {
    detectors: Vec<Box<dyn PiiDetector>>,
}

impl DetectorSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in Czech detectors; the name detector is added only when a
    /// lexicon is available
    pub fn standard(lexicon: Option<Arc<Lexicon>>) -> Self {
        let mut set = Self::new();
        set.register(identity::BirthNumberDetector::new());
        set.register(identity::IdCardDetector::new());
        set.register(identity::InsuranceNumberDetector::new());
        set.register(financial::BankAccountDetector::new());
        set.register(financial::IbanDetector::new());
        set.register(contact::PhoneDetector::new());
        set.register(contact::EmailDetector::new());
        set.register(match &lexicon {
            Some(lexicon) => contact::AddressDetector::with_lexicon(Arc::clone(lexicon)),
            None => contact::AddressDetector::new(),
        });
        set.register(date::DateDetector::new());
        set.register(vehicle::VinDetector::new());
        set.register(vehicle::LicensePlateDetector::new());
        if let Some(lexicon) = lexicon {
            set.register(names::NameDetector::new(lexicon));
        }
        set
    }

    /// Add a detector
    pub fn register<D: PiiDetector + 'static>(&mut self, detector: D) {
        self.detectors.push(Box::new(detector));
    }

    /// Names of the registered detectors
    pub fn names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Number of registered detectors
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// True when no detector is registered
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Run every detector active at `level`
    ///
    /// A failing detector is logged and skipped. Candidates outside the
    /// document or not matching its text are dropped as detector bugs.
    pub fn detect_all(&self, text: &str, level: AnonymizationLevel) -> DetectionOutcome {
        let mut outcome = DetectionOutcome::default();
        let scan = ScanText::new(text);
        if !scan.is_verbatim() {
            tracing::debug!(
                document_len = text.len(),
                scanned_len = scan.as_str().len(),
                "Flattened non-breaking spaces and invisible characters for detection"
            );
        }

        for detector in self.detectors.iter().filter(|d| d.min_level() <= level) {
            match detector.detect(scan.as_str(), level) {
                Ok(spans) => {
                    let found = spans.len();
                    for span in spans {
                        match to_document(&scan, text, span) {
                            Ok(span) => outcome.candidates.push(span),
                            Err(span) => tracing::warn!(
                                detector = detector.name(),
                                start = span.start,
                                end = span.end,
                                document_len = text.len(),
                                "Dropping malformed candidate span (detector bug)"
                            ),
                        }
                    }
                    tracing::debug!(detector = detector.name(), spans = found, "Detector finished");
                }
                Err(e) => {
                    crate::log_detector_failure!(detector.name(), e);
                    outcome
                        .warnings
                        .push(format!("Detector '{}' failed: {e}", detector.name()));
                }
            }
        }

        outcome
    }
}

/// Re-anchor a span found in the scanned text onto the document; the
/// unchanged span comes back as the error when it does not fit
fn to_document(
    scan: &ScanText<'_>,
    document: &str,
    mut span: Span,
) -> std::result::Result<Span, Span> {
    if !span.is_well_formed(scan.as_str()) {
        return Err(span);
    }
    if scan.is_verbatim() {
        return Ok(span);
    }
    match scan
        .document_range(span.start, span.end)
        .and_then(|(start, end)| document.get(start..end).map(|t| (start, end, t)))
    {
        Some((start, end, original)) => {
            span.start = start;
            span.end = end;
            span.text = original.to_string();
            Ok(span)
        }
        None => Err(span),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::{DetectionMethod, PiiCategory, SourcePriority};
    use test_case::test_case;

    struct FailingDetector;

    impl PiiDetector for FailingDetector {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn detect(&self, _text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
            anyhow::bail!("boom")
        }
    }

    struct SloppyDetector;

    impl PiiDetector for SloppyDetector {
        fn name(&self) -> &'static str {
            "sloppy"
        }

        fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
            Ok(vec![
                Span::new(PiiCategory::Email, "x", 5, 3, SourcePriority::Pattern, DetectionMethod::Regex),
                Span::new(
                    PiiCategory::Email,
                    "far",
                    text.len(),
                    text.len() + 3,
                    SourcePriority::Pattern,
                    DetectionMethod::Regex,
                ),
                Span::new(PiiCategory::Email, &text[0..2], 0, 2, SourcePriority::Pattern, DetectionMethod::Regex),
            ])
        }
    }

    #[test]
    fn test_failing_detector_becomes_warning() {
        let mut set = DetectorSet::standard(None);
        set.register(FailingDetector);
        let outcome = set.detect_all("Volejte 777 123 456", AnonymizationLevel::Standard);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("failing"));
        assert!(outcome.candidates.iter().any(|s| s.category == PiiCategory::Phone));
    }

    #[test]
    fn test_malformed_candidates_dropped() {
        let mut set = DetectorSet::new();
        set.register(SloppyDetector);
        let outcome = set.detect_all("abcdef", AnonymizationLevel::Full);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].text, "ab");
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_level_gating_skips_detectors() {
        let set = DetectorSet::standard(None);
        let text = "kontakt jan@example.cz";
        assert!(set
            .detect_all(text, AnonymizationLevel::Minimal)
            .candidates
            .is_empty());
        assert_eq!(
            set.detect_all(text, AnonymizationLevel::Standard).candidates.len(),
            1
        );
    }

    fn standard_set() -> DetectorSet {
        DetectorSet::standard(Some(Arc::new(Lexicon::embedded().unwrap())))
    }

    fn found(outcome: &DetectionOutcome, category: PiiCategory) -> Vec<&str> {
        outcome
            .candidates
            .iter()
            .filter(|s| s.category == category)
            .map(|s| s.text.as_str())
            .collect()
    }

    #[test_case("tel. 777\u{a0}123\u{a0}456", PiiCategory::Phone, "777\u{a0}123\u{a0}456" ; "phone with nbsp")]
    #[test_case("tel. +420\u{202f}777\u{202f}123\u{202f}456", PiiCategory::Phone, "+420\u{202f}777\u{202f}123\u{202f}456" ; "phone with narrow nbsp")]
    #[test_case("Rodné číslo: 850315\u{a0}/\u{a0}1234", PiiCategory::BirthId, "850315\u{a0}/\u{a0}1234" ; "birth number with nbsp")]
    #[test_case("rodné číslo 8503\u{200b}151234", PiiCategory::BirthId, "8503\u{200b}151234" ; "birth number with zero width space")]
    #[test_case("narozen 15.\u{a0}3.\u{a0}1985", PiiCategory::Date, "15.\u{a0}3.\u{a0}1985" ; "date with nbsp")]
    #[test_case("číslo OP AB\u{a0}123456", PiiCategory::IdCard, "AB\u{a0}123456" ; "id card with nbsp")]
    #[test_case("IBAN CZ65\u{a0}0800\u{a0}0000\u{a0}1920\u{a0}0014\u{a0}5399", PiiCategory::Bank, "CZ65\u{a0}0800\u{a0}0000\u{a0}1920\u{a0}0014\u{a0}5399" ; "iban with nbsp")]
    #[test_case("SPZ 1AB\u{a0}2345", PiiCategory::LicensePlate, "1AB\u{a0}2345" ; "plate with nbsp")]
    #[test_case("Nájemce Jan\u{a0}Novák souhlasí", PiiCategory::Person, "Jan\u{a0}Novák" ; "name with nbsp")]
    #[test_case("Nájemce Jan No\u{ad}vák souhlasí", PiiCategory::Person, "Jan No\u{ad}vák" ; "name with soft hyphen")]
    fn test_fixed_spaces_and_invisibles_do_not_hide_values(
        text: &str,
        category: PiiCategory,
        expected: &str,
    ) {
        let outcome = standard_set().detect_all(text, AnonymizationLevel::Full);
        assert!(
            found(&outcome, category).contains(&expected),
            "{category:?} in {text:?}: {:?}",
            outcome.candidates
        );
        assert!(outcome.candidates.iter().all(|s| s.is_well_formed(text)));
    }

    #[test]
    fn test_spans_reanchored_after_removed_characters() {
        let text = "\u{feff}Jan\u{a0}Novák, tel. 777 123 456";
        let outcome = standard_set().detect_all(text, AnonymizationLevel::Standard);
        let phone = outcome
            .candidates
            .iter()
            .find(|s| s.category == PiiCategory::Phone)
            .unwrap();
        assert_eq!(&text[phone.start..phone.end], "777 123 456");
        assert_eq!(phone.end, text.len());
    }

    #[test]
    fn test_name_detector_needs_lexicon() {
        assert!(!DetectorSet::standard(None).names().contains(&"names"));
        let lexicon = Arc::new(Lexicon::embedded().unwrap());
        assert!(DetectorSet::standard(Some(lexicon)).names().contains(&"names"));
    }
}
