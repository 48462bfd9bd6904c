//! Dry-run reporting for anonymization
//!
//! Collects detection statistics, a handful of before/after samples and the
//! warnings of every processed document, printable to the console or as JSON.

use crate::anonymization::models::{AnonymizedDocument, PiiCategory, Span};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Samples kept across the whole report
const MAX_SAMPLES: usize = 20;
/// Samples taken from one document
const SAMPLES_PER_DOCUMENT: usize = 3;
/// Characters of an original value shown in a sample
const SAMPLE_CHARS: usize = 50;

/// Dry-run report with detection statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DryRunReport {
    /// Documents analyzed
    pub total_documents: usize,

    /// Accepted spans over all documents
    pub total_detections: usize,

    /// Accepted spans by category
    pub detections_by_category: BTreeMap<PiiCategory, usize>,

    /// Before/after examples
    pub samples: Vec<DetectionSample>,

    /// Recoverable problems met while processing
    pub warnings: Vec<String>,

    /// Processing statistics
    pub stats: ProcessingStats,
}

/// One detected value and the placeholder it would receive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSample {
    /// Document the value was found in
    pub document_id: String,

    /// Byte offset of the value
    pub start: usize,

    /// Category
    pub category: PiiCategory,

    /// Original value, truncated
    pub original: String,

    /// Placeholder token
    pub placeholder: String,

    /// Confidence score (0.0-1.0)
    pub confidence: f64,
}

/// Processing statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Average processing time per document (ms)
    pub avg_processing_time_ms: u64,

    /// Total processing time (ms)
    pub total_processing_time_ms: u64,

    /// Documents with at least one detection
    pub documents_with_pii: usize,

    /// Documents without detections
    pub documents_without_pii: usize,
}

impl DryRunReport {
    /// Create a new empty dry-run report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add results from a processed document
    pub fn add_document(&mut self, document: &AnonymizedDocument, processing_time_ms: u64) {
        self.total_documents += 1;
        self.stats.total_processing_time_ms += processing_time_ms;

        if document.has_detections() {
            self.stats.documents_with_pii += 1;
            self.total_detections += document.total_detections();

            for (category, count) in &document.stats_by_category {
                *self.detections_by_category.entry(*category).or_insert(0) += count;
            }

            for span in document.spans.iter().take(SAMPLES_PER_DOCUMENT) {
                self.add_sample(document, span);
            }
        } else {
            self.stats.documents_without_pii += 1;
        }

        for warning in &document.warnings {
            self.add_warning(format!("{}: {warning}", document.document_id));
        }

        self.stats.avg_processing_time_ms =
            self.stats.total_processing_time_ms / self.total_documents as u64;
    }

    fn add_sample(&mut self, document: &AnonymizedDocument, span: &Span) {
        if self.samples.len() >= MAX_SAMPLES {
            return;
        }

        let original = span.text.trim();
        let placeholder = document
            .mapping
            .replacements
            .iter()
            .find(|(p, originals)| {
                p.category() == span.category && originals.iter().any(|o| o == original)
            })
            .map(|(p, _)| p.to_string())
            .unwrap_or_else(|| format!("[[{}]]", span.category.label()));

        self.samples.push(DetectionSample {
            document_id: document.document_id.clone(),
            start: span.start,
            category: span.category,
            original: truncate(original, SAMPLE_CHARS),
            placeholder,
            confidence: f64::from(span.confidence),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                 ANONYMIZATION DRY-RUN REPORT                  \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("📊 SUMMARY\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "  Total Documents Analyzed:    {}\n",
            self.total_documents
        ));
        output.push_str(&format!(
            "  Documents with PII:          {}\n",
            self.stats.documents_with_pii
        ));
        output.push_str(&format!(
            "  Documents without PII:       {}\n",
            self.stats.documents_without_pii
        ));
        output.push_str(&format!(
            "  Total Detections:            {}\n",
            self.total_detections
        ));
        output.push_str(&format!(
            "  Avg Processing Time:         {} ms\n",
            self.stats.avg_processing_time_ms
        ));
        output.push('\n');

        if !self.detections_by_category.is_empty() {
            output.push_str("🔍 DETECTIONS BY CATEGORY\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");

            let mut categories: Vec<_> = self.detections_by_category.iter().collect();
            categories.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

            for (category, count) in categories {
                output.push_str(&format!("  {:30} {:>5}\n", category.label(), count));
            }
            output.push('\n');
        }

        if !self.samples.is_empty() {
            output.push_str("📝 SAMPLE DETECTIONS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");

            for (i, sample) in self.samples.iter().take(10).enumerate() {
                output.push_str(&format!("\n  Sample #{}\n", i + 1));
                output.push_str(&format!("    Document:    {}\n", sample.document_id));
                output.push_str(&format!("    Category:    {}\n", sample.category));
                output.push_str(&format!("    Offset:      {}\n", sample.start));
                output.push_str(&format!(
                    "    Confidence:  {:.2}%\n",
                    sample.confidence * 100.0
                ));
                output.push_str(&format!("    Original:    \"{}\"\n", sample.original));
                output.push_str(&format!("    Placeholder: {}\n", sample.placeholder));
            }
            output.push('\n');
        }

        if !self.warnings.is_empty() {
            output.push_str("⚠️  WARNINGS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for warning in &self.warnings {
                output.push_str(&format!("  • {warning}\n"));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write report to file
    pub fn write_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = self.format_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Shorten `value` to at most `max` characters, marking the cut with `...`
fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
