//! Per-document anonymization result

use super::span::{PiiCategory, Span};
use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::registry::MappingExport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Result of one document run
#[derive(Debug, Clone, Serialize)]
pub struct AnonymizedDocument {
    /// Caller-supplied document identifier (usually the input path)
    pub document_id: String,
    /// Unique id of this run
    pub run_id: Uuid,
    /// Output text; equal to the input in dry-run mode
    pub anonymized_text: String,
    /// Accepted spans in document order
    pub spans: Vec<Span>,
    /// Placeholder mapping accumulated during substitution
    pub mapping: MappingExport,
    /// Level the document was processed at
    pub level: AnonymizationLevel,
    /// Whether substitution was skipped
    pub dry_run: bool,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Timestamp of anonymization
    pub timestamp: DateTime<Utc>,
    /// Recoverable problems met during the run
    pub warnings: Vec<String>,
    /// Accepted span count per category
    pub stats_by_category: BTreeMap<PiiCategory, usize>,
}

impl AnonymizedDocument {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        document_id: String,
        anonymized_text: String,
        spans: Vec<Span>,
        mapping: MappingExport,
        level: AnonymizationLevel,
        dry_run: bool,
        processing_time_ms: u64,
        warnings: Vec<String>,
    ) -> Self {
        let mut stats_by_category = BTreeMap::new();
        for span in &spans {
            *stats_by_category.entry(span.category).or_insert(0) += 1;
        }

        Self {
            document_id,
            run_id: Uuid::new_v4(),
            anonymized_text,
            spans,
            mapping,
            level,
            dry_run,
            processing_time_ms,
            timestamp: Utc::now(),
            warnings,
            stats_by_category,
        }
    }

    /// Number of accepted spans
    pub fn total_detections(&self) -> usize {
        self.spans.len()
    }

    /// Check if any personal data was detected
    pub fn has_detections(&self) -> bool {
        !self.spans.is_empty()
    }
}
