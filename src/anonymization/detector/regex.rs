//! Detector running the custom pattern library

use super::{context::is_legal_reference, patterns::PatternRegistry, PiiDetector};
use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::models::{DetectionMethod, SourcePriority, Span};
use anyhow::Result;
use std::sync::Arc;

/// Regex detector over a [`PatternRegistry`]
///
/// Matches carry pattern priority, so a custom pattern competes with the
/// built-in identifier detectors on equal terms. Patterns of a numeric
/// identifier category skip matches inside legal citations, like the
/// built-in ones.
pub struct RegexDetector {
    pattern_registry: Arc<PatternRegistry>,
}

impl RegexDetector {
    /// Create a detector over a compiled pattern registry
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            pattern_registry: Arc::new(registry),
        }
    }
}

impl PiiDetector for RegexDetector {
    fn name(&self) -> &'static str {
        "custom_patterns"
    }

    fn detect(&self, text: &str, level: AnonymizationLevel) -> Result<Vec<Span>> {
        let mut spans = Vec::new();

        for pattern in self.pattern_registry.active_at(level) {
            let before = spans.len();
            for matched in pattern.regex.find_iter(text) {
                if pattern.category.is_numeric_identifier()
                    && is_legal_reference(text, matched.start(), matched.end())
                {
                    continue;
                }
                if let Some(span) = Span::from_document(
                    text,
                    pattern.category,
                    matched.start(),
                    matched.end(),
                    SourcePriority::Pattern,
                    DetectionMethod::Regex,
                ) {
                    spans.push(span.with_confidence(pattern.confidence));
                }
            }
            tracing::trace!(
                pattern = %pattern.name,
                category = %pattern.category,
                matches = spans.len() - before,
                "Custom pattern evaluated"
            );
        }

        Ok(spans)
    }
}
