//! Placeholder substitution

use crate::anonymization::registry::MappingRegistry;
use crate::anonymization::resolver::ResolvedSpans;

/// Rewrites a document by replacing each resolved span with its placeholder
#[derive(Debug, Default, Clone, Copy)]
pub struct SubstitutionEngine;

impl SubstitutionEngine {
    /// Create a substitution engine
    pub fn new() -> Self {
        Self
    }

    /// Single left-to-right pass over `spans`, registering each span's text
    /// and splicing in the returned placeholder
    ///
    /// Spans that no longer match `document` are skipped with a warning and
    /// their text is left untouched.
    pub fn apply(
        &self,
        document: &str,
        spans: &ResolvedSpans,
        registry: &mut MappingRegistry,
    ) -> String {
        let mut output = String::with_capacity(document.len());
        let mut cursor = 0usize;

        for span in spans {
            let slice = match document.get(span.start..span.end) {
                Some(slice) if span.start >= cursor && slice == span.text => slice,
                _ => {
                    tracing::warn!(
                        category = %span.category,
                        start = span.start,
                        end = span.end,
                        "Skipping span that does not match the document"
                    );
                    continue;
                }
            };

            output.push_str(&document[cursor..span.start]);
            let placeholder = registry.register(span.category, slice);
            output.push_str(&placeholder.to_string());
            cursor = span.end;
        }

        output.push_str(&document[cursor..]);
        output
    }
}
