//! Overlap resolution of candidate spans

use crate::anonymization::models::Span;
use std::cmp::Ordering;

/// Spans sorted by start with no two overlapping
///
/// Only [`ConflictResolver`] can build one, so holding a `ResolvedSpans`
/// guarantees the ordering and non-overlap invariants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSpans(Vec<Span>);

impl ResolvedSpans {
    /// Accepted spans in document order
    pub fn as_slice(&self) -> &[Span] {
        &self.0
    }

    /// Iterate accepted spans in document order
    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.0.iter()
    }

    /// Number of accepted spans
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing was accepted
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take ownership of the spans
    pub fn into_inner(self) -> Vec<Span> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ResolvedSpans {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Longest-match conflict resolver
///
/// Candidates are ordered by start, then longer first, then higher source
/// priority, then category precedence, then confidence. A left-to-right
/// sweep accepts a candidate only if it starts at or after the end of the
/// last accepted span. The result does not depend on candidate order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConflictResolver;

impl ConflictResolver {
    /// Create a resolver
    pub fn new() -> Self {
        Self
    }

    /// Resolve candidates into a non-overlapping ordered set
    pub fn resolve(&self, candidates: Vec<Span>) -> ResolvedSpans {
        self.resolve_with_losses(candidates).0
    }

    /// Resolve candidates, also returning the spans dropped as overlap losses
    pub fn resolve_with_losses(&self, mut candidates: Vec<Span>) -> (ResolvedSpans, Vec<Span>) {
        candidates.sort_by(compare_candidates);

        let mut accepted: Vec<Span> = Vec::with_capacity(candidates.len());
        let mut dropped = Vec::new();
        let mut last_end = 0usize;

        for candidate in candidates {
            if accepted.is_empty() || candidate.start >= last_end {
                last_end = candidate.end;
                accepted.push(candidate);
            } else {
                tracing::trace!(
                    category = %candidate.category,
                    start = candidate.start,
                    end = candidate.end,
                    "Dropped overlapping candidate"
                );
                dropped.push(candidate);
            }
        }

        tracing::debug!(
            accepted = accepted.len(),
            dropped = dropped.len(),
            "Resolved candidate spans"
        );

        (ResolvedSpans(accepted), dropped)
    }
}

fn compare_candidates(a: &Span, b: &Span) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| b.source_priority.cmp(&a.source_priority))
        .then_with(|| a.category.precedence().cmp(&b.category.precedence()))
        .then_with(|| b.confidence.total_cmp(&a.confidence))
}
