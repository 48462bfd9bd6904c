//! Person name detector backed by the lexicon

use super::context::has_person_context;
use super::PiiDetector;
use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::lexicon::Lexicon;
use crate::anonymization::models::{DetectionMethod, PiiCategory, SourcePriority, Span};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static CAPITALIZED_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\p{Lu}\p{Ll}+(?:-\p{Lu}\p{Ll}+)?\b").unwrap());

/// Longest run of first names accepted before a surname
const MAX_FIRST_NAMES: usize = 2;

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

/// Capitalized-token name detector
///
/// * a first name followed by a surname-like token forms one group span
///   (`Jan Novák`, `Jan Pavel Novák`, `Evy Novákové`)
/// * a lone lexicon first name or known surname is a single-token span
/// * at `full`, a token that only carries a surname suffix counts when it
///   follows a title, salutation or role word (`Ing. Horáček`)
pub struct NameDetector {
    lexicon: Arc<Lexicon>,
}

impl NameDetector {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    fn tokens<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        CAPITALIZED_TOKEN
            .find_iter(text)
            .map(|m| Token {
                start: m.start(),
                end: m.end(),
                text: m.as_str(),
            })
            .filter(|t| !self.lexicon.is_stop_word(t.text))
            .collect()
    }

    /// Number of tokens from `i` forming a first-names-then-surname group
    fn group_len(&self, text: &str, tokens: &[Token<'_>], i: usize) -> Option<usize> {
        if !self.lexicon.is_first_name(tokens[i].text) {
            return None;
        }
        let mut j = i;
        let mut first_names = 1;
        while j + 1 < tokens.len() && adjacent(text, &tokens[j], &tokens[j + 1]) {
            let next = tokens[j + 1].text;
            if self.lexicon.is_surname_like(next) {
                return Some(j + 2 - i);
            }
            if first_names < MAX_FIRST_NAMES && self.lexicon.is_first_name(next) {
                first_names += 1;
                j += 1;
                continue;
            }
            break;
        }
        None
    }
}

/// Two tokens separated only by spaces or tabs
fn adjacent(text: &str, left: &Token<'_>, right: &Token<'_>) -> bool {
    text.get(left.end..right.start)
        .is_some_and(|gap| !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t'))
}

impl PiiDetector for NameDetector {
    fn name(&self) -> &'static str {
        "names"
    }

    fn detect(&self, text: &str, level: AnonymizationLevel) -> Result<Vec<Span>> {
        let tokens = self.tokens(text);
        let mut spans = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];

            if let Some(len) = self.group_len(text, &tokens, i) {
                let last = tokens[i + len - 1];
                spans.extend(Span::from_document(
                    text,
                    PiiCategory::Person,
                    token.start,
                    last.end,
                    SourcePriority::NameGroup,
                    DetectionMethod::Lexicon,
                ));
                i += len;
                continue;
            }

            let single = if self.lexicon.is_first_name(token.text)
                || self.lexicon.is_known_surname(token.text)
            {
                Some((SourcePriority::NameSingle, DetectionMethod::Lexicon, 0.8))
            } else if level >= AnonymizationLevel::Full
                && self.lexicon.has_surname_suffix(token.text)
                && has_person_context(text, token.start)
            {
                Some((SourcePriority::Heuristic, DetectionMethod::Heuristic, 0.6))
            } else {
                None
            };

            if let Some((priority, method, confidence)) = single {
                spans.extend(
                    Span::from_document(
                        text,
                        PiiCategory::Person,
                        token.start,
                        token.end,
                        priority,
                        method,
                    )
                    .map(|span| span.with_confidence(confidence)),
                );
            }
            i += 1;
        }

        Ok(spans)
    }
}
