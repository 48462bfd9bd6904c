//! Placeholder tokens

use super::span::PiiCategory;
use serde::{Serialize, Serializer};
use std::fmt;

/// Stable replacement token `[[CATEGORY_N]]`
///
/// `N` is a 1-based counter scoped to the category. The textual form is a
/// fixed contract other tooling parses, so it never contains whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder {
    category: PiiCategory,
    index: u32,
}

impl Placeholder {
    /// Create a placeholder; `index` must be positive
    pub(crate) fn new(category: PiiCategory, index: u32) -> Self {
        debug_assert!(index > 0, "placeholder indices are 1-based");
        Self { category, index }
    }

    /// Category of the placeholder
    pub fn category(&self) -> PiiCategory {
        self.category
    }

    /// 1-based index within the category
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Parse a token such as `[[BIRTH_ID_3]]`
    pub fn parse(token: &str) -> Option<Self> {
        let inner = token.strip_prefix("[[")?.strip_suffix("]]")?;
        let (label, number) = inner.rsplit_once('_')?;
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index: u32 = number.parse().ok()?;
        if index == 0 {
            return None;
        }
        let category = PiiCategory::ALL
            .into_iter()
            .find(|c| c.label() == label)?;
        Some(Self { category, index })
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[[{}_{}]]", self.category.label(), self.index)
    }
}

impl Serialize for Placeholder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
