//! Placeholder numbering and value history for one document run

use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::models::{PiiCategory, Placeholder};
use crate::anonymization::text::normalize_value;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Run-scoped mapping from placeholders to the original values they replace
///
/// Numbering is a function of registration order only: the first distinct
/// `(category, normalized value)` pair of a category gets index 1, the next
/// index 2, and a pair seen again reuses its placeholder.
#[derive(Debug, Default)]
pub struct MappingRegistry {
    counters: HashMap<PiiCategory, u32>,
    by_value: HashMap<(PiiCategory, String), Placeholder>,
    entries: Vec<(Placeholder, Vec<String>)>,
    index: HashMap<Placeholder, usize>,
}

impl MappingRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the placeholder for `exact_text`, issuing a new one the first
    /// time its normalized form is seen in `category`
    pub fn register(&mut self, category: PiiCategory, exact_text: &str) -> Placeholder {
        let key = (category, normalize_value(exact_text));
        let original = exact_text.trim();

        if let Some(&placeholder) = self.by_value.get(&key) {
            if let Some(&slot) = self.index.get(&placeholder) {
                let originals = &mut self.entries[slot].1;
                if !originals.iter().any(|o| o == original) {
                    originals.push(original.to_string());
                }
            }
            return placeholder;
        }

        let counter = self.counters.entry(category).or_insert(0);
        *counter += 1;
        let placeholder = Placeholder::new(category, *counter);

        tracing::trace!(%placeholder, original, "Issued placeholder");

        self.by_value.insert(key, placeholder);
        self.index.insert(placeholder, self.entries.len());
        self.entries.push((placeholder, vec![original.to_string()]));
        placeholder
    }

    /// Placeholder previously issued for a value, if any
    pub fn lookup(&self, category: PiiCategory, text: &str) -> Option<Placeholder> {
        self.by_value
            .get(&(category, normalize_value(text)))
            .copied()
    }

    /// Distinct exact originals replaced by a placeholder, in first-seen order
    pub fn originals(&self, placeholder: &Placeholder) -> Option<&[String]> {
        self.index
            .get(placeholder)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Count of distinct placeholders issued per category
    pub fn stats(&self) -> BTreeMap<PiiCategory, usize> {
        let mut stats = BTreeMap::new();
        for (placeholder, _) in &self.entries {
            *stats.entry(placeholder.category()).or_insert(0) += 1;
        }
        stats
    }

    /// Total number of placeholders issued
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot the registry for serialization
    pub fn export(&self, level: Option<AnonymizationLevel>) -> MappingExport {
        let counts = self.stats();
        MappingExport {
            replacements: Replacements(self.entries.clone()),
            metadata: MappingMetadata {
                created_at: Utc::now(),
                level,
                total: self.entries.len(),
                total_originals: self.entries.iter().map(|(_, o)| o.len()).sum(),
                counts,
            },
        }
    }
}

/// Serializable snapshot of a registry
#[derive(Debug, Clone, Serialize)]
pub struct MappingExport {
    /// Run metadata and statistics
    pub metadata: MappingMetadata,
    /// Placeholder to originals, in registration order
    pub replacements: Replacements,
}

impl MappingExport {
    /// Originals recorded for a placeholder token such as `[[PERSON_1]]`
    pub fn originals_for(&self, token: &str) -> Option<&[String]> {
        let placeholder = Placeholder::parse(token)?;
        self.replacements
            .iter()
            .find(|(p, _)| **p == placeholder)
            .map(|(_, originals)| originals.as_slice())
    }

    /// Placeholder issued for the exact original `value` of `category`
    pub fn placeholder_for(&self, category: PiiCategory, value: &str) -> Option<Placeholder> {
        self.replacements
            .iter()
            .find(|(p, originals)| p.category() == category && originals.iter().any(|o| o == value))
            .map(|(p, _)| *p)
    }
}

/// Metadata block of a mapping export
#[derive(Debug, Clone, Serialize)]
pub struct MappingMetadata {
    /// Export time
    pub created_at: DateTime<Utc>,
    /// Level the document was processed at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<AnonymizationLevel>,
    /// Distinct placeholders per category
    pub counts: BTreeMap<PiiCategory, usize>,
    /// Distinct placeholders overall
    pub total: usize,
    /// Distinct exact originals overall
    pub total_originals: usize,
}

/// Ordered placeholder to originals list, serialized as a JSON object
#[derive(Debug, Clone, Default)]
pub struct Replacements(Vec<(Placeholder, Vec<String>)>);

impl Replacements {
    /// Iterate entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&Placeholder, &Vec<String>)> {
        self.0.iter().map(|(p, o)| (p, o))
    }

    /// Number of placeholders
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no placeholder was issued
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Replacements {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (placeholder, originals) in &self.0 {
            map.serialize_entry(&placeholder.to_string(), originals)?;
        }
        map.end()
    }
}
