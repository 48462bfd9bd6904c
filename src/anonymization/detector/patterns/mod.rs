//! Custom pattern library loaded from TOML
//!
//! ```toml
//! [patterns.contract_number]
//! patterns = ['\bSML-\d{6}\b']
//! category = "SOCIAL_SECURITY"
//! confidence = 0.9
//! level = "standard"
//! ```

use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::models::PiiCategory;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Regex patterns for this entry
    pub patterns: Vec<String>,
    /// Confidence score (0.0 - 1.0)
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    /// Category label, e.g. `BANK` or `PERSON`
    pub category: String,
    /// Lowest level at which the patterns run
    #[serde(default)]
    pub level: AnonymizationLevel,
}

fn default_confidence() -> f32 {
    0.9
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Entry name from the library
    pub name: String,
    /// Compiled regex
    pub regex: Regex,
    /// Category of matches
    pub category: PiiCategory,
    /// Confidence score
    pub confidence: f32,
    /// Lowest active level
    pub level: AnonymizationLevel,
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    #[serde(default)]
    patterns: BTreeMap<String, PatternDefinition>,
}

/// Compiled custom patterns
#[derive(Debug, Default)]
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
}

impl PatternRegistry {
    /// Create a pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut patterns = Vec::new();

        for (name, def) in library.patterns {
            let category: PiiCategory = def.category.parse().map_err(|e: String| {
                anyhow::anyhow!("Invalid category in pattern '{name}': {e}")
            })?;

            if !(0.0..=1.0).contains(&def.confidence) {
                anyhow::bail!(
                    "Invalid confidence in pattern '{name}': {} (expected 0.0 - 1.0)",
                    def.confidence
                );
            }

            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str)
                    .with_context(|| format!("Invalid regex in pattern '{name}': {pattern_str}"))?;

                patterns.push(CompiledPattern {
                    name: name.clone(),
                    regex,
                    category,
                    confidence: def.confidence,
                    level: def.level,
                });
            }
        }

        Ok(Self { patterns })
    }

    /// Get all patterns
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Patterns active at `level`
    pub fn active_at(&self, level: AnonymizationLevel) -> impl Iterator<Item = &CompiledPattern> {
        self.patterns.iter().filter(move |p| p.level <= level)
    }

    /// True when the library defines no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
