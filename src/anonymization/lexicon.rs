//! Lexicon of Czech first names, surnames and surname morphology
//!
//! The lexicon is loaded once, wrapped in an `Arc` and shared read-only by
//! every detection run. A default Czech lexicon is embedded in the binary;
//! an external TOML file with the same shape can replace it.

use crate::anonymization::text::normalize_value;
use crate::domain::{AnonymizerError, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Source of the default Czech lexicon
pub const EMBEDDED_LEXICON: &str = include_str!("../../data/lexicon_cs.toml");

/// Case endings stripped when looking for the nominative of a first name
const FIRST_NAME_ENDINGS: &[&str] = &["ovi", "ou", "em", "ě", "y", "e", "i", "u", "a"];

/// Case endings stripped when looking for the nominative of a surname
const SURNAME_ENDINGS: &[&str] = &[
    "ovou", "ové", "ovi", "ých", "ým", "em", "ou", "ě", "y", "e", "i", "u", "a",
];

/// Kind of name set requested from the lexicon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// Male and female first names
    FirstName,
    /// Surnames
    Surname,
}

#[derive(Debug, Default, Deserialize)]
struct FirstNames {
    #[serde(default)]
    male: Vec<String>,
    #[serde(default)]
    female: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    first_names: FirstNames,
    #[serde(default)]
    surnames: Vec<String>,
    #[serde(default)]
    surname_suffixes: Vec<String>,
    #[serde(default)]
    stop_words: Vec<String>,
}

/// Immutable name lexicon
#[derive(Debug, Clone)]
pub struct Lexicon {
    first_names: HashSet<String>,
    surnames: HashSet<String>,
    surname_suffixes: BTreeSet<String>,
    stop_words: HashSet<String>,
}

impl Lexicon {
    /// Load a lexicon from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnonymizerError::Lexicon(format!("Failed to read lexicon {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parse a lexicon from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: LexiconFile = toml::from_str(content)
            .map_err(|e| AnonymizerError::Lexicon(format!("Invalid lexicon TOML: {e}")))?;

        let normalize_all = |words: Vec<String>| {
            words
                .into_iter()
                .map(|w| normalize_value(&w))
                .filter(|w| !w.is_empty())
        };

        let first_names: HashSet<String> = normalize_all(file.first_names.male)
            .chain(normalize_all(file.first_names.female))
            .collect();
        let surnames: HashSet<String> = normalize_all(file.surnames).collect();

        if first_names.is_empty() && surnames.is_empty() {
            return Err(AnonymizerError::Lexicon(
                "Lexicon contains no first names or surnames".to_string(),
            ));
        }

        Ok(Self {
            first_names,
            surnames,
            surname_suffixes: normalize_all(file.surname_suffixes).collect(),
            stop_words: normalize_all(file.stop_words).collect(),
        })
    }

    /// The default Czech lexicon compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml(EMBEDDED_LEXICON)
    }

    /// Known names of the given kind, lowercased with diacritics kept
    pub fn names_of_kind(&self, kind: NameKind) -> &HashSet<String> {
        match kind {
            NameKind::FirstName => &self.first_names,
            NameKind::Surname => &self.surnames,
        }
    }

    /// Morphological endings typical of Czech surnames
    pub fn surname_suffixes(&self) -> &BTreeSet<String> {
        &self.surname_suffixes
    }

    /// Capitalized common words that must never be read as names
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(&normalize_value(token))
    }

    /// Lexicon first name, directly or in a declined form
    ///
    /// `Petrovi` resolves to `petr`, `Evy` to `eva`, `Pavla` to `pavel`.
    pub fn is_first_name(&self, token: &str) -> bool {
        let word = normalize_value(token);
        if self.first_names.contains(&word) {
            return true;
        }

        // Radka -> Radek, Pavla -> Pavel
        for (ending, base) in [("ka", "ek"), ("la", "el"), ("ce", "ec")] {
            if let Some(stem) = word.strip_suffix(ending) {
                if !stem.is_empty() && self.first_names.contains(&format!("{stem}{base}")) {
                    return true;
                }
            }
        }

        let found = declined_bases(&word, FIRST_NAME_ENDINGS).any(|stem| {
            self.first_names.contains(&stem) || self.first_names.contains(&format!("{stem}a"))
        });
        found
    }

    /// Lexicon surname, directly or in a declined form
    ///
    /// `Nováka`, `Novákovou` and `Novákové` all resolve to `novák`.
    pub fn is_known_surname(&self, token: &str) -> bool {
        let word = normalize_value(token);
        if self.surnames.contains(&word) {
            return true;
        }
        let found = declined_bases(&word, SURNAME_ENDINGS).any(|stem| {
            self.surnames.contains(&stem)
                || self.surnames.contains(&format!("{stem}a"))
                || self.surnames.contains(&format!("{stem}ová"))
        });
        found
    }

    /// Token ends with one of the surname suffixes and is longer than it
    pub fn has_surname_suffix(&self, token: &str) -> bool {
        let word = normalize_value(token);
        let len = word.chars().count();
        self.surname_suffixes
            .iter()
            .any(|suffix| word.ends_with(suffix.as_str()) && len > suffix.chars().count() + 1)
    }

    /// Known surname or a token carrying a surname suffix
    pub fn is_surname_like(&self, token: &str) -> bool {
        self.is_known_surname(token) || self.has_surname_suffix(token)
    }
}

/// Stems produced by stripping each matching ending, keeping at least two
/// characters of stem
fn declined_bases<'a>(word: &'a str, endings: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
    endings.iter().filter_map(move |ending| {
        word.strip_suffix(ending)
            .filter(|stem| stem.chars().count() >= 2)
            .map(str::to_string)
    })
}
