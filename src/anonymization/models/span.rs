//! Detected span data model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of personal data a span denotes
///
/// The set is closed: adding a category means adding a detector and a
/// precedence entry here, never touching the resolver or the registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiCategory {
    /// First name, surname or a full name
    Person,
    /// Czech birth number (rodné číslo)
    BirthId,
    /// Telephone number
    Phone,
    /// Email address
    Email,
    /// Postal address
    Address,
    /// Bank account number or IBAN
    Bank,
    /// Insurance / generic personal numeric identifier
    SocialSecurity,
    /// Calendar date
    Date,
    /// Vehicle registration plate
    LicensePlate,
    /// Vehicle identification number
    Vin,
    /// Identity card number
    IdCard,
}

impl PiiCategory {
    /// Every category, in declaration order
    pub const ALL: [PiiCategory; 11] = [
        Self::Person,
        Self::BirthId,
        Self::Phone,
        Self::Email,
        Self::Address,
        Self::Bank,
        Self::SocialSecurity,
        Self::Date,
        Self::LicensePlate,
        Self::Vin,
        Self::IdCard,
    ];

    /// Uppercase label used inside placeholder tokens
    pub fn label(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::BirthId => "BIRTH_ID",
            Self::Phone => "PHONE",
            Self::Email => "EMAIL",
            Self::Address => "ADDRESS",
            Self::Bank => "BANK",
            Self::SocialSecurity => "SOCIAL_SECURITY",
            Self::Date => "DATE",
            Self::LicensePlate => "LICENSE_PLATE",
            Self::Vin => "VIN",
            Self::IdCard => "ID_CARD",
        }
    }

    /// Tie-break rank used by the conflict resolver; lower wins
    ///
    /// Identifier, financial and contact categories come first, then
    /// `Person`, then the generic and context-derived categories.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::BirthId => 0,
            Self::IdCard => 1,
            Self::Vin => 2,
            Self::Bank => 3,
            Self::Email => 4,
            Self::Phone => 5,
            Self::Address => 6,
            Self::Person => 7,
            Self::Date => 8,
            Self::LicensePlate => 9,
            Self::SocialSecurity => 10,
        }
    }

    /// Whether values of this category are made of digits and separators
    pub fn is_numeric_identifier(&self) -> bool {
        matches!(
            self,
            Self::BirthId
                | Self::Phone
                | Self::Bank
                | Self::SocialSecurity
                | Self::IdCard
                | Self::LicensePlate
                | Self::Vin
        )
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PiiCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PERSON" | "NAME" => Ok(Self::Person),
            "BIRTH_ID" | "RC" => Ok(Self::BirthId),
            "PHONE" => Ok(Self::Phone),
            "EMAIL" => Ok(Self::Email),
            "ADDRESS" => Ok(Self::Address),
            "BANK" | "ACCOUNT" | "IBAN" => Ok(Self::Bank),
            "SOCIAL_SECURITY" => Ok(Self::SocialSecurity),
            "DATE" => Ok(Self::Date),
            "LICENSE_PLATE" | "PLATE" => Ok(Self::LicensePlate),
            "VIN" => Ok(Self::Vin),
            "ID_CARD" | "OP" => Ok(Self::IdCard),
            _ => Err(format!("Unknown PII category: {s}")),
        }
    }
}

/// Rank of the detector family that produced a span
///
/// Higher ranks win ties between candidates with equal start and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePriority {
    /// Context-only matches, active at the `full` level
    Heuristic = 0,
    /// A single capitalized token found in the lexicon
    NameSingle = 1,
    /// First name followed by a surname-like token
    NameGroup = 2,
    /// Structural identifier, financial and contact patterns
    Pattern = 3,
}

/// Detection method used to identify a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Regex pattern with semantic validation
    Regex,
    /// Lexicon membership of capitalized tokens
    Lexicon,
    /// Morphology or context heuristics
    Heuristic,
    /// External linguistic analysis hook
    Augmentation,
}

/// Half-open byte interval of the document tagged with a category
///
/// Offsets always fall on UTF-8 character boundaries; `text` is the exact
/// substring `document[start..end]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
    /// Detected category
    pub category: PiiCategory,
    /// Exact matched text
    pub text: String,
    /// Rank of the producing detector
    pub source_priority: SourcePriority,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// How the span was found
    pub detection_method: DetectionMethod,
}

impl Span {
    /// Create a span from already extracted text
    pub fn new(
        category: PiiCategory,
        text: impl Into<String>,
        start: usize,
        end: usize,
        source_priority: SourcePriority,
        detection_method: DetectionMethod,
    ) -> Self {
        Self {
            start,
            end,
            category,
            text: text.into(),
            source_priority,
            confidence: 1.0,
            detection_method,
        }
    }

    /// Create a span by slicing the document; `None` if the range is not a
    /// valid character range of `document`
    pub fn from_document(
        document: &str,
        category: PiiCategory,
        start: usize,
        end: usize,
        source_priority: SourcePriority,
        detection_method: DetectionMethod,
    ) -> Option<Self> {
        if start >= end {
            return None;
        }
        let text = document.get(start..end)?;
        Some(Self::new(
            category,
            text,
            start,
            end,
            source_priority,
            detection_method,
        ))
    }

    /// Set the confidence score
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for a degenerate span
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True if the two half-open intervals intersect
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check the span against the document it claims to come from
    pub fn is_well_formed(&self, document: &str) -> bool {
        self.start < self.end
            && self.end <= document.len()
            && document.get(self.start..self.end) == Some(self.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_serde_names() {
        for category in PiiCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.label()));
        }
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("person".parse::<PiiCategory>().unwrap(), PiiCategory::Person);
        assert_eq!("PLATE".parse::<PiiCategory>().unwrap(), PiiCategory::LicensePlate);
        assert!("nope".parse::<PiiCategory>().is_err());
    }

    #[test]
    fn test_structural_categories_outrank_person() {
        for category in [
            PiiCategory::BirthId,
            PiiCategory::IdCard,
            PiiCategory::Bank,
            PiiCategory::Email,
            PiiCategory::Phone,
            PiiCategory::Address,
        ] {
            assert!(category.precedence() < PiiCategory::Person.precedence());
        }
        assert!(PiiCategory::Person.precedence() < PiiCategory::SocialSecurity.precedence());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(SourcePriority::Pattern > SourcePriority::NameGroup);
        assert!(SourcePriority::NameGroup > SourcePriority::NameSingle);
        assert!(SourcePriority::NameSingle > SourcePriority::Heuristic);
    }

    #[test]
    fn test_from_document_respects_char_boundaries() {
        let doc = "Paní Žofie";
        // 'í' and 'Ž' are two bytes each; offset 7 is inside 'Ž'
        assert!(Span::from_document(
            doc,
            PiiCategory::Person,
            7,
            doc.len(),
            SourcePriority::NameSingle,
            DetectionMethod::Lexicon
        )
        .is_none());
        let span = Span::from_document(
            doc,
            PiiCategory::Person,
            6,
            doc.len(),
            SourcePriority::NameSingle,
            DetectionMethod::Lexicon,
        )
        .unwrap();
        assert_eq!(span.text, "Žofie");
        assert!(span.is_well_formed(doc));
    }

    #[test]
    fn test_overlaps() {
        let a = Span::new(PiiCategory::Person, "ab", 0, 2, SourcePriority::NameSingle, DetectionMethod::Lexicon);
        let b = Span::new(PiiCategory::Person, "b", 1, 2, SourcePriority::NameSingle, DetectionMethod::Lexicon);
        let c = Span::new(PiiCategory::Person, "c", 2, 3, SourcePriority::NameSingle, DetectionMethod::Lexicon);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_malformed_span_detected() {
        let doc = "abc";
        let span = Span::new(PiiCategory::Email, "abcd", 0, 4, SourcePriority::Pattern, DetectionMethod::Regex);
        assert!(!span.is_well_formed(doc));
        let span = Span::new(PiiCategory::Email, "x", 1, 2, SourcePriority::Pattern, DetectionMethod::Regex);
        assert!(!span.is_well_formed(doc));
    }
}
