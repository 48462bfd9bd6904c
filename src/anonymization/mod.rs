//! Anonymization core
//!
//! Detects personal data in Czech plain text and replaces every occurrence
//! with a stable `[[CATEGORY_N]]` placeholder, keeping a per-document mapping
//! from placeholders back to the original values.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! - **Detection**: independent detectors over the raw text ([`detector`]),
//!   backed by the name [`lexicon`] and an optional [`augment`] hook
//! - **Resolution**: longest-match, priority-ordered overlap removal ([`resolver`])
//! - **Substitution**: one left-to-right pass issuing placeholders from a
//!   run-scoped [`registry`] ([`substitution`])
//! - **Audit**: append-only log with hashed values ([`audit`])
//!
//! # Usage
//!
//! ```rust,ignore
//! use czanon::anonymization::{AnonymizationConfig, AnonymizationEngine};
//!
//! let engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//! let result = engine.anonymize_document("doc.txt", &text).await?;
//! ```

pub mod audit;
pub mod augment;
pub mod config;
pub mod detector;
pub mod engine;
pub mod lexicon;
pub mod models;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod substitution;
pub mod text;

// Re-export main types
pub use augment::{CommandAugmenter, PersonAugmenter};
pub use config::{AnonymizationConfig, AnonymizationLevel};
pub use engine::{AnonymizationEngine, Detection};
pub use lexicon::Lexicon;
pub use models::{AnonymizedDocument, PiiCategory, Placeholder, Span};
pub use registry::{MappingExport, MappingRegistry};
pub use report::DryRunReport;
pub use resolver::{ConflictResolver, ResolvedSpans};
pub use substitution::SubstitutionEngine;
