//! Data models for detection and substitution

pub mod document;
pub mod placeholder;
pub mod span;

pub use document::AnonymizedDocument;
pub use placeholder::Placeholder;
pub use span::{DetectionMethod, PiiCategory, SourcePriority, Span};
