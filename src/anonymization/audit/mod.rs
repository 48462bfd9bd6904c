//! Audit logging module
//!
//! One line per processed document, with detected values reduced to SHA-256
//! hashes.

pub mod logger;

pub use logger::AuditLogger;
