// czanon - Czech document anonymizer
// Copyright (c) 2025 czanon Contributors
// Licensed under the MIT License

//! # czanon - Czech document anonymizer
//!
//! czanon finds personal data in Czech plain-text documents (names, birth
//! numbers, ID cards, addresses, phone numbers, bank accounts and more) and
//! replaces every occurrence with a stable placeholder such as
//! `[[PERSON_1]]`. A mapping from placeholders back to the original values is
//! produced alongside the anonymized text.
//!
//! ## Architecture
//!
//! - [`anonymization`] - detectors, conflict resolution, placeholder registry
//!   and substitution
//! - [`adapters`] - document reading/writing and mapping serializers
//! - [`config`] - configuration management
//! - [`logging`] - structured logging
//! - [`cli`] - command-line interface
//! - [`domain`] - crate-level error type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use czanon::anonymization::{AnonymizationConfig, AnonymizationEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//!     let result = engine
//!         .anonymize_document("smlouva.txt", "Jan Novák řekl Jan Novák souhlasí")
//!         .await?;
//!
//!     assert_eq!(result.anonymized_text, "[[PERSON_1]] řekl [[PERSON_1]] souhlasí");
//!     println!("{}", serde_json::to_string_pretty(&result.mapping)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Levels
//!
//! Levels are cumulative: `minimal` covers birth numbers, ID cards and
//! names; `standard` adds contact, address, financial and date data; `full`
//! adds vehicle identifiers, insurance numbers and context heuristics.
//!
//! ## Logging
//!
//! czanon uses structured logging with the `tracing` crate. Detected values
//! are only ever logged at `trace` level.

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
