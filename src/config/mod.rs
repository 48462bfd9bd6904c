//! Configuration management for czanon.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! czanon uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CZANON_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation of every section
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use czanon::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("czanon.toml")?;
//! println!("Level: {}", config.anonymization.level);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`AnonymizationConfig`](crate::anonymization::AnonymizationConfig) -
//!   level, dry-run, lexicon, patterns, augmentation and audit
//! - [`OutputConfig`] - Output directory, file suffix and mapping formats
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [anonymization]
//! level = "standard"
//! lexicon_path = "${CZANON_HOME}/lexicon.toml"
//!
//! [output]
//! suffix = "_anonymized"
//! mapping_formats = ["json", "txt"]
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_or_default};
pub use schema::{ApplicationConfig, CzanonConfig, LoggingConfig, OutputConfig};
