//! Configuration schema types

use crate::adapters::mapping::MappingFormat;
use crate::anonymization::config::AnonymizationConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main czanon configuration
///
/// This is the root configuration structure that maps to the TOML file.
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CzanonConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Detection and substitution settings
    #[serde(default)]
    pub anonymization: AnonymizationConfig,

    /// Where anonymized documents and mappings are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CzanonConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.anonymization.validate().map_err(|e| format!("{e:#}"))?;
        self.output.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory; the input's directory when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Suffix appended to the input file stem
    #[serde(default = "default_output_suffix")]
    pub suffix: String,

    /// Mapping files written next to each anonymized document
    #[serde(default = "default_mapping_formats")]
    pub mapping_formats: Vec<MappingFormat>,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.suffix.is_empty() && self.directory.is_none() {
            return Err(
                "output.suffix must not be empty when output.directory is unset \
                 (the input would be overwritten)"
                    .to_string(),
            );
        }

        if self.suffix.contains(['/', '\\']) {
            return Err(format!(
                "Invalid output.suffix '{}': must not contain path separators",
                self.suffix
            ));
        }

        Ok(())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            suffix: default_output_suffix(),
            mapping_formats: default_mapping_formats(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path must be set when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_suffix() -> String {
    "_anonymized".to_string()
}

fn default_mapping_formats() -> Vec<MappingFormat> {
    vec![MappingFormat::Json, MappingFormat::Txt]
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
