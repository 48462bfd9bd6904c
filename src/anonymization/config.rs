//! Anonymization configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Coarseness setting controlling which detectors are active
///
/// Levels are cumulative: every category active at `minimal` is active at
/// `standard`, and every category active at `standard` is active at `full`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AnonymizationLevel {
    /// Birth numbers, ID cards and names only
    Minimal,
    /// Adds contact, address, financial and date detectors
    #[default]
    Standard,
    /// Adds vehicle and generic identifiers plus context heuristics
    Full,
}

impl fmt::Display for AnonymizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Minimal => "minimal",
            Self::Standard => "standard",
            Self::Full => "full",
        };
        f.write_str(s)
    }
}

impl FromStr for AnonymizationLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "standard" => Ok(Self::Standard),
            "full" => Ok(Self::Full),
            other => anyhow::bail!(
                "Invalid anonymization level '{other}'. Must be one of: minimal, standard, full"
            ),
        }
    }
}

/// Anonymization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Detection level
    #[serde(default)]
    pub level: AnonymizationLevel,

    /// Dry-run mode (detect but don't substitute)
    #[serde(default)]
    pub dry_run: bool,

    /// External lexicon TOML replacing the embedded one
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,

    /// Path to a custom pattern library TOML file
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,

    /// External person-name augmentation
    #[serde(default)]
    pub augmentation: AugmentationConfig,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            level: AnonymizationLevel::Standard,
            dry_run: false,
            lexicon_path: None,
            pattern_library: None,
            augmentation: AugmentationConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl AnonymizationConfig {
    /// Validate the configuration
    ///
    /// A missing lexicon is not an error here: the engine falls back to
    /// pattern-only detection.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                anyhow::bail!("Pattern library file not found: {}", path.display());
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                anyhow::bail!("Pattern library must be a TOML file: {}", path.display());
            }
        }

        self.augmentation
            .validate()
            .context("Invalid augmentation configuration")?;

        self.audit
            .validate()
            .context("Invalid audit configuration")?;

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("CZANON_ANONYMIZATION_LEVEL") {
            self.level = val
                .parse()
                .context("Invalid CZANON_ANONYMIZATION_LEVEL value")?;
        }

        if let Ok(val) = std::env::var("CZANON_ANONYMIZATION_DRY_RUN") {
            self.dry_run = val
                .parse()
                .context("Invalid CZANON_ANONYMIZATION_DRY_RUN value")?;
        }

        if let Ok(val) = std::env::var("CZANON_ANONYMIZATION_LEXICON_PATH") {
            self.lexicon_path = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("CZANON_ANONYMIZATION_PATTERN_LIBRARY") {
            self.pattern_library = Some(PathBuf::from(val));
        }

        self.augmentation.apply_env_overrides()?;
        self.audit.apply_env_overrides()?;

        Ok(())
    }
}

/// External augmentation hook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentationConfig {
    /// Run the hook for every document
    #[serde(default)]
    pub enabled: bool,

    /// Program to execute
    #[serde(default)]
    pub command: Option<String>,

    /// Program arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// Upper bound on one invocation
    #[serde(default = "default_augmentation_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_augmentation_timeout_ms() -> u64 {
    5000
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: None,
            args: Vec::new(),
            timeout_ms: default_augmentation_timeout_ms(),
        }
    }
}

impl AugmentationConfig {
    /// Validate augmentation configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be greater than 0");
        }
        if self.enabled && self.command.as_deref().map_or(true, |c| c.trim().is_empty()) {
            anyhow::bail!("command is required when augmentation is enabled");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("CZANON_ANONYMIZATION_AUGMENTATION_ENABLED") {
            self.enabled = val
                .parse()
                .context("Invalid CZANON_ANONYMIZATION_AUGMENTATION_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("CZANON_ANONYMIZATION_AUGMENTATION_COMMAND") {
            self.command = Some(val);
        }

        if let Ok(val) = std::env::var("CZANON_ANONYMIZATION_AUGMENTATION_TIMEOUT_MS") {
            self.timeout_ms = val
                .parse()
                .context("Invalid CZANON_ANONYMIZATION_AUGMENTATION_TIMEOUT_MS value")?;
        }

        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/anonymization.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled {
            if let Some(parent) = self.log_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create audit log directory: {}", parent.display())
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("CZANON_ANONYMIZATION_AUDIT_ENABLED") {
            self.enabled = val
                .parse()
                .context("Invalid CZANON_ANONYMIZATION_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("CZANON_ANONYMIZATION_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("CZANON_ANONYMIZATION_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid CZANON_ANONYMIZATION_AUDIT_JSON_FORMAT value")?;
        }

        Ok(())
    }
}
