//! Domain error types
//!
//! Errors raised outside the detection core: configuration, document I/O and
//! mapping serialization. The detection core itself reports through `anyhow`
//! and degrades instead of failing wherever a recoverable condition exists.

use thiserror::Error;

/// Main czanon error type
#[derive(Debug, Error)]
pub enum AnonymizerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input document could not be read or is not supported
    #[error("Input error: {0}")]
    Input(String),

    /// Lexicon file could not be loaded or parsed
    #[error("Lexicon error: {0}")]
    Lexicon(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl AnonymizerError {
    /// Process exit code the CLI reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Validation(_) | Self::Lexicon(_) => 2,
            Self::Input(_) => 3,
            Self::Io(_) | Self::Serialization(_) | Self::Other(_) => 5,
        }
    }
}

impl From<std::io::Error> for AnonymizerError {
    fn from(err: std::io::Error) -> Self {
        AnonymizerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AnonymizerError {
    fn from(err: serde_json::Error) -> Self {
        AnonymizerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for AnonymizerError {
    fn from(err: toml::de::Error) -> Self {
        AnonymizerError::Configuration(format!("TOML parse error: {err}"))
    }
}
