//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for czanon using clap.

pub mod commands;

use crate::anonymization::AnonymizationLevel;
use crate::domain::AnonymizerError;
use clap::{Parser, Subcommand};

/// czanon - Czech document anonymizer
#[derive(Parser, Debug)]
#[command(name = "czanon")]
#[command(version, about, long_about = None)]
#[command(author = "czanon Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "czanon.toml", env = "CZANON_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CZANON_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymize documents and write placeholder mappings
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Print the spans detected in a document as JSON
    Detect(commands::detect::DetectArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Exit code for an error, taken from the first [`AnonymizerError`] in its chain
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|e| e.downcast_ref::<AnonymizerError>())
        .map_or(5, AnonymizerError::exit_code)
}

/// Parse a `--level` value, printing the problem on failure
pub(crate) fn parse_level_arg(value: &str) -> Option<AnonymizationLevel> {
    match value.parse() {
        Ok(level) => Some(level),
        Err(e) => {
            tracing::error!(level = %value, "Invalid anonymization level");
            eprintln!("{e}");
            None
        }
    }
}
