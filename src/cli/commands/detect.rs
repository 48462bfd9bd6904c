//! Detect command implementation
//!
//! Prints the resolved spans of one document as JSON without writing any
//! files.

use crate::adapters;
use crate::anonymization::{AnonymizationEngine, AnonymizationLevel, Span};
use crate::cli::{exit_code_for, parse_level_arg};
use crate::config::load_or_default;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Input document (UTF-8 text or .docx)
    pub input: PathBuf,

    /// Override anonymization level (minimal, standard or full)
    #[arg(long)]
    pub level: Option<String>,

    /// Single-line JSON output
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Serialize)]
struct DetectOutput<'a> {
    document: String,
    level: AnonymizationLevel,
    spans: &'a [Span],
    warnings: &'a [String],
}

impl DetectArgs {
    /// Execute the detect command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (mut config, _) = match load_or_default(config_path) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("{e}");
                return Ok(e.exit_code());
            }
        };

        if let Some(ref level) = self.level {
            match parse_level_arg(level) {
                Some(level) => config.anonymization.level = level,
                None => return Ok(2),
            }
        }

        let engine = match AnonymizationEngine::new(config.anonymization) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("Failed to initialize anonymizer: {e:#}");
                return Ok(exit_code_for(&e));
            }
        };

        let text = match adapters::read_document(&self.input) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("{e}");
                return Ok(e.exit_code());
            }
        };

        let detection = engine.detect(&text).await;
        for warning in &detection.warnings {
            tracing::warn!(warning = %warning, "Detection warning");
        }

        let output = DetectOutput {
            document: self.input.display().to_string(),
            level: engine.level(),
            spans: detection.spans.as_slice(),
            warnings: &detection.warnings,
        };
        let json = if self.compact {
            serde_json::to_string(&output)?
        } else {
            serde_json::to_string_pretty(&output)?
        };
        println!("{json}");

        Ok(0)
    }
}
