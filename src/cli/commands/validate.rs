//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the czanon configuration file.

use crate::anonymization::AnonymizationEngine;
use crate::cli::exit_code_for;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        // Building the engine compiles the pattern library and loads the lexicon
        let engine = match AnonymizationEngine::new(config.anonymization.clone()) {
            Ok(engine) => engine,
            Err(e) => {
                println!("❌ Anonymization settings are not usable");
                println!("   Error: {e:#}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Anonymization Level: {}", config.anonymization.level);
        println!("  Dry Run: {}", config.anonymization.dry_run);
        println!(
            "  Lexicon: {}",
            config
                .anonymization
                .lexicon_path
                .as_ref()
                .map_or("embedded".to_string(), |p| p.display().to_string())
        );
        if let Some(ref patterns) = config.anonymization.pattern_library {
            println!("  Pattern Library: {}", patterns.display());
        }
        println!("  Detectors: {}", engine.detector_names().join(", "));
        println!(
            "  Augmentation: {}",
            match config.anonymization.augmentation.command {
                Some(ref command) if config.anonymization.augmentation.enabled => format!(
                    "{command} (timeout {} ms)",
                    config.anonymization.augmentation.timeout_ms
                ),
                _ => "disabled".to_string(),
            }
        );
        println!(
            "  Audit Log: {}",
            if config.anonymization.audit.enabled {
                config.anonymization.audit.log_path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        println!(
            "  Output Directory: {}",
            config
                .output
                .directory
                .as_ref()
                .map_or("next to input".to_string(), |p| p.display().to_string())
        );
        println!("  Output Suffix: {}", config.output.suffix);
        println!(
            "  Mapping Formats: {}",
            config
                .output
                .mapping_formats
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_missing_file() {
        let code = ValidateArgs {}
            .execute("/nonexistent/czanon.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_validate_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[anonymization]\nlevel = \"full\"\n").unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
