//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CzanonConfig;
use crate::adapters::mapping::MappingFormat;
use crate::domain::errors::AnonymizerError;
use crate::domain::result::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

static ENV_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CzanonConfig
/// 4. Applies environment variable overrides (CZANON_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a configuration error if the file cannot be read or parsed, a
/// referenced environment variable is not set, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use czanon::config::loader::load_config;
///
/// let config = load_config("czanon.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CzanonConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AnonymizerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AnonymizerError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CzanonConfig = toml::from_str(&contents)
        .map_err(|e| AnonymizerError::Configuration(format!("Failed to parse TOML: {e}")))?;

    finish(&mut config)?;
    Ok(config)
}

/// Loads configuration, falling back to defaults when the file is absent
///
/// The flag is `true` when the file was found. A file that exists but is
/// invalid is still an error.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<(CzanonConfig, bool)> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path).map(|config| (config, true));
    }

    tracing::warn!(
        config_path = %path.display(),
        "Configuration file not found, using defaults"
    );
    let mut config = CzanonConfig::default();
    finish(&mut config)?;
    Ok((config, false))
}

fn finish(config: &mut CzanonConfig) -> Result<()> {
    apply_env_overrides(config)?;
    config.validate().map_err(|e| {
        AnonymizerError::Configuration(format!("Configuration validation failed: {e}"))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in ENV_VAR.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AnonymizerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    value
        .trim()
        .parse()
        .map_err(|_| AnonymizerError::Configuration(format!("Invalid {name} value: {value}")))
}

/// Applies environment variable overrides using CZANON_* prefix
///
/// Environment variables follow the pattern: CZANON_<SECTION>_<KEY>
/// For example: CZANON_APPLICATION_LOG_LEVEL, CZANON_ANONYMIZATION_LEVEL
fn apply_env_overrides(config: &mut CzanonConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("CZANON_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Anonymization overrides
    config
        .anonymization
        .apply_env_overrides()
        .map_err(|e| AnonymizerError::Configuration(format!("{e:#}")))?;

    // Output overrides
    if let Ok(val) = std::env::var("CZANON_OUTPUT_DIRECTORY") {
        config.output.directory = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("CZANON_OUTPUT_SUFFIX") {
        config.output.suffix = val;
    }
    if let Ok(val) = std::env::var("CZANON_OUTPUT_MAPPING_FORMATS") {
        config.output.mapping_formats = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<MappingFormat>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| {
                AnonymizerError::Configuration(format!(
                    "Invalid CZANON_OUTPUT_MAPPING_FORMATS value: {e}"
                ))
            })?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CZANON_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("CZANON_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("CZANON_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("CZANON_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
