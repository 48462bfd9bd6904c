//! Mapping file serializers
//!
//! Renders a [`MappingExport`] as JSON, a human-readable text listing, or
//! `placeholder,original` CSV rows. Entries keep registration order.

use crate::anonymization::registry::MappingExport;
use crate::domain::{AnonymizerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Mapping file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingFormat {
    Json,
    Txt,
    Csv,
}

impl MappingFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Txt => "txt",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for MappingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MappingFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Txt),
            "csv" => Ok(Self::Csv),
            other => Err(format!(
                "unknown mapping format '{other}' (expected json, txt or csv)"
            )),
        }
    }
}

/// Render a mapping export in the given format
pub fn render(export: &MappingExport, format: MappingFormat) -> Result<String> {
    match format {
        MappingFormat::Json => Ok(serde_json::to_string_pretty(export)?),
        MappingFormat::Txt => Ok(render_txt(export)),
        MappingFormat::Csv => Ok(render_csv(export)),
    }
}

/// Render and write a mapping file, creating the parent directory
pub fn write_mapping(path: &Path, export: &MappingExport, format: MappingFormat) -> Result<()> {
    let content = render(export, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| {
        AnonymizerError::Io(format!("Failed to write mapping {}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), %format, "Wrote mapping file");
    Ok(())
}

fn render_txt(export: &MappingExport) -> String {
    let mut out = String::new();
    out.push_str("ANONYMIZATION MAPPING\n");
    out.push_str(&"=".repeat(50));
    out.push('\n');
    out.push_str(&format!("Created: {}\n", export.metadata.created_at.to_rfc3339()));
    if let Some(level) = export.metadata.level {
        out.push_str(&format!("Level: {level}\n"));
    }
    out.push_str(&format!(
        "Placeholders: {} (originals: {})\n",
        export.metadata.total, export.metadata.total_originals
    ));
    for (category, count) in &export.metadata.counts {
        out.push_str(&format!("  {category}: {count}\n"));
    }
    out.push('\n');

    for (placeholder, originals) in export.replacements.iter() {
        out.push_str(&format!("{placeholder}:\n"));
        for original in originals {
            out.push_str(&format!("  - {original}\n"));
        }
        out.push('\n');
    }
    out
}

fn render_csv(export: &MappingExport) -> String {
    let mut out = String::from("placeholder,original\r\n");
    for (placeholder, originals) in export.replacements.iter() {
        for original in originals {
            out.push_str(&csv_field(&placeholder.to_string()));
            out.push(',');
            out.push_str(&csv_field(original));
            out.push_str("\r\n");
        }
    }
    out
}

/// Quote a field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
