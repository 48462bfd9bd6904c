//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file and, optionally, an editable copy of the lexicon.

use crate::anonymization::lexicon::EMBEDDED_LEXICON;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "czanon.toml")]
    pub output: String,

    /// Also write the built-in lexicon to this path and reference it
    #[arg(long, value_name = "PATH")]
    pub with_lexicon: Option<String>,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing czanon configuration");
        println!();

        let targets = std::iter::once(self.output.as_str()).chain(self.with_lexicon.as_deref());
        for target in targets {
            if Path::new(target).exists() && !self.force {
                println!("❌ File already exists: {target}");
                println!("   Use --force to overwrite");
                return Ok(2);
            }
        }

        if let Some(ref lexicon_path) = self.with_lexicon {
            if let Err(e) = fs::write(lexicon_path, EMBEDDED_LEXICON) {
                println!("❌ Failed to write lexicon file");
                println!("   Error: {e}");
                return Ok(5);
            }
            println!("✅ Lexicon written: {lexicon_path}");
        }

        let config_content = Self::generate_config(self.with_lexicon.as_deref());

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Validate configuration: czanon validate-config");
                println!("  3. Preview detections: czanon anonymize --dry-run document.txt");
                println!("  4. Anonymize: czanon anonymize document.txt");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate the configuration template
    fn generate_config(lexicon_path: Option<&str>) -> String {
        let lexicon_line = match lexicon_path {
            Some(path) => format!("lexicon_path = \"{}\"", path.replace('\\', "/")),
            None => "# lexicon_path = \"lexicon.toml\"".to_string(),
        };

        format!(
            r#"# czanon Configuration File
# Czech document anonymizer

[application]
# Log level: trace, debug, info, warn, error
log_level = "info"

[anonymization]
# Detection level: minimal, standard, full
#   minimal  - birth numbers, ID cards, person names
#   standard - adds phone, e-mail, address, bank account, IBAN, date
#   full     - adds VIN, license plate, insurance numbers, name heuristics
level = "standard"

# Detect and report only, without writing anonymized output
dry_run = false

# External lexicon replacing the built-in Czech names list
{lexicon_line}

# Extra regex patterns, e.g.
#   [patterns.contract_number]
#   patterns = ['\bSML-\d{{6}}\b']
#   category = "SOCIAL_SECURITY"
#   confidence = 0.9
#   level = "standard"
# pattern_library = "patterns.toml"

[anonymization.augmentation]
# External named-entity tool reading the document on stdin and printing
# [{{"start": 0, "end": 9, "label": "PER"}}] with character offsets
enabled = false
# command = "python3"
# args = ["ner.py"]
timeout_ms = 5000

[anonymization.audit]
# Append-only log with SHA-256 hashes of detected values
enabled = false
log_path = "./audit/anonymization.log"
json_format = true

[output]
# Output directory (defaults to the input's directory)
# directory = "./out"
suffix = "_anonymized"
# Mapping formats: json, txt, csv
mapping_formats = ["json", "txt"]

[logging]
# Local JSON log files
local_enabled = false
local_path = "./logs"
# Rotation: daily, hourly, never
local_rotation = "daily"
"#
        )
    }
}
