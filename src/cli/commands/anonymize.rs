//! Anonymize command implementation
//!
//! Reads each input document (UTF-8 text or `.docx`), replaces detected
//! personal data with placeholders and writes the anonymized document in
//! its own format plus mapping files. With
//! `--dry-run` nothing is written and a detection report is printed instead.

use crate::adapters::{self, MappingFormat, SourceDocument};
use crate::anonymization::AnonymizationEngine;
use crate::cli::{exit_code_for, parse_level_arg};
use crate::config::load_or_default;
use clap::Args;
use std::collections::HashMap;
use std::path::PathBuf;

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// Input documents (UTF-8 text or .docx)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Override anonymization level (minimal, standard or full)
    #[arg(long)]
    pub level: Option<String>,

    /// Detect and report only, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Override output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override mapping formats (comma-separated: json, txt, csv)
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Write the detection report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(inputs = self.inputs.len(), "Starting anonymize command");

        let (mut config, _) = match load_or_default(config_path) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("{e}");
                return Ok(e.exit_code());
            }
        };

        // Apply CLI overrides
        if let Some(ref level) = self.level {
            match parse_level_arg(level) {
                Some(level) => config.anonymization.level = level,
                None => return Ok(2),
            }
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.anonymization.dry_run = true;
        }
        if let Some(ref dir) = self.output_dir {
            config.output.directory = Some(dir.clone());
        }
        if !self.formats.is_empty() {
            match self
                .formats
                .iter()
                .map(|f| f.parse::<MappingFormat>())
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(formats) => config.output.mapping_formats = formats,
                Err(e) => {
                    eprintln!("Invalid --formats value: {e}");
                    return Ok(2);
                }
            }
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let engine = match AnonymizationEngine::new(config.anonymization.clone()) {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!(error = ?e, "Failed to create anonymization engine");
                eprintln!("Failed to initialize anonymizer: {e:#}");
                return Ok(exit_code_for(&e));
            }
        };

        let mut input_failures = 0usize;
        let mut sources = HashMap::new();
        let mut documents = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            match SourceDocument::open(input) {
                Ok(source) => {
                    let id = input.display().to_string();
                    documents.push((id.clone(), source.text().to_string()));
                    sources.insert(id, (input.clone(), source));
                }
                Err(e) => {
                    tracing::error!(input = %input.display(), error = %e, "Failed to read document");
                    eprintln!("❌ {e}");
                    input_failures += 1;
                }
            }
        }

        let read_count = documents.len();
        let (results, report) = engine.anonymize_batch_with_report(documents).await;

        if engine.is_dry_run() {
            println!("🔍 DRY RUN MODE - no files will be written");
            print!("{}", report.format_console());
        } else {
            for result in &results {
                let Some((input, source)) = sources.get(&result.document_id) else {
                    continue;
                };

                let output_path = adapters::output_path_for(input, &config.output);
                source.write_anonymized(&output_path, result)?;

                let mut written = vec![output_path.display().to_string()];
                for format in &config.output.mapping_formats {
                    let mapping_path = adapters::mapping_path_for(input, &config.output, *format);
                    adapters::write_mapping(&mapping_path, &result.mapping, *format)?;
                    written.push(mapping_path.display().to_string());
                }

                println!(
                    "✅ {} → {} spans, {} placeholders",
                    result.document_id,
                    result.total_detections(),
                    result.mapping.metadata.total
                );
                for path in written {
                    println!("   {path}");
                }
                for warning in &result.warnings {
                    println!("   ⚠️  {warning}");
                }
            }
        }

        if let Some(ref report_path) = self.report {
            report.write_to_file(report_path)?;
            println!("📄 Report written to {}", report_path.display());
        }

        let failed = input_failures + read_count - results.len();
        if failed > 0 {
            println!("⚠️  {failed} document(s) could not be processed");
            return Ok(3);
        }
        Ok(0)
    }
}
