//! Audit logger for document runs

use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::models::{AnonymizedDocument, PiiCategory, Span};
use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    run_id: Uuid,
    timestamp: String,
    document_id: &'a str,
    level: AnonymizationLevel,
    dry_run: bool,
    detections_count: usize,
    counts: &'a BTreeMap<PiiCategory, usize>,
    processing_time_ms: u64,
    detections: Vec<AuditDetection>,
}

/// Audit detection entry (with hashed value)
#[derive(Debug, Serialize)]
struct AuditDetection {
    category: PiiCategory,
    start: usize,
    end: usize,
    confidence: f32,
    /// SHA-256 hash of the original value (never log plaintext)
    value_hash: String,
}

/// Append-only audit log of document runs
#[derive(Debug)]
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Whether entries are written at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append one entry for a processed document
    pub fn log_document(&self, document: &AnonymizedDocument) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let entry = AuditLogEntry {
            run_id: document.run_id,
            timestamp: document.timestamp.to_rfc3339(),
            document_id: &document.document_id,
            level: document.level,
            dry_run: document.dry_run,
            detections_count: document.total_detections(),
            counts: &document.stats_by_category,
            processing_time_ms: document.processing_time_ms,
            detections: document.spans.iter().map(audit_detection).collect(),
        };

        self.write_entry(&entry)
    }

    fn write_entry(&self, entry: &AuditLogEntry<'_>) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            let counts = entry
                .counts
                .iter()
                .map(|(category, count)| format!("{category}={count}"))
                .collect::<Vec<_>>()
                .join(",");
            writeln!(
                file,
                "[{}] Run: {} | Document: {} | Level: {} | Detections: {} [{}] | Time: {}ms",
                entry.timestamp,
                entry.run_id,
                entry.document_id,
                entry.level,
                entry.detections_count,
                counts,
                entry.processing_time_ms
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

fn audit_detection(span: &Span) -> AuditDetection {
    AuditDetection {
        category: span.category,
        start: span.start,
        end: span.end,
        confidence: span.confidence,
        value_hash: hash_value(&span.text),
    }
}

/// Hash a detected value using SHA-256
pub(crate) fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::{DetectionMethod, SourcePriority};
    use crate::anonymization::registry::MappingRegistry;
    use tempfile::tempdir;

    fn document() -> AnonymizedDocument {
        let text = "mail jan@example.cz";
        let span = Span::from_document(
            text,
            PiiCategory::Email,
            5,
            text.len(),
            SourcePriority::Pattern,
            DetectionMethod::Regex,
        )
        .unwrap();
        let mut registry = MappingRegistry::new();
        registry.register(PiiCategory::Email, &span.text);
        AnonymizedDocument::new(
            "smlouva.txt".to_string(),
            "mail [[EMAIL_1]]".to_string(),
            vec![span],
            registry.export(Some(AnonymizationLevel::Standard)),
            AnonymizationLevel::Standard,
            false,
            7,
            Vec::new(),
        )
    }

    #[test]
    fn test_hash_value() {
        assert_eq!(hash_value("jan@example.cz"), hash_value("jan@example.cz"));
        assert_ne!(hash_value("jan@example.cz"), hash_value("eva@example.cz"));
        assert_eq!(hash_value("").len(), 64);
    }

    #[test]
    fn test_json_entry_has_no_plaintext() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit").join("run.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();

        let doc = document();
        logger.log_document(&doc).unwrap();
        logger.log_document(&doc).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(!content.contains("jan@example.cz"));

        let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(entry["document_id"], "smlouva.txt");
        assert_eq!(entry["level"], "standard");
        assert_eq!(entry["counts"]["EMAIL"], 1);
        assert_eq!(
            entry["detections"][0]["value_hash"],
            hash_value("jan@example.cz")
        );
    }

    #[test]
    fn test_plain_format() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("run.log");
        let logger = AuditLogger::new(log_path.clone(), false, true).unwrap();
        logger.log_document(&document()).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("Document: smlouva.txt"));
        assert!(content.contains("EMAIL=1"));
        assert!(!content.contains("jan@example.cz"));
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("nested").join("run.log");
        let logger = AuditLogger::new(log_path.clone(), true, false).unwrap();
        assert!(!logger.is_enabled());
        logger.log_document(&document()).unwrap();
        assert!(!log_path.exists());
    }
}
