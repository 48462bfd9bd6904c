//! Main anonymization engine
//!
//! [`AnonymizationEngine`] runs one document at a time through the pipeline:
//!
//! 1. every detector active at the configured level produces candidates
//! 2. the optional augmenter adds PERSON candidates under a timeout
//! 3. the conflict resolver keeps a non-overlapping set
//! 4. the substitution engine replaces accepted spans with placeholders from
//!    a fresh [`MappingRegistry`]
//!
//! # Examples
//!
//! ```no_run
//! use czanon::anonymization::{AnonymizationEngine, AnonymizationConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//! let result = engine
//!     .anonymize_document("smlouva.txt", "Rodné číslo: 850315/1234")
//!     .await?;
//! assert_eq!(result.anonymized_text, "Rodné číslo: [[BIRTH_ID_1]]");
//! # Ok(())
//! # }
//! ```

use crate::anonymization::{
    augment::{run_guarded, CommandAugmenter, PersonAugmenter},
    audit::AuditLogger,
    config::{AnonymizationConfig, AnonymizationLevel},
    detector::{patterns::PatternRegistry, regex::RegexDetector, DetectorSet},
    lexicon::Lexicon,
    models::AnonymizedDocument,
    registry::MappingRegistry,
    report::DryRunReport,
    resolver::{ConflictResolver, ResolvedSpans},
    substitution::SubstitutionEngine,
};
use crate::domain::AnonymizerError;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Resolved spans of a document plus the recoverable problems met
#[derive(Debug, Default)]
pub struct Detection {
    /// Accepted, non-overlapping spans in document order
    pub spans: ResolvedSpans,
    /// Detector, lexicon and augmentation warnings
    pub warnings: Vec<String>,
}

/// Main anonymization engine
///
/// Holds only immutable state (detectors, lexicon, pattern library), so one
/// engine can serve many documents. Every document run gets its own registry.
pub struct AnonymizationEngine {
    config: AnonymizationConfig,
    detectors: DetectorSet,
    resolver: ConflictResolver,
    substitution: SubstitutionEngine,
    augmenter: Option<Arc<dyn PersonAugmenter>>,
    audit_logger: Option<AuditLogger>,
    setup_warnings: Vec<String>,
}

impl AnonymizationEngine {
    /// Create a new anonymization engine
    ///
    /// # Errors
    ///
    /// Returns a configuration error if validation fails, the pattern library
    /// cannot be compiled or the audit log directory cannot be created. A
    /// lexicon that fails to load is not an error: the engine logs a warning
    /// and runs without the name detector.
    pub fn new(config: AnonymizationConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AnonymizerError::Configuration(format!("{e:#}")))
            .context("Invalid anonymization configuration")?;

        let mut setup_warnings = Vec::new();
        let lexicon = match load_lexicon(&config) {
            Ok(lexicon) => Some(Arc::new(lexicon)),
            Err(e) => {
                crate::log_detector_failure!("lexicon", e);
                setup_warnings.push(format!(
                    "Lexicon unavailable, person names are not detected: {e}"
                ));
                None
            }
        };

        let mut detectors = DetectorSet::standard(lexicon);
        if let Some(ref pattern_path) = config.pattern_library {
            let registry = PatternRegistry::from_file(pattern_path)
                .map_err(|e| AnonymizerError::Configuration(format!("{e:#}")))
                .context("Failed to load custom pattern library")?;
            tracing::info!(
                path = %pattern_path.display(),
                patterns = registry.all_patterns().len(),
                "Loaded custom pattern library"
            );
            detectors.register(RegexDetector::with_registry(registry));
        }

        let augmenter = CommandAugmenter::from_config(&config.augmentation)
            .map(|a| Arc::new(a) as Arc<dyn PersonAugmenter>);

        let audit_logger = if config.audit.enabled {
            Some(
                AuditLogger::new(
                    config.audit.log_path.clone(),
                    config.audit.json_format,
                    true,
                )
                .map_err(|e| AnonymizerError::Configuration(format!("{e:#}")))?,
            )
        } else {
            None
        };

        tracing::debug!(
            level = %config.level,
            detectors = ?detectors.names(),
            augmentation = augmenter.is_some(),
            "Anonymization engine ready"
        );

        Ok(Self {
            config,
            detectors,
            resolver: ConflictResolver::new(),
            substitution: SubstitutionEngine::new(),
            augmenter,
            audit_logger,
            setup_warnings,
        })
    }

    /// Replace the configured augmenter
    pub fn with_augmenter(mut self, augmenter: Arc<dyn PersonAugmenter>) -> Self {
        self.augmenter = Some(augmenter);
        self
    }

    /// Detect and resolve spans without substituting anything
    pub async fn detect(&self, text: &str) -> Detection {
        let level = self.config.level;
        let outcome = self.detectors.detect_all(text, level);
        let mut candidates = outcome.candidates;
        let mut warnings = self.setup_warnings.clone();
        warnings.extend(outcome.warnings);

        if let Some(ref augmenter) = self.augmenter {
            let limit = Duration::from_millis(self.config.augmentation.timeout_ms);
            let augmented = run_guarded(Arc::clone(augmenter), text, level, limit).await;
            candidates.extend(augmented.spans);
            warnings.extend(augmented.warning);
        }

        let candidate_count = candidates.len();
        let (spans, losses) = self.resolver.resolve_with_losses(candidates);
        tracing::debug!(
            candidates = candidate_count,
            accepted = spans.len(),
            overlaps = losses.len(),
            "Resolved candidate spans"
        );

        Detection { spans, warnings }
    }

    /// Anonymize one document
    ///
    /// In dry-run mode the returned text equals the input, while the mapping
    /// still shows the placeholders a real run would issue.
    pub async fn anonymize_document(
        &self,
        document_id: &str,
        text: &str,
    ) -> Result<AnonymizedDocument> {
        crate::log_document_start!(document_id, self.config.level);
        let start = Instant::now();

        let Detection { spans, warnings } = self.detect(text).await;

        let mut registry = MappingRegistry::new();
        let anonymized_text = if self.config.dry_run {
            for span in &spans {
                registry.register(span.category, &span.text);
            }
            text.to_string()
        } else {
            self.substitution.apply(text, &spans, &mut registry)
        };

        let result = AnonymizedDocument::new(
            document_id.to_string(),
            anonymized_text,
            spans.into_inner(),
            registry.export(Some(self.config.level)),
            self.config.level,
            self.config.dry_run,
            start.elapsed().as_millis() as u64,
            warnings,
        );

        if let Some(ref logger) = self.audit_logger {
            logger
                .log_document(&result)
                .with_context(|| format!("Failed to write audit entry for {document_id}"))?;
        }

        crate::log_document_complete!(
            document_id,
            result.total_detections(),
            result.processing_time_ms
        );
        Ok(result)
    }

    /// Anonymize a batch of `(document_id, text)` pairs and build a report
    ///
    /// A document that fails is left out of the results and recorded as a
    /// report warning.
    pub async fn anonymize_batch_with_report(
        &self,
        documents: Vec<(String, String)>,
    ) -> (Vec<AnonymizedDocument>, DryRunReport) {
        let mut results = Vec::with_capacity(documents.len());
        let mut report = DryRunReport::new();

        for (document_id, text) in documents {
            let start = Instant::now();
            match self.anonymize_document(&document_id, &text).await {
                Ok(result) => {
                    report.add_document(&result, start.elapsed().as_millis() as u64);
                    results.push(result);
                }
                Err(e) => {
                    tracing::error!(document_id = %document_id, error = ?e, "Failed to anonymize document");
                    report.add_warning(format!("Failed to anonymize {document_id}: {e}"));
                }
            }
        }

        (results, report)
    }

    /// Check if in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.config.dry_run
    }

    /// Configured level
    pub fn level(&self) -> AnonymizationLevel {
        self.config.level
    }

    /// Names of the active detectors
    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.names()
    }
}

fn load_lexicon(config: &AnonymizationConfig) -> crate::domain::Result<Lexicon> {
    match config.lexicon_path {
        Some(ref path) => {
            let lexicon = Lexicon::from_file(path)?;
            tracing::info!(path = %path.display(), "Loaded external lexicon");
            Ok(lexicon)
        }
        None => Lexicon::embedded(),
    }
}
