//! Pluggable person-name augmentation
//!
//! An augmenter is an optional, possibly slow or unreliable source of extra
//! PERSON candidates, typically an external linguistic analysis tool. The
//! engine always calls it through [`run_guarded`], which bounds it with a
//! timeout and turns every failure into a warning and an empty result.

use crate::anonymization::config::{AnonymizationLevel, AugmentationConfig};
use crate::anonymization::models::{DetectionMethod, PiiCategory, SourcePriority, Span};
use crate::anonymization::text::char_to_byte;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Capability returning additional PERSON candidates for a document
#[async_trait]
pub trait PersonAugmenter: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Produce PERSON spans with byte offsets into `text`
    async fn augment(&self, text: &str, level: AnonymizationLevel) -> Result<Vec<Span>>;
}

/// Result of a guarded augmentation call
#[derive(Debug, Default)]
pub struct AugmentationOutcome {
    /// Accepted PERSON spans
    pub spans: Vec<Span>,
    /// Set when the hook failed, panicked or timed out
    pub warning: Option<String>,
}

impl AugmentationOutcome {
    fn failed(warning: String) -> Self {
        Self {
            spans: Vec::new(),
            warning: Some(warning),
        }
    }
}

/// Run an augmenter in its own task, bounded by `limit`
///
/// The task is aborted on timeout. Returned spans that are not PERSON or do
/// not match the document are dropped.
pub async fn run_guarded(
    augmenter: Arc<dyn PersonAugmenter>,
    text: &str,
    level: AnonymizationLevel,
    limit: Duration,
) -> AugmentationOutcome {
    let name = augmenter.name().to_string();
    let task_text = text.to_string();
    let task_augmenter = Arc::clone(&augmenter);
    let mut handle =
        tokio::spawn(async move { task_augmenter.augment(&task_text, level).await });

    let spans = match tokio::time::timeout(limit, &mut handle).await {
        Err(_) => {
            handle.abort();
            tracing::warn!(
                augmenter = %name,
                timeout_ms = limit.as_millis() as u64,
                "Augmentation timed out, continuing with pattern detection only"
            );
            return AugmentationOutcome::failed(format!(
                "Augmenter '{name}' timed out after {} ms",
                limit.as_millis()
            ));
        }
        Ok(Err(join_error)) => {
            let reason = if join_error.is_panic() {
                "panicked"
            } else {
                "was cancelled"
            };
            tracing::warn!(augmenter = %name, reason, "Augmentation task failed");
            return AugmentationOutcome::failed(format!("Augmenter '{name}' {reason}"));
        }
        Ok(Ok(Err(e))) => {
            crate::log_detector_failure!(name.as_str(), e);
            return AugmentationOutcome::failed(format!("Augmenter '{name}' failed: {e}"));
        }
        Ok(Ok(Ok(spans))) => spans,
    };

    let returned = spans.len();
    let spans: Vec<Span> = spans
        .into_iter()
        .filter(|s| s.category == PiiCategory::Person && s.is_well_formed(text))
        .collect();
    if spans.len() < returned {
        tracing::warn!(
            augmenter = %name,
            dropped = returned - spans.len(),
            "Dropped augmentation spans that are not PERSON or do not match the document"
        );
    }
    tracing::debug!(augmenter = %name, spans = spans.len(), "Augmentation finished");

    AugmentationOutcome {
        spans,
        warning: None,
    }
}

#[derive(Debug, Deserialize)]
struct ExternalEntity {
    start: usize,
    end: usize,
    #[serde(default)]
    label: Option<String>,
}

/// Augmenter backed by an external program
///
/// The document is written to the program's stdin and the anonymization
/// level is passed in `CZANON_LEVEL`. The program prints a JSON array of
/// `{"start": c, "end": c, "label": "PER"}` objects with character offsets;
/// entries with a label other than `PER`/`PERSON` are ignored.
#[derive(Debug, Clone)]
pub struct CommandAugmenter {
    program: String,
    args: Vec<String>,
}

impl CommandAugmenter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from configuration; `None` when augmentation is disabled
    pub fn from_config(config: &AugmentationConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        config
            .command
            .as_ref()
            .map(|command| Self::new(command.clone(), config.args.clone()))
    }
}

#[async_trait]
impl PersonAugmenter for CommandAugmenter {
    fn name(&self) -> &str {
        &self.program
    }

    async fn augment(&self, text: &str, level: AnonymizationLevel) -> Result<Vec<Span>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("CZANON_LEVEL", level.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start augmenter '{}'", self.program))?;

        let mut stdin = child
            .stdin
            .take()
            .context("Augmenter stdin was not captured")?;
        let input = text.as_bytes().to_vec();
        let writer = async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        };

        let (written, output) = tokio::join!(writer, child.wait_with_output());
        let output = output.context("Failed to wait for augmenter")?;
        if let Err(e) = written {
            tracing::debug!(error = %e, "Augmenter closed stdin early");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "Augmenter exited with {}: {}",
                output.status,
                stderr.trim()
            );
        }

        let entities: Vec<ExternalEntity> = serde_json::from_slice(&output.stdout)
            .context("Augmenter output is not a JSON array of entities")?;

        let mut spans = Vec::with_capacity(entities.len());
        for entity in entities {
            let is_person = entity
                .label
                .as_deref()
                .map_or(true, |l| matches!(l.to_uppercase().as_str(), "PER" | "PERSON"));
            if !is_person {
                continue;
            }
            let (Some(start), Some(end)) =
                (char_to_byte(text, entity.start), char_to_byte(text, entity.end))
            else {
                tracing::warn!(
                    start = entity.start,
                    end = entity.end,
                    "Augmenter returned offsets outside the document"
                );
                continue;
            };
            spans.extend(Span::from_document(
                text,
                PiiCategory::Person,
                start,
                end,
                SourcePriority::NameGroup,
                DetectionMethod::Augmentation,
            ));
        }

        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAugmenter(Vec<Span>);

    #[async_trait]
    impl PersonAugmenter for FixedAugmenter {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn augment(&self, _text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
            Ok(self.0.clone())
        }
    }

    struct FailingAugmenter;

    #[async_trait]
    impl PersonAugmenter for FailingAugmenter {
        fn name(&self) -> &str {
            "failing"
        }

        async fn augment(&self, _text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
            anyhow::bail!("model not installed")
        }
    }

    struct HangingAugmenter;

    #[async_trait]
    impl PersonAugmenter for HangingAugmenter {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn augment(&self, _text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    struct PanickingAugmenter;

    #[async_trait]
    impl PersonAugmenter for PanickingAugmenter {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn augment(&self, _text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
            panic!("augmenter bug")
        }
    }

    fn person(text: &str, start: usize, end: usize) -> Span {
        Span::from_document(
            text,
            PiiCategory::Person,
            start,
            end,
            SourcePriority::NameGroup,
            DetectionMethod::Augmentation,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_spans_filtered_to_person() {
        let text = "Olga Krtková volala";
        let mut email = person(text, 0, 4);
        email.category = PiiCategory::Email;
        let augmenter = Arc::new(FixedAugmenter(vec![person(text, 0, 13), email]));

        let outcome =
            run_guarded(augmenter, text, AnonymizationLevel::Full, Duration::from_secs(1)).await;
        assert!(outcome.warning.is_none());
        assert_eq!(outcome.spans.len(), 1);
        assert_eq!(outcome.spans[0].text, "Olga Krtková");
    }

    #[tokio::test]
    async fn test_error_becomes_warning() {
        let outcome = run_guarded(
            Arc::new(FailingAugmenter),
            "text",
            AnonymizationLevel::Full,
            Duration::from_secs(1),
        )
        .await;
        assert!(outcome.spans.is_empty());
        assert!(outcome.warning.unwrap().contains("model not installed"));
    }

    #[tokio::test]
    async fn test_timeout_becomes_warning() {
        let started = std::time::Instant::now();
        let outcome = run_guarded(
            Arc::new(HangingAugmenter),
            "text",
            AnonymizationLevel::Full,
            Duration::from_millis(50),
        )
        .await;
        assert!(outcome.spans.is_empty());
        assert!(outcome.warning.unwrap().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_panic_becomes_warning() {
        let outcome = run_guarded(
            Arc::new(PanickingAugmenter),
            "text",
            AnonymizationLevel::Full,
            Duration::from_secs(1),
        )
        .await;
        assert!(outcome.spans.is_empty());
        assert!(outcome.warning.unwrap().contains("panicked"));
    }

    #[test]
    fn test_from_config() {
        let mut config = AugmentationConfig::default();
        assert!(CommandAugmenter::from_config(&config).is_none());
        config.enabled = true;
        config.command = Some("ner".to_string());
        assert_eq!(CommandAugmenter::from_config(&config).unwrap().name(), "ner");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_augmenter_converts_char_offsets() {
        let script = r#"cat > /dev/null; printf '[{"start":0,"end":5,"label":"PER"},{"start":6,"end":12,"label":"LOC"}]'"#;
        let augmenter = CommandAugmenter::new("sh", vec!["-c".to_string(), script.to_string()]);
        let text = "Žofie přišla";
        let spans = augmenter.augment(text, AnonymizationLevel::Full).await.unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Žofie");
        assert_eq!(spans[0].detection_method, DetectionMethod::Augmentation);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_augmenter_failure_status() {
        let augmenter = CommandAugmenter::new(
            "sh",
            vec!["-c".to_string(), "echo broken >&2; exit 3".to_string()],
        );
        let err = augmenter
            .augment("text", AnonymizationLevel::Full)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let augmenter = CommandAugmenter::new("/nonexistent/czanon-ner", Vec::new());
        assert!(augmenter.augment("text", AnonymizationLevel::Full).await.is_err());
    }
}
