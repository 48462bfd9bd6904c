//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - Local JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use czanon::logging::init_logging;
//! use czanon::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a document run
///
/// # Example
///
/// ```no_run
/// use czanon::log_document_start;
/// use czanon::anonymization::AnonymizationLevel;
///
/// log_document_start!("smlouva.txt", AnonymizationLevel::Standard);
/// ```
#[macro_export]
macro_rules! log_document_start {
    ($document_id:expr, $level:expr) => {
        tracing::info!(
            document_id = %$document_id,
            level = %$level,
            "Anonymizing document"
        );
    };
}

/// Log the completion of a document run
///
/// # Example
///
/// ```no_run
/// use czanon::log_document_complete;
///
/// log_document_complete!("smlouva.txt", 12, 35u64);
/// ```
#[macro_export]
macro_rules! log_document_complete {
    ($document_id:expr, $spans:expr, $duration_ms:expr) => {
        tracing::info!(
            document_id = %$document_id,
            spans = $spans,
            duration_ms = $duration_ms,
            "Document anonymized"
        );
    };
}

/// Log a recoverable detector failure
///
/// # Example
///
/// ```no_run
/// use czanon::log_detector_failure;
///
/// let error = anyhow::anyhow!("model not installed");
/// log_detector_failure!("augmentation", error);
/// ```
#[macro_export]
macro_rules! log_detector_failure {
    ($detector:expr, $error:expr) => {
        tracing::warn!(
            detector = %$detector,
            error = %$error,
            "Detector failed, continuing without it"
        );
    };
}
