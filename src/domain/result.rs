//! Result type alias for czanon

use super::errors::AnonymizerError;

/// Result type alias for operations outside the detection core
///
/// # Examples
///
/// ```
/// use czanon::domain::result::Result;
/// use czanon::domain::errors::AnonymizerError;
///
/// fn failing_function() -> Result<()> {
///     Err(AnonymizerError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, AnonymizerError>;
