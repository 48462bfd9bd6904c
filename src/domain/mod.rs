//! Crate-level error type and result alias.
//!
//! ```rust
//! use czanon::domain::{AnonymizerError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(AnonymizerError::Input("document is empty".to_string()))
//! }
//!
//! assert_eq!(example().unwrap_err().exit_code(), 3);
//! ```

pub mod errors;
pub mod result;

pub use errors::AnonymizerError;
pub use result::Result;
