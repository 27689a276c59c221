//! Error types for ccmonitor
//!
//! The accounting engine itself is total over well-typed input, so the
//! variants here describe failures at the edges: the usage source, CLI
//! validation and timezone lookup. All errors derive from `thiserror` for
//! convenient `?` propagation.
//!
//! # Example
//!
//! ```
//! use ccmonitor_core::error::{CcmonitorError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to CcmonitorError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for ccmonitor operations
#[derive(Error, Debug)]
pub enum CcmonitorError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// No Claude data directories found
    #[error("No Claude data directories found")]
    NoClaudeDirectory,

    /// The usage source could not produce events
    #[error("Usage data unavailable: {0}")]
    DataUnavailable(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Unknown plan name
    #[error("Invalid plan: {0}. Expected one of pro, max5, max20, custom_max")]
    InvalidPlan(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CcmonitorError {
    /// Whether this error means the usage source had nothing to offer.
    ///
    /// The live monitor keeps polling on these instead of exiting.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(
            self,
            Self::DataUnavailable(_) | Self::NoClaudeDirectory | Self::Io(_)
        )
    }
}

/// Convenience type alias for Results in ccmonitor
///
/// # Example
///
/// ```
/// use ccmonitor_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, CcmonitorError>;
