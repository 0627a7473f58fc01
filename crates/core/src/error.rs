//! Core Error Types
//!
//! Defines the foundational error types used across the Verdict workspace.
//! These error types are dependency-free (only thiserror + std) to keep the
//! core crate lightweight.

use thiserror::Error;

/// Core error type for the Verdict workspace.
///
/// The triage engine is built to degrade gracefully: classification misses,
/// example-list overflow, missing remediation entries, and unavailable
/// resource metrics are all local, non-propagating conditions. The only
/// condition modeled as fatal is a report that could not be persisted
/// (`ReportWrite`); a silently-missing report is worse than a late one.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Parse errors (config files, malformed pattern rules)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failure to persist a report file, always surfaced to the caller
    #[error("Report write failure: {0}")]
    ReportWrite(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a report-write error
    pub fn report_write(msg: impl Into<String>) -> Self {
        Self::ReportWrite(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::config("missing output dir");
        assert_eq!(err.to_string(), "Configuration error: missing output dir");
    }

    #[test]
    fn test_error_conversion() {
        let err = CoreError::report_write("disk full");
        let msg: String = err.into();
        assert!(msg.contains("Report write failure"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = CoreError::parse("bad verdict.toml");
        assert_eq!(err.to_string(), "Parse error: bad verdict.toml");
    }

}
