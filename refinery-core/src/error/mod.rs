//! Core error types for refinery

use thiserror::Error;

/// Main error type for refinery operations
#[derive(Error, Debug)]
pub enum RefineryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A query has alignments but no self-alignment score, so its score ratio is undefined
    #[error("Missing self-score for query '{0}'")]
    MissingSelfScore(String),

    #[error("Aligner error: {0}")]
    Aligner(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for refinery operations
pub type RefineryResult<T> = Result<T, RefineryError>;

impl RefineryError {
    /// Process exit code used by the command-line front end
    pub fn exit_code(&self) -> i32 {
        match self {
            RefineryError::Configuration(_) | RefineryError::MissingSelfScore(_) => 2,
            RefineryError::Io(_) => 3,
            RefineryError::Parse(_) => 4,
            RefineryError::Aligner(_) => 5,
            _ => 1,
        }
    }
}

// Conversion implementations for common error types
impl From<serde_json::Error> for RefineryError {
    fn from(err: serde_json::Error) -> Self {
        RefineryError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for RefineryError {
    fn from(err: anyhow::Error) -> Self {
        RefineryError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let io_error = RefineryError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(format!("{}", io_error).contains("IO error"));

        let config_error = RefineryError::Configuration("missing field".to_string());
        assert_eq!(format!("{}", config_error), "Configuration error: missing field");

        let parse_error = RefineryError::Parse("line 3: expected 12 fields".to_string());
        assert_eq!(format!("{}", parse_error), "Parsing error: line 3: expected 12 fields");

        let self_score = RefineryError::MissingSelfScore("locus_7".to_string());
        assert_eq!(format!("{}", self_score), "Missing self-score for query 'locus_7'");

        let aligner = RefineryError::Aligner("blastn exited with status 2".to_string());
        assert_eq!(format!("{}", aligner), "Aligner error: blastn exited with status 2");

        let cancelled = RefineryError::Cancelled;
        assert_eq!(format!("{}", cancelled), "Operation cancelled");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: RefineryError = io_err.into();

        match err {
            RefineryError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_result: Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{invalid json}");

        let err: RefineryError = parse_result.unwrap_err().into();
        match err {
            RefineryError::Serialization(msg) => assert!(msg.contains("key must be a string")),
            _ => panic!("Expected Serialization error variant"),
        }
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let err: RefineryError = anyhow::anyhow!("custom error message").into();

        match err {
            RefineryError::Other(msg) => assert_eq!(msg, "custom error message"),
            _ => panic!("Expected Other error variant"),
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RefineryError::Configuration(String::new()).exit_code(), 2);
        assert_eq!(RefineryError::MissingSelfScore("q".into()).exit_code(), 2);
        assert_eq!(
            RefineryError::Io(io::Error::new(io::ErrorKind::Other, "x")).exit_code(),
            3
        );
        assert_eq!(RefineryError::Parse(String::new()).exit_code(), 4);
        assert_eq!(RefineryError::Aligner(String::new()).exit_code(), 5);
        assert_eq!(RefineryError::Cancelled.exit_code(), 1);
    }

    #[test]
    fn test_error_is_type_checking() {
        let missing = RefineryError::MissingSelfScore("q1".to_string());
        let not_found = RefineryError::NotFound("q1".to_string());

        assert!(matches!(missing, RefineryError::MissingSelfScore(_)));
        assert!(!matches!(not_found, RefineryError::MissingSelfScore(_)));
    }
}
