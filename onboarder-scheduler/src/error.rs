//! Error types for pipeline submission

use std::time::Duration;
use thiserror::Error;

/// Result type alias for submission operations
pub type Result<T> = std::result::Result<T, SubmissionError>;

/// Errors that can occur when handing a pipeline to the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Scheduler unreachable, overloaded or slow; the caller may retry with backoff
    #[error("scheduler temporarily unavailable: {message}")]
    Transient { message: String },

    /// Scheduler refused the workload; retrying will not help
    #[error("scheduler rejected the pipeline: {message}")]
    Permanent { message: String },
}

impl SubmissionError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent {
            message: message.into(),
        }
    }

    /// The deadline passed before the scheduler answered
    ///
    /// Whether the workload was created is unknown.
    pub fn timed_out(timeout: Duration) -> Self {
        Self::transient(format!(
            "no response within {:?}; the workload may or may not exist",
            timeout
        ))
    }

    /// Stable tag for this error class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transient { .. } => "transient",
            Self::Permanent { .. } => "permanent",
        }
    }

    /// Check if the caller may retry the submission
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let transient = SubmissionError::transient("connection refused");
        assert!(transient.is_retryable());
        assert_eq!(transient.kind(), "transient");

        let permanent = SubmissionError::permanent("forbidden");
        assert!(!permanent.is_retryable());
        assert_eq!(permanent.kind(), "permanent");
    }

    #[test]
    fn test_timeout_is_transient() {
        let err = SubmissionError::timed_out(Duration::from_secs(10));
        assert!(matches!(err, SubmissionError::Transient { ref message } if message.contains("10s")));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("10s"));
    }
}
