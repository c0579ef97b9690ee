//! Error types for the logging core.

use std::path::PathBuf;

use thiserror::Error;

use crate::identity::LoggerIdentity;

/// A level string that does not name a known severity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level: {0}")]
pub struct UnknownLevel(pub String);

/// Errors raised while building a sink.
#[derive(Debug, Error)]
pub enum SinkConstructionError {
    /// The configured output path cannot name a log file.
    #[error("invalid log path {path:?}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// The rolling file appender could not be opened.
    #[error("failed to open log file appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    /// A custom factory refused to build the sink.
    #[error("sink rejected: {0}")]
    Rejected(String),
}

/// A sink rebuild that failed for one identity during a refresh.
#[derive(Debug, Error)]
#[error("{identity}: {source}")]
pub struct IdentityFailure {
    pub identity: LoggerIdentity,
    #[source]
    pub source: SinkConstructionError,
}

/// Refresh outcome when at least one identity kept its previous sink.
#[derive(Debug, Error)]
#[error("{} logger(s) kept their previous sink after refresh", failures.len())]
pub struct RefreshError {
    /// Levels still applied even though some sinks failed.
    pub levels_applied: usize,
    /// Sinks that were swapped successfully.
    pub sinks_rebuilt: usize,
    pub failures: Vec<IdentityFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SinkConstructionError::InvalidPath {
            path: PathBuf::from("/"),
            reason: "no file name".into(),
        };
        assert_eq!(err.to_string(), "invalid log path \"/\": no file name");

        let failure = IdentityFailure {
            identity: LoggerIdentity::new("[Auth]", "chain1"),
            source: SinkConstructionError::Rejected("disk full".into()),
        };
        assert_eq!(failure.to_string(), "[Auth]/chain1: sink rejected: disk full");

        let err = RefreshError {
            levels_applied: 2,
            sinks_rebuilt: 1,
            failures: vec![failure],
        };
        assert!(err.to_string().starts_with("1 logger(s)"));
    }
}
