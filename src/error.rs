//! Error taxonomy for the fetch and ingest boundaries.
//!
//! Every error here is contained at the per-source or per-article boundary
//! and degrades to "no contribution"; nothing in this module ever aborts an
//! aggregation run.

use thiserror::Error;

/// Failures observed while fetching one remote resource.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),
}

impl FetchError {
    /// All fetch failures are retried with backoff up to the attempt budget.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Failures observed while turning a fetched document into entries.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The document parsed but carried no entries and no feed-level
    /// metadata. Retryable: some endpoints serve empty bodies transiently.
    #[error("feed is empty or carries no metadata")]
    Empty,

    /// The parser rejected the document outright, even after XML cleanup.
    /// Terminal: retrying the same bytes cannot succeed.
    #[error("malformed feed document: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_errors_are_retryable() {
        assert!(FetchError::Timeout.is_retryable());
        assert!(FetchError::Status(503).is_retryable());
        assert!(FetchError::Network("connection reset".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(FetchError::Status(404).to_string(), "HTTP status 404");
        assert_eq!(IngestError::Empty.to_string(), "feed is empty or carries no metadata");
    }
}
