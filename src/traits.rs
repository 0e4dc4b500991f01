use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Longest failure reason stored in an error record.
pub const MAX_ERROR_LEN: usize = 100;

/// Per-target fetch failure. Always recoverable: it becomes an error record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("timeout after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to read body: {0}")]
    Body(String),
}

impl FetchError {
    /// Short reason stored on the record, bounded by [`MAX_ERROR_LEN`].
    pub fn reason(&self) -> String {
        let reason = match self {
            FetchError::Timeout(_) => "timeout".to_string(),
            FetchError::Status(code) => format!("HTTP {code}"),
            FetchError::Network(msg) | FetchError::Body(msg) => msg.clone(),
        };
        truncate_chars(&reason, MAX_ERROR_LEN)
    }
}

/// Errors that end the whole run.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("index document unavailable at {url}: {source}")]
    IndexUnavailable {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("index document at {0} lists no harvestable targets")]
    EmptyIndex(String),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error("failed to write output to {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("output document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] FetchError),
}

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("checkpoint I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("checkpoint {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` once and returns the decoded body.
    ///
    /// Implementations enforce their own deadline and must never retry.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Truncates to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(FetchError::Timeout(Duration::from_secs(6)).reason(), "timeout");
        assert_eq!(FetchError::Status(404).reason(), "HTTP 404");
        assert_eq!(
            FetchError::Network("connection refused".into()).reason(),
            "connection refused"
        );
    }

    #[test]
    fn test_reason_is_bounded() {
        let long = "x".repeat(500);
        assert_eq!(FetchError::Network(long).reason().chars().count(), MAX_ERROR_LEN);
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
