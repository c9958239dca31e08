// src/error.rs
// =============================================================================
// Error types shared by the crawler.
//
// Request-level errors (FetchError, AttemptError) are retried by the
// scheduler until the attempt budget runs out. Item-level errors (ItemError)
// only ever cost one product and never the rest of the page.
// =============================================================================

use thiserror::Error;

/// A fetch attempt that never produced a response
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure (connection refused, DNS, TLS, broken body)
    #[error("transport error: {0}")]
    Transport(String),

    /// The attempt did not finish within the per-request timeout
    #[error("timed out after {0} seconds")]
    Timeout(u64),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        FetchError::Transport(error.to_string())
    }
}

/// Why a single attempt at a request failed. Every variant is retryable.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(String),

    #[error("invalid response body: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to turn one listed item into an emitted record
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("malformed item: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("item {id} has an unusable url '{url}': {source}")]
    InvalidUrl {
        id: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("output sink rejected item: {0}")]
    Sink(#[from] SinkError),
}

/// Output sink failures
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
