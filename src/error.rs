// Error types for the sync layer.
// Classifies document-store, geocoder, and persistence failures for retry decisions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Batched write failed: {0}")]
    WriteFailed(#[source] Box<SyncError>),

    #[error("A sync run is already in progress")]
    AlreadyRunning,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Whether this error signals a quota or rate-limit rejection.
    pub fn is_quota(&self) -> bool {
        match self {
            SyncError::QuotaExceeded(_) => true,
            SyncError::Api { status: 429, .. } => true,
            SyncError::Api { message, .. } | SyncError::Other(message) => {
                mentions_quota(message)
            }
            SyncError::Http(e) => e.status().is_some_and(|s| s.as_u16() == 429),
            _ => false,
        }
    }

    /// Whether this error is a network or timeout failure worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Timeout(_) | SyncError::Network(_) => true,
            SyncError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

fn mentions_quota(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("resource_exhausted") || lower.contains("quota exceeded")
}

pub type Result<T> = std::result::Result<T, SyncError>;
