//! Feed client error types.

/// Errors from the upstream feed HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Upstream returned an error status code
    #[error("feed error {status}: {message}")]
    Api { status: u16, message: String },

    /// Local fixture could not be read
    #[error("fixture error: {0}")]
    Fixture(String),

    /// Feature not configured or not available
    #[error("not configured: {0}")]
    NotConfigured(String),
}
