use thiserror::Error;

/// Failures from the upstream API collaborator, classified for retry.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-layer failure (connect refused, DNS, broken transport).
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// Non-2xx response status.
    #[error("server returned status {0}")]
    Status(u16),

    /// The response body could not be decoded into the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),
}
