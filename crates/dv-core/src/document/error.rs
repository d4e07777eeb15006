use thiserror::Error;

/// Failures surfaced by the Document Cache.
///
/// Reads never produce these: corrupt or missing persisted state degrades to
/// an empty result. Writes always surface `Storage` so callers cannot assume
/// a save succeeded silently.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Bad input. Not retried, surfaced to the user immediately. The message
    /// carries the document kind label and file name so the user can retry
    /// manually.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Persistence failure. The operation fails with no partial state left
    /// behind.
    #[error("storage error: {0}")]
    Storage(String),
}
