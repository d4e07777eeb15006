use thiserror::Error;

/// Failures opening a delegated browsing context. Both carry an actionable
/// message for the user.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid url: {0} (an absolute http(s) url is required)")]
    InvalidUrl(String),

    #[error("the browser refused to open the external window; allow pop-ups for this site and try again")]
    PopupBlocked,
}
