//! Error type for backend API calls.

/// Errors returned by [`crate::BackendClient`].
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP request failed (connect, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-success status.
    #[error("backend error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body (or a placeholder when unreadable).
        message: String,
    },
}
