//! Error type for Gemini API calls.

/// Errors returned by [`crate::GeminiClient`].
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP request failed (connect, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description from the response body.
        message: String,
        /// Provider-specific error code, when present.
        code: Option<String>,
    },

    /// The response contained no usable candidate text.
    #[error("empty response: no candidate text")]
    EmptyResponse,
}
