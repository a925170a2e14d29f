//! Error types for the chat backend client

/// Result type alias for chat backend operations
pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors that can occur when talking to the chat-completion backend
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend returned a non-success status
    #[error("Chat backend error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl ChatError {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
