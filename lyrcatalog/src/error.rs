//! Error types for the music catalog client

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur when querying the music catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog returned a non-success status
    #[error("Catalog API error (status {0})")]
    Api(u16),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
