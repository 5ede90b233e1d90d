use thiserror::Error;

/// Main error type for the similarity engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Candidate retrieval failed or timed out
    #[error("Property source '{source_name}' error: {message}")]
    Retrieval { source_name: String, message: String },

    /// Request was superseded by a newer one
    #[error("Request cancelled")]
    Cancelled,

    /// Reference price or floor area cannot be compared against
    #[error("Degenerate reference property: {0}")]
    DegenerateReference(String),

    /// Reference property unknown to the source
    #[error("Property not found: {0}")]
    NotFound(String),

    /// Threshold outside the accepted set
    #[error("Invalid acceptance threshold: {0} (expected 30, 40, 50 or 60)")]
    InvalidThreshold(u8),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    pub(crate) fn retrieval(source_name: &str, message: impl Into<String>) -> Self {
        EngineError::Retrieval {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    /// True when the error only means a newer request took over
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Cancelled)
    }
}

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError::Other(s)
    }
}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EngineError>;
