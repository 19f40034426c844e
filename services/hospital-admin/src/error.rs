//! Error types for the hospital administration console

/// Errors that can occur while talking to a hospital service or editing local state
#[derive(Debug, thiserror::Error)]
pub enum HospitalError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Shape(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state for operation: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HospitalError {
    /// Generic non-2xx error, worded the way the dashboard has always shown it
    pub fn http_status(status: u16) -> Self {
        HospitalError::Http {
            status,
            message: format!("HTTP error! status: {}", status),
        }
    }
}

/// Result type alias for hospital console operations
pub type Result<T> = std::result::Result<T, HospitalError>;
