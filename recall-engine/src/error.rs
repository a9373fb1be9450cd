//! Error types for recall-engine

use thiserror::Error;

/// Errors that can occur when talking to the memory engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// HTTP transport error (connection, timeout, TLS)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Engine returned a non-success status
    #[error("Engine API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prompt template file could not be read
    #[error("Prompt template error: {0}")]
    PromptTemplate(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    /// Create an API error from a status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = EngineError::api(404, "memory not found");
        assert_eq!(err.to_string(), "Engine API error (404): memory not found");
    }

    #[test]
    fn test_config_error_display() {
        let err = EngineError::config("DATABASE_URL is required for pgvector");
        assert_eq!(
            err.to_string(),
            "Configuration error: DATABASE_URL is required for pgvector"
        );
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: EngineError = json_err.into();
        match err {
            EngineError::Json(_) => {}
            _ => panic!("Expected EngineError::Json"),
        }
    }
}
