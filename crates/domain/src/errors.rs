//! Error types used throughout the service

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Duebell
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum DuebellError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DuebellError {
    /// Stable label suitable for metrics and structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Transport(_) => "transport",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Duebell operations
pub type Result<T> = std::result::Result<T, DuebellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = DuebellError::Transport("smtp relay refused".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Transport");
        assert_eq!(json["message"], "smtp relay refused");
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(DuebellError::Database(String::new()).label(), "database");
        assert_eq!(DuebellError::NotFound(String::new()).label(), "not_found");
    }
}
