//! # AppError
//!
//! Centralized error handling for the board.
//! Every gateway failure is one of these, mapped to an HTTP-like status.

use thiserror::Error;

/// The primary error type for all rb-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Resource not found (e.g., Post, Reply, or an unknown route)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., missing username, reserved name, bad order payload)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Missing session marker or rejected password
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failure that is not the caller's fault (e.g., a response failed to serialize)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        AppError::NotFound(entity.to_string(), id.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    /// The HTTP-like status carried by the error envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(..) => 404,
            AppError::ValidationError(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::ValidationError(format!("malformed payload: {e}"))
    }
}

/// A specialized Result type for board logic.
pub type Result<T> = std::result::Result<T, AppError>;
