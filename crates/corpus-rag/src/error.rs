//! Error types for the retrieve-and-query service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::characters::ContractViolation;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fixed message returned when structured output cannot be validated
pub const CHARACTER_PARSE_MESSAGE: &str = "Failed to parse character data";

/// Service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Request used a method other than POST
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Malformed or missing request fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// The language model or embedding provider call failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Structured-mode output did not honor the character record contract
    #[error("Failed to parse character data: {0}")]
    CharacterParse(#[from] ContractViolation),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an upstream error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// HTTP status the error maps to at the boundary
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::CharacterParse(_) | Error::Config(_) | Error::Io(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Upstream(err.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for Error {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Error::MethodNotAllowed => "Method not allowed".to_string(),
            Error::Validation(msg) | Error::Upstream(msg) => msg.clone(),
            Error::CharacterParse(violation) => {
                tracing::error!("{}: {}", CHARACTER_PARSE_MESSAGE, violation);
                CHARACTER_PARSE_MESSAGE.to_string()
            }
            Error::Config(msg) | Error::Internal(msg) => {
                tracing::error!("Request failed: {}", msg);
                msg.clone()
            }
            Error::Io(err) => {
                tracing::error!("Request failed: {}", err);
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
