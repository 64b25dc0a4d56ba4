//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rollcall_core::CoreError;
use serde_json::json;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while serving a request.
#[derive(Error, Debug)]
pub enum ServerError {
    /// A store or directory operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request body could not be read as JSON.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error while binding or serving.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Core(CoreError::Validation { .. }) | ServerError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Core(CoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ServerError::Core(CoreError::Duplicate { .. }) => StatusCode::CONFLICT,
            ServerError::Core(_) | ServerError::Internal(_) | ServerError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    /// Message shown to the caller. Server errors are not described.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::Core(CoreError::Validation { message })
            | ServerError::Core(CoreError::Duplicate { message })
            | ServerError::InvalidRequest(message) => message.clone(),
            ServerError::Core(CoreError::NotFound { .. }) => "Record not found".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert_eq!(
            ServerError::from(CoreError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(CoreError::not_found("students", "x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::from(CoreError::duplicate("taken")).status(),
            StatusCode::CONFLICT
        );
        assert!(ServerError::from(CoreError::invalid_format("root")).is_server_error());
        assert!(ServerError::InvalidRequest("bad".into()).is_client_error());
        assert!(ServerError::Internal("oops".into()).is_server_error());
    }

    #[test]
    fn server_errors_hide_detail() {
        let err = ServerError::from(CoreError::invalid_format("root must be an object"));
        assert_eq!(err.public_message(), "Internal server error");

        let err = ServerError::from(CoreError::validation("Collection name is required"));
        assert_eq!(err.public_message(), "Collection name is required");
    }
}
