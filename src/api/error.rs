// src/api/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::error::WatchError;

/// Standard API error response format
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
}

impl ApiError {
    /// Create a new internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            error_code: Some("INTERNAL_ERROR".to_string()),
        }
    }

    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::BAD_REQUEST,
            error_code: Some("BAD_REQUEST".to_string()),
        }
    }

    /// Create a new unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::UNAUTHORIZED,
            error_code: Some("UNAUTHORIZED".to_string()),
        }
    }

    /// Create a new forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::FORBIDDEN,
            error_code: Some("FORBIDDEN".to_string()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<WatchError> for ApiError {
    fn from(err: WatchError) -> Self {
        error!("Watch operation failed: {}", err);
        match err {
            WatchError::Persistence(_) | WatchError::Json(_) => {
                ApiError::internal("Failed to persist watch state")
            }
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response_json = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16()
        });

        if let Some(error_code) = self.error_code {
            response_json["error_code"] = json!(error_code);
        }

        (self.status_code, Json(response_json)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Helper function for missing parameter errors
pub fn missing_param_error(param_name: &str) -> ApiError {
    ApiError::bad_request(format!("Missing required parameter: {param_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let error = ApiError::internal("Test error");
        assert_eq!(error.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Test error");
    }

    #[test]
    fn test_from_watch_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only fs");
        let error: ApiError = WatchError::Persistence(io_err).into();
        assert_eq!(error.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Failed to persist watch state");
    }

    #[test]
    fn test_missing_param() {
        let error = missing_param_error("room");
        assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
        assert!(error.message.contains("room"));
    }
}
