//! Error handling for the API server
//!
//! Every handler returns `ApiResult<T>`. Errors render as JSON:
//!
//! ```json
//! { "error": "User not found", "code": "not_found" }
//! ```
//!
//! Internal failures are logged with their cause and rendered with a
//! generic message only.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use vibeagent_shared::{directory::DirectoryError, store::StoreError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned for every internal failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Bad request (400) with per-field details
    ValidationError {
        message: String,
        details: Vec<ValidationErrorDetail>,
    },

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500); the message is logged, never returned
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code (e.g. "not_found")
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Builds a validation error from `validator` output
    pub fn validation(message: impl Into<String>, errors: &validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} failed {} validation", error.code)),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError {
            message: message.into(),
            details,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError { message, details } => {
                write!(f, "Validation failed: {} ({} errors)", message, details.len())
            }
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::ValidationError { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                Some(details),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    INTERNAL_ERROR_MESSAGE.to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

/// Store failures are always internal
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::InternalError(format!("Store error: {}", err))
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::InvalidPhone(_) => ApiError::BadRequest("Invalid phone number".to_string()),
            DirectoryError::UserNotFound(_) => ApiError::NotFound("User not found".to_string()),
            DirectoryError::Store(err) => err.into(),
        }
    }
}

/// Malformed or non-JSON request bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibeagent_shared::phone::PhoneError;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, body) = render(ApiError::NotFound("Job not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Job not found");
        assert_eq!(body["code"], "not_found");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let err: ApiError = StoreError::NotAnObject.into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["code"], "internal_error");
    }

    #[tokio::test]
    async fn test_directory_errors_map_to_status() {
        let (status, body) = render(DirectoryError::InvalidPhone(PhoneError::Empty).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid phone number");

        let (status, body) =
            render(DirectoryError::UserNotFound("+11234567890".to_string()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request_with_details() {
        let err = ApiError::ValidationError {
            message: "Missing required fields".to_string(),
            details: vec![ValidationErrorDetail {
                field: "title".to_string(),
                message: "title is required".to_string(),
            }],
        };
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
        assert_eq!(body["details"][0]["field"], "title");
    }
}
