//! API error handling for the Sharebox Web API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::ShareboxError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Unauthorized (401).
    Unauthorized,
    /// Forbidden (403).
    Forbidden,
    /// Not found (404).
    NotFound,
    /// Conflict (409).
    Conflict,
    /// Validation error (422) - for field-level validation errors.
    ValidationError,
    /// Unprocessable entity (422).
    UnprocessableEntity,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Field-level validation error details (only present for validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with field-level details.
    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Error code of this error.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Create an unprocessable entity error.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnprocessableEntity, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a validation error with field-level details.
    pub fn validation(details: HashMap<String, Vec<String>>) -> Self {
        Self::with_details(ErrorCode::ValidationError, "Validation failed", details)
    }

    /// Create a validation error from validator::ValidationErrors.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut details: HashMap<String, Vec<String>> = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            details.insert(field.to_string(), messages);
        }

        Self::validation(details)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ShareboxError> for ApiError {
    fn from(err: ShareboxError) -> Self {
        match err {
            ShareboxError::InvalidCredentials => {
                ApiError::unauthorized("Invalid username or password")
            }
            ShareboxError::Unauthenticated => ApiError::unauthorized("Authentication required"),
            ShareboxError::Forbidden(msg) => ApiError::forbidden(msg),
            ShareboxError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            ShareboxError::PathTraversal(path) => {
                // Same body as a missing file
                tracing::warn!(path = %path, "path traversal attempt rejected");
                ApiError::not_found("file not found")
            }
            ShareboxError::DuplicateUsername(username) => {
                ApiError::conflict(format!("Username already exists: {username}"))
            }
            ShareboxError::DirectoryConflict(directory) => ApiError::conflict(format!(
                "Directory overlaps another account's collection: {directory}"
            )),
            ShareboxError::LastAdmin => ApiError::conflict(
                "Cannot delete the last admin account; create another admin first",
            ),
            ShareboxError::MissingDirectory => {
                ApiError::unprocessable("A directory is required for regular accounts")
            }
            ShareboxError::Validation(msg) => ApiError::unprocessable(msg),
            ShareboxError::Password(e) => ApiError::unprocessable(e.to_string()),
            err @ (ShareboxError::Database(_)
            | ShareboxError::DatabaseConnection(_)
            | ShareboxError::Io(_)
            | ShareboxError::Config(_)) => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PasswordError;

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::ValidationError.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sharebox_error_mapping() {
        let cases = [
            (ShareboxError::InvalidCredentials, ErrorCode::Unauthorized),
            (ShareboxError::Unauthenticated, ErrorCode::Unauthorized),
            (
                ShareboxError::Forbidden("admin access required".to_string()),
                ErrorCode::Forbidden,
            ),
            (
                ShareboxError::NotFound("account".to_string()),
                ErrorCode::NotFound,
            ),
            (
                ShareboxError::DuplicateUsername("alice".to_string()),
                ErrorCode::Conflict,
            ),
            (
                ShareboxError::DirectoryConflict("alice".to_string()),
                ErrorCode::Conflict,
            ),
            (ShareboxError::LastAdmin, ErrorCode::Conflict),
            (
                ShareboxError::MissingDirectory,
                ErrorCode::UnprocessableEntity,
            ),
            (
                ShareboxError::Password(PasswordError::Empty),
                ErrorCode::UnprocessableEntity,
            ),
            (
                ShareboxError::Database("locked".to_string()),
                ErrorCode::InternalError,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(ApiError::from(err).code(), code);
        }
    }

    #[test]
    fn test_traversal_looks_like_missing_file() {
        let traversal = ApiError::from(ShareboxError::PathTraversal("../x".to_string()));
        let missing = ApiError::from(ShareboxError::NotFound("file".to_string()));

        assert_eq!(traversal.code(), missing.code());
        assert_eq!(traversal.message(), missing.message());
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let err = ApiError::from(ShareboxError::Database("secret detail".to_string()));
        assert!(!err.message().contains("secret"));
    }

    #[test]
    fn test_validation_error() {
        let mut details = HashMap::new();
        details.insert("username".to_string(), vec!["Too long".to_string()]);

        let err = ApiError::validation(details);
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Validation failed");
        assert_eq!(
            err.details.unwrap().get("username").unwrap(),
            &vec!["Too long".to_string()]
        );
    }
}
