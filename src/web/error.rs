//! API errors for the gymdesk web API.
//!
//! Every failure a handler can produce is one [`ApiError`] variant. The
//! response body is `{"error": {"code", "message", "details"?}}`, and the
//! messages for the authentication failures are fixed so they never reveal
//! which check failed.

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::GymError;

/// Machine-readable error code in the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    ValidationError,
    TooManyRequests,
    InternalError,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<HashMap<String, Vec<String>>>,
}

/// An error returned by a gymdesk handler or extractor.
#[derive(Debug)]
pub enum ApiError {
    /// The body was not JSON or did not match the request shape.
    MalformedBody,
    /// Field-level validation failures, keyed by field name.
    Validation(HashMap<String, Vec<String>>),
    /// Login rejected. Same answer for an unknown email and a wrong password.
    InvalidCredentials,
    /// Missing, expired, forged or orphaned session.
    Unauthenticated,
    /// Valid session without the required capability.
    Forbidden,
    /// Too many login attempts from one client.
    RateLimited,
    /// Server-side failure. The message is safe to show; details are logged.
    Internal(&'static str),
}

impl ApiError {
    /// Collect `validator` failures into a [`ApiError::Validation`].
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .map(|(field, field_errors)| {
                let messages = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid value for {field}"))
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        ApiError::Validation(details)
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::MalformedBody => ErrorCode::BadRequest,
            ApiError::Validation(_) => ErrorCode::ValidationError,
            ApiError::InvalidCredentials | ApiError::Unauthenticated => ErrorCode::Unauthorized,
            ApiError::Forbidden => ErrorCode::Forbidden,
            ApiError::RateLimited => ErrorCode::TooManyRequests,
            ApiError::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::MalformedBody => "Invalid request body",
            ApiError::Validation(_) => "Validation failed",
            ApiError::InvalidCredentials => "Invalid email or password",
            ApiError::Unauthenticated => "Unauthenticated",
            ApiError::Forbidden => "Forbidden",
            ApiError::RateLimited => "Too many login attempts. Please try again later.",
            ApiError::Internal(message) => *message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        let message = self.message().to_string();
        let details = match self {
            ApiError::Validation(details) => Some(details),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };
        (code.status_code(), Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<GymError> for ApiError {
    fn from(err: GymError) -> Self {
        match err {
            GymError::Auth(_) => ApiError::Unauthenticated,
            GymError::Permission(_) => ApiError::Forbidden,
            err => {
                tracing::error!("Internal error: {}", err);
                ApiError::Internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_per_variant() {
        let cases = [
            (ApiError::MalformedBody, StatusCode::BAD_REQUEST),
            (ApiError::Validation(HashMap::new()), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ApiError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden, StatusCode::FORBIDDEN),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.code().status_code(), status, "{err}");
        }
    }

    #[tokio::test]
    async fn test_uniform_auth_bodies() {
        let (status, body) = body_json(ApiError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["message"], "Unauthenticated");
        assert!(body["error"].get("details").is_none());

        let (_, body) = body_json(ApiError::InvalidCredentials).await;
        assert_eq!(body["error"]["message"], "Invalid email or password");

        let (_, body) = body_json(ApiError::Forbidden).await;
        assert_eq!(body["error"]["code"], "FORBIDDEN");
        assert_eq!(body["error"]["message"], "Forbidden");
    }

    #[test]
    fn test_from_gym_error() {
        let err: ApiError = GymError::Auth("token expired".to_string()).into();
        assert!(matches!(err, ApiError::Unauthenticated));

        let err: ApiError = GymError::Permission("canViewLogs".to_string()).into();
        assert!(matches!(err, ApiError::Forbidden));

        let err: ApiError = GymError::Database("disk I/O error".to_string()).into();
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert!(!err.message().contains("disk"));
    }

    #[test]
    fn test_repository_errors_stay_internal() {
        let err: ApiError = GymError::NotFound("user".to_string()).into();
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert!(!err.message().contains("user"));

        let err: ApiError = GymError::Conflict("email".to_string()).into();
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert!(!err.message().contains("email"));
    }

    #[tokio::test]
    async fn test_validation_details_in_body() {
        let mut details = HashMap::new();
        details.insert("email".to_string(), vec!["Invalid format".to_string()]);

        let (status, body) = body_json(ApiError::Validation(details)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Validation failed");
        assert_eq!(body["error"]["details"]["email"][0], "Invalid format");
    }
}
