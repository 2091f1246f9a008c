// Error handling module for the accounts API
// Maps credential failures and request validation errors onto HTTP responses

use crate::auth::error::AuthError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, warn};
use validator::ValidationErrors;

/// Main error type for the API
/// All handlers should return Result<T, ApiError>
#[derive(Debug)]
pub enum ApiError {
    /// Field-level validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    Validation(ValidationErrors),

    /// Request body was not valid JSON for the endpoint
    /// Maps to HTTP 400 Bad Request
    MalformedBody(JsonRejection),

    /// Failure reported by the credential core
    /// Status depends on the variant; internal details never reach the client
    Auth(AuthError),
}

/// Consistent error response structure
///
/// `error_code` is machine-readable, `message` is for humans.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_code: String,

    pub message: String,

    /// Field-level validation errors, omitted when None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, message: String, details: Option<serde_json::Value>) -> Self {
        Self {
            error_code: error_code.to_string(),
            message,
            details,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Infrastructure failures are logged with full detail at error level and
    /// answered with a generic message.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();

        match self {
            ApiError::Validation(errors) => {
                let details = validation_details(errors);
                debug!("Validation error: {}", details);
                (
                    status,
                    ErrorResponse::new(
                        "VALIDATION_ERROR",
                        "Request validation failed".to_string(),
                        Some(details),
                    ),
                )
            }
            ApiError::MalformedBody(rejection) => {
                let message = malformed_body_message(rejection);
                debug!("Malformed request body ({}): {}", rejection.status(), message);
                (
                    status,
                    ErrorResponse::new("VALIDATION_ERROR", message.to_string(), None),
                )
            }
            ApiError::Auth(err) if err.is_internal() => {
                error!("Internal error: {}", err);
                (
                    status,
                    ErrorResponse::new(
                        "INTERNAL_ERROR",
                        "An internal server error occurred".to_string(),
                        None,
                    ),
                )
            }
            ApiError::Auth(err) => {
                let code = match err {
                    AuthError::AlreadyExists(_) => "CONFLICT",
                    AuthError::NoOpChange(_) => "NO_OP_CHANGE",
                    AuthError::EmptyUpdate => "VALIDATION_ERROR",
                    AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
                    AuthError::TokenInvalid => "TOKEN_INVALID",
                    AuthError::TokenExpired => "TOKEN_EXPIRED",
                    AuthError::NotFound => "NOT_FOUND",
                    _ => "INTERNAL_ERROR",
                };
                if status == StatusCode::UNAUTHORIZED {
                    warn!("Unauthorized: {}", err);
                } else {
                    debug!("Request rejected: {}", err);
                }
                (status, ErrorResponse::new(code, err.to_string(), None))
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(err) => match err {
                AuthError::AlreadyExists(_) | AuthError::NoOpChange(_) => StatusCode::CONFLICT,
                AuthError::EmptyUpdate => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials
                | AuthError::TokenInvalid
                | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::NotFound => StatusCode::NOT_FOUND,
                AuthError::HashingError(_)
                | AuthError::StorageError(_)
                | AuthError::TokenSigningError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

/// Field errors as `{field: [{code, message?, params}]}`
///
/// The rejected input is dropped from `params`: validator records it under
/// `value`, and for credential fields that is a plaintext password.
fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    let fields: serde_json::Map<String, serde_json::Value> = errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let entries = field_errors
                .iter()
                .map(|err| {
                    let params: serde_json::Map<String, serde_json::Value> = err
                        .params
                        .iter()
                        .filter(|(name, _)| name.as_ref() != "value")
                        .map(|(name, value)| (name.to_string(), value.clone()))
                        .collect();
                    let mut entry = json!({ "code": err.code, "params": params });
                    if let Some(message) = &err.message {
                        entry["message"] = json!(message);
                    }
                    entry
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(entries))
        })
        .collect();

    serde_json::Value::Object(fields)
}

/// Client-facing text for a body that failed to parse
///
/// The extractor's own text can quote values from the body, so it is not echoed.
fn malformed_body_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::JsonDataError(_) => "Request body has missing or invalid fields",
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`"
        }
        _ => "Request body could not be read",
    }
}

/// Convert validator errors to ApiError
impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}
