// HTTP API Error Types
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::validation::FieldErrors;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError {
        message: String,
        field_errors: FieldErrors,
        values: Option<Value>,
    },
    BadRequest(String),

    // 401 Unauthorized
    AuthError {
        message: String,
        values: Option<Value>,
    },
    Unauthorized(String),

    // 404 Not Found
    NotFound {
        message: String,
        redirect: Option<String>,
    },

    // 409 Conflict
    Conflict(String),

    // 428 Precondition Required
    ConfirmationRequired(String),

    // 500 Internal Server Error
    OperationFailed(String),
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthError { .. } | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            ApiError::OperationFailed(_) | ApiError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::BadRequest(msg) => msg,
            ApiError::AuthError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound { message, .. } => message,
            ApiError::Conflict(msg) => msg,
            ApiError::ConfirmationRequired(msg) => msg,
            ApiError::OperationFailed(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::AuthError { .. } => "AUTH_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::ConfirmationRequired(_) => "CONFIRMATION_REQUIRED",
            ApiError::OperationFailed(_) => "OPERATION_FAILED",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        });
        match self {
            ApiError::ValidationError { field_errors, values, .. } => {
                body["field_errors"] = json!(field_errors);
                if let Some(values) = values {
                    body["values"] = values.clone();
                }
            }
            ApiError::AuthError { values: Some(values), .. } => {
                body["values"] = values.clone();
            }
            ApiError::NotFound { redirect: Some(redirect), .. } => {
                body["redirect"] = json!(redirect);
            }
            _ => {}
        }
        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_error(field_errors: FieldErrors) -> Self {
        ApiError::ValidationError {
            message: "Validation failed".to_string(),
            field_errors,
            values: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn auth_error(message: impl Into<String>) -> Self {
        ApiError::AuthError {
            message: message.into(),
            values: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
            redirect: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn confirmation_required(message: impl Into<String>) -> Self {
        ApiError::ConfirmationRequired(message.into())
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        ApiError::OperationFailed(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// Echo submitted values back so a failed form loses nothing
    pub fn with_values(self, submitted: Value) -> Self {
        match self {
            ApiError::ValidationError { message, field_errors, .. } => ApiError::ValidationError {
                message,
                field_errors,
                values: Some(submitted),
            },
            ApiError::AuthError { message, .. } => ApiError::AuthError {
                message,
                values: Some(submitted),
            },
            other => other,
        }
    }

    /// Where the caller should navigate when a record cannot be shown
    pub fn with_redirect(self, path: impl Into<String>) -> Self {
        match self {
            ApiError::NotFound { message, .. } => ApiError::NotFound {
                message,
                redirect: Some(path.into()),
            },
            other => other,
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::validation_error(errors)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::not_found(msg),
            StoreError::InvalidQuery(msg) => ApiError::bad_request(msg),
            StoreError::Constraint(msg) => {
                tracing::warn!("Constraint violation: {}", msg);
                ApiError::bad_request("Submitted values reference a record that does not exist")
            }
            StoreError::Conflict(msg) => ApiError::conflict(msg),
            StoreError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            StoreError::Decode(msg) => {
                tracing::error!("Row decode error: {}", msg);
                ApiError::operation_failed("The operation could not be completed")
            }
            StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::operation_failed("The operation could not be completed")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::EmailNotConfirmed
            | AuthError::EmailTaken
            | AuthError::InvalidCode => ApiError::auth_error(err.to_string()),
            AuthError::InvalidToken(_) | AuthError::TokenRevoked => ApiError::unauthorized(err.to_string()),
            AuthError::MissingSecret | AuthError::TokenGeneration(_) | AuthError::Hash(_) => {
                tracing::error!("Session provider error: {}", err);
                ApiError::internal_server_error("Authentication is temporarily unavailable")
            }
            AuthError::Store(store_err) => store_err.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {}", err);
        ApiError::internal_server_error("Failed to format response")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_carries_fields_and_values() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Name must be at least 2 characters");
        let err = ApiError::from(errors).with_values(json!({ "name": "A" }));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_json(),
            json!({
                "success": false,
                "error": "Validation failed",
                "code": "VALIDATION_ERROR",
                "field_errors": { "name": "Name must be at least 2 characters" },
                "values": { "name": "A" },
            })
        );
    }

    #[test]
    fn not_found_carries_redirect() {
        let err = ApiError::from(StoreError::NotFound("clients x not found".into())).with_redirect("/api/clients");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_json()["redirect"], json!("/api/clients"));
    }

    #[test]
    fn store_failures_are_generic() {
        let err = ApiError::from(StoreError::Decode("column \"secret\" missing".into()));
        assert_eq!(err.error_code(), "OPERATION_FAILED");
        assert!(!err.message().contains("secret"));
    }

    #[test]
    fn auth_failures_map_to_codes() {
        assert_eq!(ApiError::from(AuthError::InvalidCredentials).error_code(), "AUTH_ERROR");
        assert_eq!(ApiError::from(AuthError::TokenRevoked).error_code(), "UNAUTHORIZED");
        assert_eq!(ApiError::confirmation_required("x").status_code().as_u16(), 428);
    }
}
