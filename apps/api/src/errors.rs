use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::onboarding::form::{Field, FieldErrors};
use crate::waitlist::gateway::GatewayError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every error body has the shape
/// `{ "success": false, "error": <message>, "code": <CODE> }`, plus `field`
/// for conflicts tied to one input and `fields` for validation failures.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Please check your input")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{message}")]
    Conflict {
        code: &'static str,
        field: Option<Field>,
        message: String,
    },

    /// A downstream failure whose message is safe and useful to return.
    #[error("{0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut extra = Map::new();

        let (status, code, message) = match &self {
            AppError::Validation(errors) => {
                extra.insert("fields".to_string(), json!(errors));
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                self.to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
            ),
            AppError::Conflict {
                code,
                field,
                message,
            } => {
                if let Some(field) = field {
                    extra.insert("field".to_string(), json!(field));
                }
                (StatusCode::CONFLICT, *code, message.clone())
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR", msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(false));
        body.insert("error".to_string(), Value::String(message));
        body.insert("code".to_string(), Value::String(code.to_string()));
        body.extend(extra);

        (status, Json(Value::Object(body))).into_response()
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::DuplicateEmail => AppError::Conflict {
                code: "DUPLICATE_EMAIL",
                field: Some(Field::Email),
                message: err.to_string(),
            },
            GatewayError::NotFound(_) => AppError::NotFound(err.to_string()),
            GatewayError::OutOfOrder { .. } => AppError::Conflict {
                code: "OUT_OF_ORDER",
                field: None,
                message: err.to_string(),
            },
            GatewayError::Invalid(errors) => AppError::Validation(errors),
            // Already logged where it happened; the message carries no internals.
            GatewayError::Backend(msg) => AppError::Storage(msg),
        }
    }
}
