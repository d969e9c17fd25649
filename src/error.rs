use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::pipeline::BatchPlanError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::InvalidTransition(msg) => (StatusCode::CONFLICT, msg),
            Error::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Database(err) => {
                tracing::error!(error = ?err, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            Error::Xlsx(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Export error: {}", err)),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::Conflict(db.message().to_string())
            }
            other => Error::Database(other),
        }
    }
}

impl From<BatchPlanError> for Error {
    fn from(err: BatchPlanError) -> Self {
        match err {
            BatchPlanError::NoTransition => Error::InvalidTransition(err.to_string()),
            BatchPlanError::UnspecifiedFilter | BatchPlanError::EmptySelection => {
                Error::BadRequest(err.to_string())
            }
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for Error {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}
