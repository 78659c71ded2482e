//! HTTP error mapping (§7 error taxonomy).
//!
//! `ApplicationError` itself stays axum-free (shared:: is framework
//! agnostic); this wrapper is the one place that knows how each error kind
//! becomes a status code and JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::shared::error::{ApplicationError, DomainError, FilesystemError};

pub struct ApiError(pub ApplicationError);

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        Self(err)
    }
}

impl From<crate::shared::error::RepositoryError> for ApiError {
    fn from(err: crate::shared::error::RepositoryError) -> Self {
        Self(err.into())
    }
}

impl From<FilesystemError> for ApiError {
    fn from(err: FilesystemError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ApplicationError::Busy(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApplicationError::Filesystem(FilesystemError::PathNotFound(msg)) => {
                (StatusCode::NOT_FOUND, format!("not found: {msg}"))
            }
            ApplicationError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, msg.clone())
            }
            ApplicationError::Domain(DomainError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ApplicationError::Repository(err) if err.is_busy() => {
                tracing::error!("store busy: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "store is busy".to_string())
            }
            other => {
                tracing::error!("request failed: {other}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        (status, Json(json!({ "status": "error", "message": message }))).into_response()
    }
}
