//! Error types for the Revista server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
///
/// Every variant renders as `{ "ok": false, "error": "<message>" }`, the
/// contract the editor relies on.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Método no permitido")]
    MethodNotAllowed,

    #[error("No encontrado")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Server-side failure whose message is safe to show to the editor
    #[error("{0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg.clone()
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                "Error de entrada/salida".to_string()
            }
            other => {
                tracing::debug!(status = %status, "Request rejected: {}", other);
                other.to_string()
            }
        };

        let body = Json(ErrorResponse {
            ok: false,
            error: message,
        });

        (status, body).into_response()
    }
}

/// Fallback for routes that only accept POST
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
