//! Error taxonomy shared by record-store operations, the dispatcher and the HTTP layer.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::sms::SmsError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before any write was attempted.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The user's phone number is missing or unverified.
    #[error("{0}")]
    NotConfigured(String),

    /// Server-side configuration is missing (gateway credentials).
    #[error("{0}")]
    Config(String),

    /// Carries an `ERR_DATABASE_*` message, already prefixed.
    #[error("{0}")]
    Database(String),

    #[error("SMS gateway error: {0}")]
    Gateway(#[from] SmsError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::NotConfigured(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
