use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(Error::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Core(Error::InsufficientData { .. }) => StatusCode::BAD_REQUEST,
            AppError::Core(Error::NotConnected) => StatusCode::CONFLICT,
            AppError::Core(Error::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Core(Error::Configuration(_))
            | AppError::Core(Error::Settings(_))
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts `AppError` into a JSON error response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed.");
        } else {
            tracing::debug!(error = %self, "Request rejected.");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
