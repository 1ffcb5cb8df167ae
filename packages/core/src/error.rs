use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::hours::HoursError;

/// Unified application error.
///
/// Config, upstream and parameter failures all end up here so that the
/// HTTP layer can map them to a status code in one place.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Param(String),

    #[error(transparent)]
    Hours(#[from] HoursError),
}

impl AppError {
    pub fn missing_location_codes() -> Self {
        AppError::Param("No location codes provided".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Param(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Param(msg) => msg.clone(),
            other => {
                tracing::warn!("Failed to fetch locations by code: {}", other);
                "Failed to fetch locations by code.".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
