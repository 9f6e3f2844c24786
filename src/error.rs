// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::services::provider::ProviderError;

/// Shown to callers for every provider failure; the cause only goes to the logs.
pub const PROVIDER_FAILURE_MESSAGE: &str = "Could not get reply from AI";

pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "request body too large";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE_MESSAGE),
            AppError::Provider(_) => (StatusCode::INTERNAL_SERVER_ERROR, PROVIDER_FAILURE_MESSAGE),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
