//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use inference_engine::InferenceError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Errors returned by the prediction handler
#[derive(Debug, Error)]
pub enum ApiError {
    /// The model failed to load at startup
    #[error("The model is not available.")]
    ModelUnavailable,

    /// The body is not valid JSON
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The body is JSON but not a valid prediction request
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Tensor construction or inference failed
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ModelUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidJson(_) | ApiError::Validation(_) | ApiError::Inference(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(status = status.as_u16(), "Prediction rejected: {}", self);

        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::ModelUnavailable.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ApiError::from(json_err).status_code(), StatusCode::BAD_REQUEST);

        let validation = ApiError::from(ValidationError::Empty("features"));
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);

        let inference = ApiError::from(InferenceError::InferenceFailed("shape mismatch".to_string()));
        assert_eq!(inference.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::ModelUnavailable.to_string(), "The model is not available.");
        assert_eq!(
            ApiError::from(ValidationError::MissingField("features")).to_string(),
            "The \"features\" key must be a non-empty list."
        );
        assert_eq!(
            ApiError::from(InferenceError::InferenceFailed("boom".to_string())).to_string(),
            "Inference failed: boom"
        );
    }
}
