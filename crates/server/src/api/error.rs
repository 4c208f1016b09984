//! Mapping of engine errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use steward_core::{DrawingError, MediaError, PlayError, PlaybackError, StoreError};

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A failed request: status code plus a short message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<PlaybackError> for ApiError {
    fn from(e: PlaybackError) -> Self {
        let status = match &e {
            PlaybackError::ConnectionDenied(_) => StatusCode::FORBIDDEN,
            PlaybackError::NotConnected
            | PlaybackError::NothingPlaying
            | PlaybackError::NotPaused => StatusCode::CONFLICT,
            PlaybackError::Platform(_) | PlaybackError::Timeout => StatusCode::BAD_GATEWAY,
        };
        ApiError::new(status, e.to_string())
    }
}

impl From<MediaError> for ApiError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::NotFound(_) | MediaError::InvalidOutput(_) | MediaError::Failed(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            MediaError::Timeout(_) => ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()),
            MediaError::ToolNotFound { .. } | MediaError::Io(_) => {
                warn!("Media resolver unavailable: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

impl From<PlayError> for ApiError {
    fn from(e: PlayError) -> Self {
        match e {
            PlayError::Playback(e) => e.into(),
            PlayError::Resolution(e) => e.into(),
        }
    }
}

impl From<DrawingError> for ApiError {
    fn from(e: DrawingError) -> Self {
        let status = match &e {
            DrawingError::InvalidDuration(_) => StatusCode::BAD_REQUEST,
            DrawingError::Platform(_) => StatusCode::BAD_GATEWAY,
        };
        ApiError::new(status, e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        warn!("Settings store failure: {}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}
