//! Prize drawing commands.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use steward_core::{Drawing, DrawingRequest, TenantId};

use super::error::ApiError;
use crate::state::AppState;

pub async fn create_drawing(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
    Json(request): Json<DrawingRequest>,
) -> Result<(StatusCode, Json<Drawing>), ApiError> {
    if request.prize.trim().is_empty() {
        return Err(ApiError::bad_request("prize must not be empty"));
    }

    let drawing = state
        .engine()
        .drawings
        .create(&TenantId::from(tenant), request)
        .await?;
    Ok((StatusCode::CREATED, Json(drawing)))
}

pub async fn list_drawings(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
) -> Json<Vec<Drawing>> {
    Json(state.engine().drawings.pending(&TenantId::from(tenant)).await)
}
