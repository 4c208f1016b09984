//! Media playback commands.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use steward_core::{ChannelId, EnqueueOutcome, QueueEntry, QueueSnapshot, TenantId};

use super::error::ApiError;
use crate::state::AppState;

/// Request body for the play command
#[derive(Debug, Deserialize)]
pub struct PlayBody {
    /// Voice channel the invoking member is in
    pub voice_channel_id: ChannelId,
    /// Link or free-text search
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SkipResponse {
    pub now_playing: Option<QueueEntry>,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub discarded: usize,
}

pub async fn play(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
    Json(body): Json<PlayBody>,
) -> Result<Json<EnqueueOutcome>, ApiError> {
    let query = body.query.trim();
    if query.is_empty() {
        return Err(ApiError::bad_request("query must not be empty"));
    }

    let outcome = state
        .engine()
        .play(&TenantId::from(tenant), &body.voice_channel_id, query)
        .await?;
    Ok(Json(outcome))
}

pub async fn pause(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine().playback.pause(&TenantId::from(tenant)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn resume(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .engine()
        .playback
        .resume(&TenantId::from(tenant))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn skip(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
) -> Result<Json<SkipResponse>, ApiError> {
    let now_playing = state.engine().playback.skip(&TenantId::from(tenant)).await?;
    Ok(Json(SkipResponse { now_playing }))
}

pub async fn stop(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
) -> Result<Json<StopResponse>, ApiError> {
    let discarded = state.engine().playback.stop(&TenantId::from(tenant)).await?;
    Ok(Json(StopResponse { discarded }))
}

pub async fn queue(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
) -> Json<QueueSnapshot> {
    Json(state.engine().playback.queue(&TenantId::from(tenant)).await)
}
