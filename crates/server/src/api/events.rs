//! Platform events forwarded by the bridge.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use steward_core::{members::JoinReport, Participant, PlaybackToken, QueueEntry, TenantId};
use tracing::debug;

use super::error::ApiError;
use crate::state::AppState;

/// Completion notice for a stream
#[derive(Debug, Deserialize)]
pub struct PlaybackFinishedBody {
    pub token: PlaybackToken,
}

#[derive(Debug, Serialize)]
pub struct PlaybackFinishedResponse {
    /// Entry started next, if any
    pub next: Option<QueueEntry>,
}

#[derive(Debug, Serialize)]
pub struct MemberLeftResponse {
    pub announced: bool,
}

#[derive(Debug, Serialize)]
pub struct VoiceStateResponse {
    pub torn_down: bool,
}

pub async fn member_joined(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
    Json(member): Json<Participant>,
) -> Json<JoinReport> {
    let tenant = TenantId::from(tenant);
    if member.automated {
        debug!("Tenant {}: ignoring join of bot {}", tenant, member.user_id);
        return Json(JoinReport::default());
    }
    Json(state.engine().members.on_member_joined(&tenant, &member).await)
}

pub async fn member_left(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
    Json(member): Json<Participant>,
) -> Json<MemberLeftResponse> {
    let tenant = TenantId::from(tenant);
    let announced = state.engine().members.on_member_left(&tenant, &member).await;
    Json(MemberLeftResponse { announced })
}

/// Someone joined, left or moved between voice channels.
pub async fn voice_state(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
) -> Result<Json<VoiceStateResponse>, ApiError> {
    let torn_down = state
        .engine()
        .playback
        .teardown_if_empty(&TenantId::from(tenant))
        .await?;
    Ok(Json(VoiceStateResponse { torn_down }))
}

pub async fn playback_finished(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
    Json(body): Json<PlaybackFinishedBody>,
) -> Json<PlaybackFinishedResponse> {
    let next = state
        .engine()
        .playback
        .on_playback_finished(&TenantId::from(tenant), body.token)
        .await;
    Json(PlaybackFinishedResponse { next })
}

pub async fn voice_disconnected(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
) -> StatusCode {
    state
        .engine()
        .playback
        .on_connection_lost(&TenantId::from(tenant))
        .await;
    StatusCode::NO_CONTENT
}
