//! Warning commands.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use steward_core::{store::WarnRecord, warns::needs_escalation, TenantId, UserId};
use tracing::info;

use super::error::ApiError;
use super::middleware::AuthCaller;
use crate::state::AppState;

/// Request body for issuing a warning
#[derive(Debug, Deserialize)]
pub struct WarnBody {
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct WarnResponse {
    pub count: usize,
    /// Set once the count reaches the escalation threshold
    pub escalate: bool,
}

#[derive(Debug, Serialize)]
pub struct WarnListResponse {
    pub user_id: UserId,
    pub warns: Vec<WarnRecord>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: usize,
}

pub async fn add_warn(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    Path((tenant, user)): Path<(String, String)>,
    Json(body): Json<WarnBody>,
) -> Result<Json<WarnResponse>, ApiError> {
    if body.reason.trim().is_empty() {
        return Err(ApiError::bad_request("reason must not be empty"));
    }

    let tenant = TenantId::from(tenant);
    let user = UserId::from(user);
    let count = state
        .engine()
        .warns
        .add_warn(&tenant, &user, body.reason.trim())
        .await?;

    let escalate = needs_escalation(count);
    if escalate {
        info!(
            "Tenant {}: {} reached {} warnings (via {})",
            tenant, user, count, caller
        );
    }
    Ok(Json(WarnResponse { count, escalate }))
}

pub async fn list_warns(
    State(state): State<Arc<AppState>>,
    Path((tenant, user)): Path<(String, String)>,
) -> Json<WarnListResponse> {
    let user_id = UserId::from(user);
    let warns = state
        .engine()
        .warns
        .list(&TenantId::from(tenant), &user_id);
    Json(WarnListResponse { user_id, warns })
}

pub async fn clear_warns(
    State(state): State<Arc<AppState>>,
    Path((tenant, user)): Path<(String, String)>,
) -> Result<Json<ClearResponse>, ApiError> {
    let cleared = state
        .engine()
        .warns
        .clear(&TenantId::from(tenant), &UserId::from(user))
        .await?;
    Ok(Json(ClearResponse { cleared }))
}
