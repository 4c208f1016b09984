//! Tenant settings commands.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use steward_core::{
    members::AnnouncementKind,
    store::{Announcement, StatusTarget},
    RoleId, TenantConfig, TenantId,
};
use tracing::info;

use super::error::ApiError;
use crate::state::AppState;

/// Request body for the auto role
#[derive(Debug, Deserialize)]
pub struct AutoRoleBody {
    /// `null` disables the auto role
    pub role_id: Option<RoleId>,
}

/// Current settings of a tenant, defaults when none are stored.
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
) -> Json<TenantConfig> {
    Json(state.engine().settings.get(&TenantId::from(tenant)))
}

/// Set or clear (`null` body) the probed endpoint and its display channel.
pub async fn set_status_target(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
    Json(target): Json<Option<StatusTarget>>,
) -> Result<StatusCode, ApiError> {
    let tenant = TenantId::from(tenant);
    if let Some(target) = &target {
        if target.address.trim().is_empty() {
            return Err(ApiError::bad_request("address must not be empty"));
        }
        if target.port == 0 {
            return Err(ApiError::bad_request("port must not be 0"));
        }
    }

    info!("Tenant {}: status target set to {:?}", tenant, target);
    state
        .engine()
        .settings
        .update(&tenant, |config| config.status = target)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_auto_role(
    State(state): State<Arc<AppState>>,
    Path(tenant): Path<String>,
    Json(body): Json<AutoRoleBody>,
) -> Result<StatusCode, ApiError> {
    state
        .engine()
        .members
        .set_auto_role(&TenantId::from(tenant), body.role_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set or clear (`null` body) the join or leave announcement.
pub async fn set_announcement(
    State(state): State<Arc<AppState>>,
    Path((tenant, kind)): Path<(String, AnnouncementKind)>,
    Json(announcement): Json<Option<Announcement>>,
) -> Result<StatusCode, ApiError> {
    state
        .engine()
        .members
        .set_announcement(&TenantId::from(tenant), kind, announcement)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
