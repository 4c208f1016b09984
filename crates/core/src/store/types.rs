//! Persisted per-tenant settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::tenant::{ChannelId, RoleId, TenantId, UserId};

/// The whole settings document: every tenant's configuration.
pub type TenantConfigs = BTreeMap<TenantId, TenantConfig>;

/// Errors from the settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings document: {0}")]
    Malformed(String),

    #[error("Settings save task failed: {0}")]
    Task(String),
}

/// Configuration and records for one tenant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Endpoint probed by the status display loop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusTarget>,
    /// Role given to every joining member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_role_id: Option<RoleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_announcement: Option<Announcement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_announcement: Option<Announcement>,
    /// Warnings per user, oldest first.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub warns: HashMap<UserId, Vec<WarnRecord>>,
}

/// A probed endpoint and where its display lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTarget {
    pub address: String,
    #[serde(default = "crate::config::default_probe_port")]
    pub port: u16,
    /// Channel receiving the display. No display is posted while unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
}

/// A templated announcement. `{member}` is substituted when posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub channel_id: ChannelId,
    pub message: String,
}

/// One warning issued to a user. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarnRecord {
    pub reason: String,
    pub issued_at: DateTime<Utc>,
}

/// Durable storage for the settings document.
///
/// Saves are full-document overwrites and must be durable before returning.
pub trait ConfigStore: Send + Sync {
    /// Load every tenant's configuration.
    fn load(&self) -> Result<TenantConfigs, StoreError>;

    /// Replace the stored document.
    fn save(&self, configs: &TenantConfigs) -> Result<(), StoreError>;
}
