//! Types for endpoint status probing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while probing an endpoint.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Connection to {address} failed: {reason}")]
    ConnectionFailed { address: String, reason: String },

    #[error("Probe timed out")]
    Timeout,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid status payload: {0}")]
    InvalidPayload(String),
}

/// Liveness and occupancy snapshot of a probed endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players_online: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Raw description, formatting codes included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_names: Vec<String>,
}

/// Queries an endpoint for its status. Implementations bound their own runtime.
#[async_trait]
pub trait StatusProber: Send + Sync {
    async fn probe(&self, address: &str, port: u16) -> Result<ServerStatus, ProbeError>;
}
