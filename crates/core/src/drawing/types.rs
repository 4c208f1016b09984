//! Types for prize drawings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::PlatformError;
use crate::tenant::{ChannelId, MessageId, TenantId, UserId};

/// Reaction participants enter with.
pub const ENTRY_EMOJI: &str = "🎉";

/// Shortest accepted drawing, in minutes.
pub const MIN_DURATION_MINUTES: i64 = 1;

#[derive(Debug, Error)]
pub enum DrawingError {
    /// Rejected before anything is posted or registered.
    #[error("Drawing duration must be at least 1 minute, got {0}")]
    InvalidDuration(i64),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingState {
    /// Waiting for its deadline.
    Pending,
    /// Claimed by a processor run; removed once resolution ends.
    Resolving,
}

/// A registered drawing. The announcement message is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drawing {
    pub id: MessageId,
    pub tenant: TenantId,
    pub channel: ChannelId,
    pub prize: String,
    pub deadline: DateTime<Utc>,
    pub state: DrawingState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_by: Option<String>,
}

/// Parameters for a new drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingRequest {
    pub channel: ChannelId,
    pub prize: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub started_by: Option<String>,
}

/// How a drawing ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DrawingOutcome {
    Winner { drawing: MessageId, winner: UserId },
    NoParticipants { drawing: MessageId },
    /// Resolution failed; the drawing was dropped anyway.
    Failed { drawing: MessageId, reason: String },
}

impl DrawingOutcome {
    pub fn drawing(&self) -> &MessageId {
        match self {
            DrawingOutcome::Winner { drawing, .. }
            | DrawingOutcome::NoParticipants { drawing }
            | DrawingOutcome::Failed { drawing, .. } => drawing,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            DrawingOutcome::Winner { .. } => "winner",
            DrawingOutcome::NoParticipants { .. } => "no_participants",
            DrawingOutcome::Failed { .. } => "failed",
        }
    }
}
