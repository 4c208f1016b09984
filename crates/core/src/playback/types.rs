//! Types for the per-tenant playback queue and session.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::media::ResolvedMedia;
use crate::platform::PlatformError;
use crate::tenant::ChannelId;

/// Errors surfaced to the command that triggered a playback operation.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Missing permission to join or speak in the channel. Never retried.
    #[error("Missing permission to connect or speak in channel {0}")]
    ConnectionDenied(ChannelId),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Nothing is playing")]
    NothingPlaying,

    #[error("Playback is not paused")]
    NotPaused,

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Voice call timed out")]
    Timeout,
}

/// One resolved playable item. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub stream_url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
}

impl From<ResolvedMedia> for QueueEntry {
    fn from(media: ResolvedMedia) -> Self {
        Self {
            stream_url: media.stream_url,
            title: media.title,
            thumbnail: media.thumbnail,
            uploader: media.uploader,
        }
    }
}

/// Identifies one started stream. Completion notices carry it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackToken(pub u64);

impl fmt::Display for PlaybackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

/// The entry in flight and the token it was started with.
#[derive(Debug, Clone)]
pub struct NowPlaying {
    pub entry: QueueEntry,
    pub token: PlaybackToken,
}

/// A live voice session. Exists only while the connection does.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub channel: ChannelId,
    pub state: PlaybackState,
    pub current: Option<NowPlaying>,
}

impl PlaybackSession {
    pub(crate) fn new(channel: ChannelId) -> Self {
        Self {
            channel,
            state: PlaybackState::Idle,
            current: None,
        }
    }
}

/// Result of `ensure_connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectOutcome {
    AlreadyConnected,
    Moved,
    Connected,
}

/// Result of `enqueue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnqueueOutcome {
    /// The session was idle and the entry started right away.
    Started { entry: QueueEntry },
    /// The entry waits at this 1-based position.
    Queued { position: usize },
    /// The session was idle but the entry could not be started.
    Dropped,
}

/// What a tenant's session is doing, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelId>,
    pub state: PlaybackState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now_playing: Option<QueueEntry>,
    pub upcoming: Vec<QueueEntry>,
}
