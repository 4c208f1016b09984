//! Types for media resolution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving a query into a playable stream.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Nothing found for query: {0}")]
    NotFound(String),

    #[error("yt-dlp not found at {path}")]
    ToolNotFound { path: PathBuf },

    #[error("Resolver failed: {0}")]
    Failed(String),

    #[error("Resolver returned unusable output: {0}")]
    InvalidOutput(String),

    #[error("Resolution timed out after {0}s")]
    Timeout(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single playable item with display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    /// Direct stream URL handed to the voice gateway.
    pub stream_url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
}

/// Turns a link or free-text search into one playable item.
///
/// Free-text queries return the first match; playlists are never expanded.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<ResolvedMedia, MediaError>;
}
