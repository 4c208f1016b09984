//! The orchestration engine: every tenant-scoped component wired together.
//!
//! Two recurring loops run for the life of the process (status displays and
//! the drawing processor). Playback is driven by commands and completion
//! notices, never by a timer.

mod config;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::drawing::DrawingRegistry;
use crate::media::{MediaError, MediaResolver};
use crate::members::MemberEvents;
use crate::platform::{ChatPlatform, VoiceGateway};
use crate::playback::{EnqueueOutcome, PlaybackController, PlaybackError, QueueEntry};
use crate::prober::StatusProber;
use crate::status::StatusDisplayLoop;
use crate::store::TenantSettings;
use crate::tenant::{ChannelId, TenantId};
use crate::warns::WarnBook;

pub use config::EngineConfig;

/// Failure of the combined connect, resolve and enqueue command.
#[derive(Debug, Error)]
pub enum PlayError {
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("Could not resolve media: {0}")]
    Resolution(#[from] MediaError),
}

/// The external collaborators the engine drives.
pub struct Collaborators {
    pub platform: Arc<dyn ChatPlatform>,
    pub voice: Arc<dyn VoiceGateway>,
    pub resolver: Arc<dyn MediaResolver>,
    pub prober: Arc<dyn StatusProber>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub status_loop_running: bool,
    pub drawing_loop_running: bool,
    pub configured_tenants: usize,
}

pub struct Engine {
    pub settings: Arc<TenantSettings>,
    pub playback: Arc<PlaybackController>,
    pub status_displays: Arc<StatusDisplayLoop>,
    pub drawings: Arc<DrawingRegistry>,
    pub warns: Arc<WarnBook>,
    pub members: Arc<MemberEvents>,
    resolver: Arc<dyn MediaResolver>,
}

impl Engine {
    pub fn new(config: &EngineConfig, settings: Arc<TenantSettings>, deps: Collaborators) -> Self {
        let call_timeout = config.call_timeout();

        Self {
            playback: Arc::new(PlaybackController::new(deps.voice, call_timeout)),
            status_displays: Arc::new(StatusDisplayLoop::new(
                Arc::clone(&settings),
                Arc::clone(&deps.platform),
                deps.prober,
                config.status_interval(),
                call_timeout,
            )),
            drawings: Arc::new(DrawingRegistry::new(
                Arc::clone(&deps.platform),
                config.drawing_interval(),
                call_timeout,
            )),
            warns: Arc::new(WarnBook::new(Arc::clone(&settings))),
            members: Arc::new(MemberEvents::new(
                Arc::clone(&settings),
                deps.platform,
                call_timeout,
            )),
            settings,
            resolver: deps.resolver,
        }
    }

    /// Start the recurring loops.
    pub fn start(&self) {
        info!("Starting orchestration engine");
        self.status_displays.start();
        self.drawings.start();
    }

    pub fn stop(&self) {
        info!("Stopping orchestration engine");
        self.status_displays.stop();
        self.drawings.stop();
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            status_loop_running: self.status_displays.is_running(),
            drawing_loop_running: self.drawings.is_running(),
            configured_tenants: self.settings.tenants().len(),
        }
    }

    /// Join `voice_channel`, resolve `query` and enqueue the result.
    pub async fn play(
        &self,
        tenant: &TenantId,
        voice_channel: &ChannelId,
        query: &str,
    ) -> Result<EnqueueOutcome, PlayError> {
        self.playback.ensure_connected(tenant, voice_channel).await?;

        let media = self.resolver.resolve(query).await?;
        debug!("Tenant {}: resolved '{}' to '{}'", tenant, query, media.title);

        Ok(self
            .playback
            .enqueue(tenant, QueueEntry::from(media))
            .await?)
    }
}
