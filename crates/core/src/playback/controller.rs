//! Playback session controller and tenant queue manager.
//!
//! Session transitions per tenant:
//! - `Idle -> Playing(entry)` when an entry is enqueued on an idle session
//! - `Playing -> Playing(next)` or `Playing -> Idle` on completion or skip
//! - `Playing <-> Paused` on pause/resume
//! - any state -> discarded when the connection goes away
//!
//! Each tenant's queue and session sit behind that tenant's own mutex.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::platform::{PlatformError, VoiceGateway};
use crate::tenant::{ChannelId, TenantId, TenantRegistry};

use super::types::{
    ConnectOutcome, EnqueueOutcome, NowPlaying, PlaybackError, PlaybackSession, PlaybackState,
    PlaybackToken, QueueEntry, QueueSnapshot,
};

#[derive(Default)]
struct TenantPlayback {
    /// Never holds the entry in flight.
    queue: VecDeque<QueueEntry>,
    session: Option<PlaybackSession>,
}

/// Owns every tenant's queue and voice session.
pub struct PlaybackController {
    gateway: Arc<dyn VoiceGateway>,
    tenants: TenantRegistry<TenantPlayback>,
    next_token: AtomicU64,
    call_timeout: Duration,
}

impl PlaybackController {
    pub fn new(gateway: Arc<dyn VoiceGateway>, call_timeout: Duration) -> Self {
        Self {
            gateway,
            tenants: TenantRegistry::new(),
            next_token: AtomicU64::new(1),
            call_timeout,
        }
    }

    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, PlatformError>>,
    ) -> Result<T, PlaybackError> {
        match timeout(self.call_timeout, fut).await {
            Ok(result) => result.map_err(PlaybackError::from),
            Err(_) => Err(PlaybackError::Timeout),
        }
    }

    /// Make sure the tenant has a session in `channel`.
    ///
    /// No-op when already there, moves an existing session, connects otherwise.
    /// Missing join/speak permission is reported as `ConnectionDenied`.
    pub async fn ensure_connected(
        &self,
        tenant: &TenantId,
        channel: &ChannelId,
    ) -> Result<ConnectOutcome, PlaybackError> {
        let state = self.tenants.entry(tenant);
        let mut state = state.lock().await;

        if let Some(session) = &state.session {
            if &session.channel == channel {
                return Ok(ConnectOutcome::AlreadyConnected);
            }
        }

        let permissions = self
            .call(self.gateway.voice_permissions(tenant, channel))
            .await?;
        if !permissions.can_play() {
            warn!(
                "Tenant {}: missing voice permissions in channel {}",
                tenant, channel
            );
            return Err(PlaybackError::ConnectionDenied(channel.clone()));
        }

        let denied = |e: PlaybackError| match e {
            PlaybackError::Platform(PlatformError::Forbidden(_)) => {
                PlaybackError::ConnectionDenied(channel.clone())
            }
            other => other,
        };

        match state.session.as_mut() {
            Some(session) => {
                self.call(self.gateway.move_to(tenant, channel))
                    .await
                    .map_err(denied)?;
                info!(
                    "Tenant {}: moved voice session {} -> {}",
                    tenant, session.channel, channel
                );
                session.channel = channel.clone();
                Ok(ConnectOutcome::Moved)
            }
            None => {
                self.call(self.gateway.connect(tenant, channel))
                    .await
                    .map_err(denied)?;
                info!("Tenant {}: connected to voice channel {}", tenant, channel);
                state.session = Some(PlaybackSession::new(channel.clone()));
                Ok(ConnectOutcome::Connected)
            }
        }
    }

    /// Append an entry; an idle session starts it immediately.
    pub async fn enqueue(
        &self,
        tenant: &TenantId,
        entry: QueueEntry,
    ) -> Result<EnqueueOutcome, PlaybackError> {
        let state = self.tenants.entry(tenant);
        let mut guard = state.lock().await;
        let TenantPlayback { queue, session } = &mut *guard;
        let session = session.as_mut().ok_or(PlaybackError::NotConnected)?;

        queue.push_back(entry);

        if session.current.is_some() {
            debug!("Tenant {}: queued at position {}", tenant, queue.len());
            return Ok(EnqueueOutcome::Queued {
                position: queue.len(),
            });
        }

        Ok(match self.advance(tenant, session, queue).await {
            Some(entry) => EnqueueOutcome::Started { entry },
            None => EnqueueOutcome::Dropped,
        })
    }

    /// Completion notice from the voice gateway.
    ///
    /// Only the token of the entry in flight advances the queue; anything else
    /// (a stream already skipped or stopped) is ignored. Returns the entry that
    /// started next, if any.
    pub async fn on_playback_finished(
        &self,
        tenant: &TenantId,
        token: PlaybackToken,
    ) -> Option<QueueEntry> {
        let state = self.tenants.get(tenant)?;
        let mut guard = state.lock().await;
        let TenantPlayback { queue, session } = &mut *guard;
        let session = session.as_mut()?;

        match &session.current {
            Some(now) if now.token == token => {}
            _ => {
                debug!("Tenant {}: ignoring stale completion {}", tenant, token);
                return None;
            }
        }

        session.current = None;
        self.advance(tenant, session, queue).await
    }

    /// Force the current entry to finish and start the next one.
    pub async fn skip(&self, tenant: &TenantId) -> Result<Option<QueueEntry>, PlaybackError> {
        let state = self.tenants.entry(tenant);
        let mut guard = state.lock().await;
        let TenantPlayback { queue, session } = &mut *guard;
        let session = session.as_mut().ok_or(PlaybackError::NotConnected)?;

        if session.current.is_none() {
            return Err(PlaybackError::NothingPlaying);
        }

        self.call(self.gateway.stop(tenant)).await?;
        session.current = None;
        Ok(self.advance(tenant, session, queue).await)
    }

    /// Halt playback and discard the queue. The session stays connected.
    ///
    /// Returns how many queued entries were discarded.
    pub async fn stop(&self, tenant: &TenantId) -> Result<usize, PlaybackError> {
        let state = self.tenants.entry(tenant);
        let mut guard = state.lock().await;
        let TenantPlayback { queue, session } = &mut *guard;
        let session = session.as_mut().ok_or(PlaybackError::NotConnected)?;

        // Nothing changes unless the stream actually stopped.
        if session.current.is_some() {
            self.call(self.gateway.stop(tenant)).await?;
        }

        let discarded = queue.len();
        queue.clear();
        session.current = None;
        session.state = PlaybackState::Idle;

        info!(
            "Tenant {}: playback stopped, {} queued entries discarded",
            tenant, discarded
        );
        Ok(discarded)
    }

    pub async fn pause(&self, tenant: &TenantId) -> Result<(), PlaybackError> {
        let state = self.tenants.entry(tenant);
        let mut guard = state.lock().await;
        let session = guard.session.as_mut().ok_or(PlaybackError::NotConnected)?;

        if session.state != PlaybackState::Playing {
            return Err(PlaybackError::NothingPlaying);
        }
        self.call(self.gateway.pause(tenant)).await?;
        session.state = PlaybackState::Paused;
        Ok(())
    }

    pub async fn resume(&self, tenant: &TenantId) -> Result<(), PlaybackError> {
        let state = self.tenants.entry(tenant);
        let mut guard = state.lock().await;
        let session = guard.session.as_mut().ok_or(PlaybackError::NotConnected)?;

        if session.state != PlaybackState::Paused {
            return Err(PlaybackError::NotPaused);
        }
        self.call(self.gateway.resume(tenant)).await?;
        session.state = PlaybackState::Playing;
        Ok(())
    }

    /// Current entry, state and upcoming entries in play order.
    pub async fn queue(&self, tenant: &TenantId) -> QueueSnapshot {
        let Some(state) = self.tenants.get(tenant) else {
            return QueueSnapshot {
                channel: None,
                state: PlaybackState::Idle,
                now_playing: None,
                upcoming: Vec::new(),
            };
        };
        let guard = state.lock().await;

        QueueSnapshot {
            channel: guard.session.as_ref().map(|s| s.channel.clone()),
            state: guard
                .session
                .as_ref()
                .map(|s| s.state)
                .unwrap_or(PlaybackState::Idle),
            now_playing: guard
                .session
                .as_ref()
                .and_then(|s| s.current.as_ref())
                .map(|now| now.entry.clone()),
            upcoming: guard.queue.iter().cloned().collect(),
        }
    }

    /// Voice channel of the tenant's session, if connected.
    pub async fn connected_channel(&self, tenant: &TenantId) -> Option<ChannelId> {
        let state = self.tenants.get(tenant)?;
        let guard = state.lock().await;
        guard.session.as_ref().map(|s| s.channel.clone())
    }

    /// Disconnect when no human is left in the session's channel.
    ///
    /// Called on every presence change. Returns whether the session was torn
    /// down. If the member list cannot be fetched the session is kept.
    pub async fn teardown_if_empty(&self, tenant: &TenantId) -> Result<bool, PlaybackError> {
        let Some(state) = self.tenants.get(tenant) else {
            return Ok(false);
        };
        let mut guard = state.lock().await;
        let Some(session) = guard.session.as_ref() else {
            return Ok(false);
        };

        let members = self
            .call(self.gateway.channel_members(tenant, &session.channel))
            .await?;
        if members.iter().any(|m| !m.automated) {
            return Ok(false);
        }

        info!(
            "Tenant {}: voice channel {} is empty, disconnecting",
            tenant, session.channel
        );
        if let Err(e) = self.call(self.gateway.disconnect(tenant)).await {
            warn!("Tenant {}: disconnect failed: {}", tenant, e);
        }
        guard.session = None;
        guard.queue.clear();
        metrics::SESSIONS_CLOSED
            .with_label_values(&["empty_channel"])
            .inc();
        Ok(true)
    }

    /// The connection dropped underneath us; the session cannot be reused.
    pub async fn on_connection_lost(&self, tenant: &TenantId) {
        let Some(state) = self.tenants.get(tenant) else {
            return;
        };
        let mut guard = state.lock().await;
        if guard.session.take().is_some() {
            let discarded = guard.queue.len();
            guard.queue.clear();
            info!(
                "Tenant {}: voice connection lost, session discarded ({} queued entries dropped)",
                tenant, discarded
            );
            metrics::SESSIONS_CLOSED
                .with_label_values(&["connection_lost"])
                .inc();
        }
    }

    /// Start the first queue entry that the gateway accepts.
    ///
    /// Entries that fail to start are dropped. When the queue runs dry the
    /// session goes idle.
    async fn advance(
        &self,
        tenant: &TenantId,
        session: &mut PlaybackSession,
        queue: &mut VecDeque<QueueEntry>,
    ) -> Option<QueueEntry> {
        while let Some(entry) = queue.pop_front() {
            let token = PlaybackToken(self.next_token.fetch_add(1, Ordering::Relaxed));
            match self
                .call(self.gateway.play(tenant, &entry.stream_url, token))
                .await
            {
                Ok(()) => {
                    info!("Tenant {}: now playing '{}'", tenant, entry.title);
                    metrics::PLAYBACK_STARTED.inc();
                    session.state = PlaybackState::Playing;
                    session.current = Some(NowPlaying {
                        entry: entry.clone(),
                        token,
                    });
                    return Some(entry);
                }
                Err(e) => {
                    warn!(
                        "Tenant {}: dropping '{}', failed to start: {}",
                        tenant, entry.title, e
                    );
                    metrics::QUEUE_ENTRIES_DROPPED.inc();
                }
            }
        }

        session.state = PlaybackState::Idle;
        session.current = None;
        None
    }
}
