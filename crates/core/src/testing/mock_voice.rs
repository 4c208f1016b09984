//! Mock voice gateway for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::platform::{Participant, PlatformError, VoiceGateway, VoicePermissions};
use crate::playback::PlaybackToken;
use crate::tenant::{ChannelId, TenantId};

/// A recorded gateway call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCall {
    Connect { tenant: TenantId, channel: ChannelId },
    MoveTo { tenant: TenantId, channel: ChannelId },
    Disconnect { tenant: TenantId },
    Play { tenant: TenantId, stream_url: String, token: PlaybackToken },
    Pause { tenant: TenantId },
    Resume { tenant: TenantId },
    Stop { tenant: TenantId },
}

/// Mock implementation of the VoiceGateway trait.
///
/// Grants full permissions by default. Streams registered with
/// [`MockVoiceGateway::fail_stream`] are rejected by `play`. An optional delay
/// is applied to every call to exercise timeouts.
pub struct MockVoiceGateway {
    calls: Arc<RwLock<Vec<VoiceCall>>>,
    permissions: Arc<RwLock<VoicePermissions>>,
    members: Arc<RwLock<HashMap<ChannelId, Vec<Participant>>>>,
    failing_streams: Arc<RwLock<HashSet<String>>>,
    fail_members: Arc<RwLock<bool>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for MockVoiceGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVoiceGateway {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            permissions: Arc::new(RwLock::new(VoicePermissions {
                connect: true,
                speak: true,
            })),
            members: Arc::new(RwLock::new(HashMap::new())),
            failing_streams: Arc::new(RwLock::new(HashSet::new())),
            fail_members: Arc::new(RwLock::new(false)),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_permissions(&self, permissions: VoicePermissions) {
        *self.permissions.write().await = permissions;
    }

    /// Occupants reported for a voice channel.
    pub async fn set_members(&self, channel: &ChannelId, members: Vec<Participant>) {
        self.members.write().await.insert(channel.clone(), members);
    }

    /// Reject `play` for this stream URL.
    pub async fn fail_stream(&self, stream_url: &str) {
        self.failing_streams
            .write()
            .await
            .insert(stream_url.to_string());
    }

    /// Make member lookups fail.
    pub async fn fail_members(&self, fail: bool) {
        *self.fail_members.write().await = fail;
    }

    /// Delay every call by this much.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn calls(&self) -> Vec<VoiceCall> {
        self.calls.read().await.clone()
    }

    pub async fn connect_count(&self) -> usize {
        self.count(|c| matches!(c, VoiceCall::Connect { .. })).await
    }

    pub async fn disconnect_count(&self) -> usize {
        self.count(|c| matches!(c, VoiceCall::Disconnect { .. })).await
    }

    pub async fn stop_count(&self) -> usize {
        self.count(|c| matches!(c, VoiceCall::Stop { .. })).await
    }

    /// Stream URLs successfully started for a tenant, in order.
    pub async fn played(&self, tenant: &TenantId) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                VoiceCall::Play {
                    tenant: t,
                    stream_url,
                    ..
                } if t == tenant => Some(stream_url.clone()),
                _ => None,
            })
            .collect()
    }

    /// Token of the last stream started for a tenant.
    pub async fn last_token(&self, tenant: &TenantId) -> Option<PlaybackToken> {
        self.calls
            .read()
            .await
            .iter()
            .rev()
            .find_map(|c| match c {
                VoiceCall::Play {
                    tenant: t, token, ..
                } if t == tenant => Some(*token),
                _ => None,
            })
    }

    async fn count(&self, pred: impl Fn(&VoiceCall) -> bool) -> usize {
        self.calls.read().await.iter().filter(|c| pred(c)).count()
    }

    async fn record(&self, call: VoiceCall) {
        self.calls.write().await.push(call);
    }

    async fn simulate_latency(&self) {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl VoiceGateway for MockVoiceGateway {
    async fn voice_permissions(
        &self,
        _tenant: &TenantId,
        _channel: &ChannelId,
    ) -> Result<VoicePermissions, PlatformError> {
        self.simulate_latency().await;
        Ok(*self.permissions.read().await)
    }

    async fn channel_members(
        &self,
        _tenant: &TenantId,
        channel: &ChannelId,
    ) -> Result<Vec<Participant>, PlatformError> {
        self.simulate_latency().await;
        if *self.fail_members.read().await {
            return Err(PlatformError::ApiError("members unavailable".to_string()));
        }
        Ok(self
            .members
            .read()
            .await
            .get(channel)
            .cloned()
            .unwrap_or_default())
    }

    async fn connect(&self, tenant: &TenantId, channel: &ChannelId) -> Result<(), PlatformError> {
        self.simulate_latency().await;
        self.record(VoiceCall::Connect {
            tenant: tenant.clone(),
            channel: channel.clone(),
        })
        .await;
        Ok(())
    }

    async fn move_to(&self, tenant: &TenantId, channel: &ChannelId) -> Result<(), PlatformError> {
        self.simulate_latency().await;
        self.record(VoiceCall::MoveTo {
            tenant: tenant.clone(),
            channel: channel.clone(),
        })
        .await;
        Ok(())
    }

    async fn disconnect(&self, tenant: &TenantId) -> Result<(), PlatformError> {
        self.simulate_latency().await;
        self.record(VoiceCall::Disconnect {
            tenant: tenant.clone(),
        })
        .await;
        Ok(())
    }

    async fn play(
        &self,
        tenant: &TenantId,
        stream_url: &str,
        token: PlaybackToken,
    ) -> Result<(), PlatformError> {
        self.simulate_latency().await;
        if self.failing_streams.read().await.contains(stream_url) {
            return Err(PlatformError::ApiError(format!(
                "cannot open stream {}",
                stream_url
            )));
        }
        self.record(VoiceCall::Play {
            tenant: tenant.clone(),
            stream_url: stream_url.to_string(),
            token,
        })
        .await;
        Ok(())
    }

    async fn pause(&self, tenant: &TenantId) -> Result<(), PlatformError> {
        self.simulate_latency().await;
        self.record(VoiceCall::Pause {
            tenant: tenant.clone(),
        })
        .await;
        Ok(())
    }

    async fn resume(&self, tenant: &TenantId) -> Result<(), PlatformError> {
        self.simulate_latency().await;
        self.record(VoiceCall::Resume {
            tenant: tenant.clone(),
        })
        .await;
        Ok(())
    }

    async fn stop(&self, tenant: &TenantId) -> Result<(), PlatformError> {
        self.simulate_latency().await;
        self.record(VoiceCall::Stop {
            tenant: tenant.clone(),
        })
        .await;
        Ok(())
    }
}
