//! Mock status prober for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::prober::{ProbeError, ServerStatus, StatusProber};

/// Mock implementation of the StatusProber trait.
///
/// Addresses without a configured status are unreachable.
#[derive(Default)]
pub struct MockProber {
    statuses: Arc<RwLock<HashMap<String, ServerStatus>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    address_delays: Arc<RwLock<HashMap<String, Duration>>>,
    probes: Arc<RwLock<Vec<(String, u16)>>>,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_status(&self, address: &str, status: ServerStatus) {
        self.statuses
            .write()
            .await
            .insert(address.to_string(), status);
    }

    /// Make an address unreachable.
    pub async fn set_offline(&self, address: &str) {
        self.statuses.write().await.remove(address);
    }

    /// Delay every probe by this much.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Delay probes of one address only. Takes precedence over `set_delay`.
    pub async fn set_address_delay(&self, address: &str, delay: Duration) {
        self.address_delays
            .write()
            .await
            .insert(address.to_string(), delay);
    }

    pub async fn probe_count(&self) -> usize {
        self.probes.read().await.len()
    }
}

#[async_trait]
impl StatusProber for MockProber {
    async fn probe(&self, address: &str, port: u16) -> Result<ServerStatus, ProbeError> {
        self.probes.write().await.push((address.to_string(), port));

        let delay = match self.address_delays.read().await.get(address) {
            Some(delay) => Some(*delay),
            None => *self.delay.read().await,
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.statuses
            .read()
            .await
            .get(address)
            .cloned()
            .ok_or_else(|| ProbeError::ConnectionFailed {
                address: format!("{}:{}", address, port),
                reason: "unreachable".to_string(),
            })
    }
}
