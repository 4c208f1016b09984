//! Tenant-keyed state with per-tenant exclusivity.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use super::TenantId;

/// Holds one independently locked state value per tenant.
///
/// The map itself is sharded, and a shard is only held long enough to clone the
/// tenant's `Arc`. All mutation happens under the tenant's own mutex, so work on
/// different tenants never contends on a shared lock.
pub struct TenantRegistry<S> {
    states: DashMap<TenantId, Arc<Mutex<S>>>,
}

impl<S: Default> TenantRegistry<S> {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    /// Get the tenant's state, creating it on first reference.
    pub fn entry(&self, tenant: &TenantId) -> Arc<Mutex<S>> {
        if let Some(state) = self.states.get(tenant) {
            return Arc::clone(state.value());
        }
        Arc::clone(
            self.states
                .entry(tenant.clone())
                .or_insert_with(|| Arc::new(Mutex::new(S::default())))
                .value(),
        )
    }

    /// Get the tenant's state if it was ever created.
    pub fn get(&self, tenant: &TenantId) -> Option<Arc<Mutex<S>>> {
        self.states.get(tenant).map(|s| Arc::clone(s.value()))
    }

    /// Snapshot of every tenant that has state.
    pub fn tenants(&self) -> Vec<TenantId> {
        self.states.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<S: Default> Default for TenantRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
