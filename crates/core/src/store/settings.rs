//! In-memory view of the settings document with write-through persistence.

use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::tenant::TenantId;

use super::{ConfigStore, StoreError, TenantConfig, TenantConfigs};

/// Process-wide tenant settings.
///
/// Readers get a clone of the last published document and may briefly observe
/// stale data while a write is in flight. Writers are serialized because every
/// save rewrites the whole document; the new document is published in memory
/// only after the store accepted it.
pub struct TenantSettings {
    store: Arc<dyn ConfigStore>,
    current: RwLock<Arc<TenantConfigs>>,
    write_lock: Mutex<()>,
}

impl TenantSettings {
    /// Load the document from the store.
    pub fn load(store: Arc<dyn ConfigStore>) -> Result<Self, StoreError> {
        let configs = store.load()?;
        debug!("Loaded settings for {} tenants", configs.len());
        Ok(Self {
            store,
            current: RwLock::new(Arc::new(configs)),
            write_lock: Mutex::new(()),
        })
    }

    fn snapshot(&self) -> Arc<TenantConfigs> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    fn publish(&self, configs: TenantConfigs) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(configs);
    }

    /// A tenant's configuration, or the default if it has none yet.
    pub fn get(&self, tenant: &TenantId) -> TenantConfig {
        self.snapshot().get(tenant).cloned().unwrap_or_default()
    }

    /// Every configured tenant with its configuration.
    pub fn all(&self) -> Arc<TenantConfigs> {
        self.snapshot()
    }

    /// Tenants present in the document.
    pub fn tenants(&self) -> Vec<TenantId> {
        self.snapshot().keys().cloned().collect()
    }

    /// Apply `f` to the tenant's configuration and persist the whole document.
    ///
    /// The tenant entry is created on first update. Returns whatever `f` returns.
    pub async fn update<R, F>(&self, tenant: &TenantId, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut TenantConfig) -> R,
    {
        let _guard = self.write_lock.lock().await;

        let mut next = (*self.snapshot()).clone();
        let result = f(next.entry(tenant.clone()).or_default());

        // The save syncs to disk; keep it off the runtime workers.
        let store = Arc::clone(&self.store);
        let saved = tokio::task::spawn_blocking(move || store.save(&next).map(|()| next))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))
            .and_then(|saved| saved);

        match saved {
            Ok(next) => {
                self.publish(next);
                Ok(result)
            }
            Err(e) => {
                error!("Failed to persist settings for tenant {}: {}", tenant, e);
                Err(e)
            }
        }
    }
}
