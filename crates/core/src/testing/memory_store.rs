//! In-memory settings store for testing.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::store::{ConfigStore, StoreError, TenantConfigs};

#[derive(Default)]
struct Inner {
    configs: TenantConfigs,
    saves: usize,
    fail_next: bool,
    save_delay: Option<Duration>,
}

/// ConfigStore that keeps the document in memory and counts saves.
#[derive(Default)]
pub struct MemoryConfigStore {
    inner: Mutex<Inner>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document.
    pub fn with_configs(configs: TenantConfigs) -> Self {
        Self {
            inner: Mutex::new(Inner {
                configs,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// The last saved document.
    pub fn saved(&self) -> TenantConfigs {
        self.lock().configs.clone()
    }

    /// Make the next save fail.
    pub fn fail_next_save(&self) {
        self.lock().fail_next = true;
    }

    /// Block the calling thread this long on every save, like a slow fsync.
    pub fn set_save_delay(&self, delay: Duration) {
        self.lock().save_delay = Some(delay);
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<TenantConfigs, StoreError> {
        Ok(self.lock().configs.clone())
    }

    fn save(&self, configs: &TenantConfigs) -> Result<(), StoreError> {
        let delay = self.lock().save_delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let mut inner = self.lock();
        if std::mem::take(&mut inner.fail_next) {
            return Err(StoreError::Io {
                path: "memory".to_string(),
                source: std::io::Error::other("simulated save failure"),
            });
        }
        inner.configs = configs.clone();
        inner.saves += 1;
        Ok(())
    }
}
