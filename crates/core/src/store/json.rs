//! JSON file backed settings store.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ConfigStore, StoreError, TenantConfigs};

/// Stores the settings document as a single pretty-printed JSON file.
///
/// Writes go to a sibling temp file that is synced and then renamed over the
/// target, so a crash mid-write leaves either the old or the new document.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tenants.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Result<TenantConfigs, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {:?}, starting empty", self.path);
                return Ok(TenantConfigs::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(TenantConfigs::new());
        }

        serde_json::from_str(&raw).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    fn save(&self, configs: &TenantConfigs) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(configs)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        let temp_path = self.temp_path();
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(&json).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e))?;

        // Persist the rename itself.
        #[cfg(unix)]
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            File::open(dir)
                .and_then(|d| d.sync_all())
                .map_err(|e| self.io_error(e))?;
        }

        debug!("Saved settings for {} tenants to {:?}", configs.len(), self.path);
        Ok(())
    }
}
