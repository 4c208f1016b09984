use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::engine::EngineConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub prober: ProberConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Authentication of the bridge that delivers commands and events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Shared key, required when method = "api_key".
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Where per-tenant settings are persisted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_tenants_path")]
    pub tenants_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tenants_path: default_tenants_path(),
        }
    }
}

fn default_tenants_path() -> PathBuf {
    PathBuf::from("tenants.json")
}

/// Chat platform bridge sidecar.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    /// Base URL (e.g., "http://localhost:7070")
    #[serde(default = "default_bridge_url")]
    pub url: String,
    /// Bearer token sent to the bridge.
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_bridge_timeout")]
    pub timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: default_bridge_url(),
            token: None,
            timeout_secs: default_bridge_timeout(),
        }
    }
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:7070".to_string()
}

fn default_bridge_timeout() -> u64 {
    10
}

/// Media resolver (yt-dlp) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,
    /// Timeout for a single lookup in seconds (default: 30)
    #[serde(default = "default_media_timeout")]
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            timeout_secs: default_media_timeout(),
        }
    }
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_media_timeout() -> u64 {
    30
}

/// Game server status prober configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProberConfig {
    /// Connect + read timeout in seconds (default: 5)
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,
    /// Port used when a tenant does not configure one.
    #[serde(default = "default_probe_port")]
    pub default_port: u16,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout(),
            default_port: default_probe_port(),
        }
    }
}

fn default_probe_timeout() -> u64 {
    5
}

pub(crate) fn default_probe_port() -> u16 {
    25565
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub bridge: SanitizedBridgeConfig,
    pub media: MediaConfig,
    pub prober: ProberConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
}

/// Bridge config with the token hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBridgeConfig {
    pub url: String,
    pub token_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                api_key_configured: config.auth.api_key.is_some(),
            },
            server: config.server.clone(),
            storage: config.storage.clone(),
            bridge: SanitizedBridgeConfig {
                url: config.bridge.url.clone(),
                token_configured: config.bridge.token.is_some(),
                timeout_secs: config.bridge.timeout_secs,
            },
            media: config.media.clone(),
            prober: config.prober.clone(),
            engine: config.engine.clone(),
        }
    }
}
