use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "STEWARD_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Overrides use `__` between section and key, e.g.
/// `STEWARD_ENGINE__STATUS_INTERVAL_SECS=60`.
const ENV_PREFIX: &str = "STEWARD_";
const ENV_SEPARATOR: &str = "__";

/// Config file path from `STEWARD_CONFIG`, or `config.toml`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load the config file, with `STEWARD_` environment overrides on top.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Parse a TOML document without environment overrides.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
