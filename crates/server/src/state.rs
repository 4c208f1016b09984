use std::sync::Arc;
use steward_core::{Authenticator, Config, Engine, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    engine: Arc<Engine>,
}

impl AppState {
    pub fn new(config: Config, authenticator: Arc<dyn Authenticator>, engine: Arc<Engine>) -> Self {
        Self {
            config,
            authenticator,
            engine,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}
