use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use steward_core::{
    config_path, create_authenticator, load_config, validate_config, Authenticator, BridgeClient,
    Collaborators, Engine, JsonFileStore, MinecraftProber, TenantSettings, YtDlpResolver,
};
use steward_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("steward {} starting", VERSION);

    let config_path = config_path();

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Tenant settings: {:?}", config.storage.tenants_path);

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Load tenant settings
    let store = Arc::new(JsonFileStore::new(config.storage.tenants_path.clone()));
    let settings = Arc::new(TenantSettings::load(store).context("Failed to load tenant settings")?);
    info!("Loaded settings for {} tenants", settings.tenants().len());

    // External collaborators
    let bridge = Arc::new(
        BridgeClient::new(config.bridge.clone()).context("Failed to create bridge client")?,
    );
    info!("Platform bridge at {}", config.bridge.url);

    let collaborators = Collaborators {
        platform: bridge.clone(),
        voice: bridge,
        resolver: Arc::new(YtDlpResolver::new(config.media.clone())),
        prober: Arc::new(MinecraftProber::new(config.prober.clone())),
    };

    // Start the engine loops
    let engine = Arc::new(Engine::new(&config.engine, settings, collaborators));
    engine.start();
    info!(
        "Status displays every {}s, drawings checked every {}s",
        config.engine.status_interval_secs, config.engine.drawing_interval_secs
    );

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        Arc::clone(&engine),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    engine.stop();
    info!("Engine loops stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
