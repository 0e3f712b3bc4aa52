use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleetsafe_core::{
    create_summarizer, fleet::sample_fleet, load_config, validate_config, Config, FleetData,
    InMemoryFleet, MissionManager, MissionOrchestrator, MissionRegistry,
};
use fleetsafe_server::{
    api::{create_router, spawn_event_forwarder, spawn_heartbeat, WsBroadcaster},
    state::AppState,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Interval between WebSocket heartbeats
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

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

    // Determine config path
    let config_path = std::env::var("FLEETSAFE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded successfully"
    );

    let data = load_dataset(&config)?;
    info!(
        drivers = data.drivers().len(),
        vehicles = data.vehicles().len(),
        events = data.events().len(),
        as_of = %data.as_of(),
        "Fleet dataset ready"
    );

    let summarizer =
        create_summarizer(config.summarizer.as_ref()).context("Failed to create summarizer")?;
    info!("Using summarizer: {}", summarizer.name());

    let registry = MissionRegistry::with_default_pipelines();
    let orchestrator = Arc::new(MissionOrchestrator::new(
        data,
        registry,
        summarizer,
        config.missions.clone(),
        config.scoring.clone(),
    ));
    let manager = Arc::new(MissionManager::new(orchestrator));

    // Forward mission events to WebSocket clients
    let ws_broadcaster = WsBroadcaster::default();
    let forwarder = spawn_event_forwarder(&manager, ws_broadcaster.clone());
    let heartbeat = spawn_heartbeat(ws_broadcaster.clone(), HEARTBEAT_INTERVAL);
    info!("WebSocket broadcaster initialized");

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&manager),
        ws_broadcaster,
    ));

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    let cancelled = manager.cancel_all();
    if cancelled > 0 {
        info!("Cancelled {} running missions", cancelled);
    }
    heartbeat.abort();
    forwarder.abort();

    Ok(())
}

/// Load the configured snapshot, or build the sample fleet.
fn load_dataset(config: &Config) -> Result<Arc<dyn FleetData>> {
    match &config.dataset.path {
        Some(path) => {
            info!("Loading fleet snapshot from {:?}", path);
            let fleet = InMemoryFleet::from_json_file(path)
                .with_context(|| format!("Failed to load fleet snapshot from {:?}", path))?;
            Ok(Arc::new(fleet))
        }
        None => {
            info!(
                "No dataset path configured, using a sample fleet of {} drivers",
                config.dataset.sample_drivers
            );
            Ok(Arc::new(InMemoryFleet::new(sample_fleet(
                config.dataset.sample_drivers,
            ))))
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
