// EventDesk API server
// Decision: Postgres when DATABASE_URL is set, otherwise an in-memory user store (dev mode)
// Decision: The events file is loaded at startup and written once more on shutdown

use anyhow::{Context, Result};
use eventdesk_control_plane::{
    app,
    auth::AuthState,
    config::AppConfig,
    storage::StorageBackend,
    telemetry::{init_telemetry, TelemetryConfig},
};
use eventdesk_core::EventStore;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Configure via environment variables:
    // - RUST_LOG: Log filter (default: "eventdesk_control_plane=debug,eventdesk_core=info,tower_http=debug")
    init_telemetry(&TelemetryConfig::from_env());

    tracing::info!("eventdesk starting...");

    let config = AppConfig::from_env();

    // Initialize user storage
    let db = match &config.database_url {
        Some(url) => {
            let db = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory user store (dev mode, accounts are lost on restart)");
            StorageBackend::in_memory()
        }
    };
    let db = Arc::new(db);
    tracing::info!(dev_mode = db.is_dev_mode(), "User storage ready");

    // Load events
    let store = Arc::new(EventStore::from_config(&config.events));
    match store.events_file() {
        Some(path) => {
            let count = store
                .load_from_file()
                .await
                .with_context(|| format!("Failed to load events from {}", path.display()))?;
            tracing::info!(path = %path.display(), count, "Event store ready");
        }
        None => tracing::info!("EVENTS_FILE is empty, events are kept in memory only"),
    }

    let auth_state = AuthState::new(config.auth.clone(), db);
    tracing::info!(
        ephemeral_secret = config.auth.ephemeral_secret,
        token_lifetime_secs = auth_state.service.jwt().token_lifetime_secs(),
        "Authentication configured"
    );

    let app = app::router(auth_state, store.clone());
    let app = app::with_cors(app, config.cors_origins.clone());

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if config.events.persistence_enabled() {
        store
            .save_to_file()
            .await
            .context("Failed to save events on shutdown")?;
    }
    tracing::info!("eventdesk stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
