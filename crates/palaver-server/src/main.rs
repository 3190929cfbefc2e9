mod config;

use std::sync::Arc;

use chrono::TimeDelta;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use palaver_api::clock::SystemClock;
use palaver_api::routes;
use palaver_api::state::AppState;
use palaver_api::sweeper;
use palaver_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
            |_| "palaver=debug,palaver_api=debug,palaver_db=info,tower_http=debug".into(),
        ))
        .init();

    let config = Config::from_env()?;

    let db = Database::open(&config.db_path)?;
    let state = AppState::new(Arc::new(db), Arc::new(SystemClock), config.store_timeout);

    // Background presence sweep
    let threshold = TimeDelta::from_std(config.inactivity_threshold)?;
    tokio::spawn(sweeper::run_presence_sweep(
        state.registry.clone(),
        config.sweep_interval,
        threshold,
    ));
    info!(
        "Presence sweep every {:?}, inactivity threshold {:?}",
        config.sweep_interval, config.inactivity_threshold
    );

    // Browser front-ends poll the API from other origins
    let app = routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Palaver server listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::warn!("SIGTERM handler unavailable ({}), Ctrl+C only", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
