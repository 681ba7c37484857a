//! Chicken game backend binary entrypoint wiring REST, PostgreSQL and the
//! cleanup task.

use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chicken_game_back::config::AppConfig;
use chicken_game_back::dao::store;
use chicken_game_back::routes;
use chicken_game_back::services::cleanup;
use chicken_game_back::state::{AppState, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    let app_state = AppState::connect(&config)
        .await
        .context("connecting to PostgreSQL")?;

    store::run_migrations(app_state.db())
        .await
        .context("running migrations")?;

    // Cooperative stop signal for the cleanup task.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(cleanup::run(app_state.clone(), shutdown_rx));

    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    let _ = shutdown_tx.send(true);
    info!("server stopped");

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
