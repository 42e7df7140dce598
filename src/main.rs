//! CineMatch session backend entrypoint wiring REST, storage, and documentation layers.

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod routes;
mod services;
mod session;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = config::AppConfig::from_env();
    let app_state = AppState::new(config.api_token.clone());

    spawn_storage_supervisor(app_state.clone(), &config);
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let addr = config.listen_addr();
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Keep the embedded sled store connected in the background.
#[cfg(feature = "sled-store")]
fn spawn_storage_supervisor(state: state::SharedState, config: &config::AppConfig) {
    use std::sync::Arc;

    use dao::session_store::{SessionStore, sled::SledSessionStore};

    let data_dir = config.data_dir.clone();
    tokio::spawn(services::storage_supervisor::run(state, move || {
        let data_dir = data_dir.clone();
        async move {
            let store = SledSessionStore::open(&data_dir)?;
            Ok(Arc::new(store) as Arc<dyn SessionStore>)
        }
    }));
}

/// Fall back to the in-memory store when the crate is built without sled.
#[cfg(not(feature = "sled-store"))]
fn spawn_storage_supervisor(state: state::SharedState, _config: &config::AppConfig) {
    use std::sync::Arc;

    use dao::session_store::{SessionStore, memory::MemorySessionStore};

    tokio::spawn(services::storage_supervisor::run(state, move || async move {
        Ok(Arc::new(MemorySessionStore::new()) as Arc<dyn SessionStore>)
    }));
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: state::SharedState) -> Router<()> {
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
