pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::config::{Config, DatabaseConfig};
use crate::db::{ItemRepository, PostgresItemStore, SqliteItemStore};
use crate::middleware::cors_middleware;
use crate::routes::{health, items};

/// Store handle shared by every handler.
pub type DynItemStore = Arc<dyn ItemRepository>;

pub fn create_app(store: DynItemStore) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/inventory", get(items::list).post(items::create))
        .route("/api/v1/inventory/", get(items::list).post(items::create))
        .route(
            "/api/v1/inventory/:id",
            get(items::get_by_id)
                .put(items::update)
                .delete(items::delete),
        )
        .layer(Extension(store))
        .layer(from_fn(cors_middleware))
        .layer(TraceLayer::new_for_http())
}

pub async fn connect_store(config: &Config) -> anyhow::Result<DynItemStore> {
    let store: DynItemStore = match &config.database {
        DatabaseConfig::Url(url) if config.database.is_sqlite() => Arc::new(
            SqliteItemStore::from_url(url)
                .await
                .context("failed to open SQLite database")?,
        ),
        DatabaseConfig::Url(url) => Arc::new(
            PostgresItemStore::from_url(url, config.max_connections)
                .await
                .context("failed to connect to PostgreSQL")?,
        ),
        DatabaseConfig::Params {
            host,
            port,
            user,
            password,
            database,
        } => Arc::new(
            PostgresItemStore::from_params(
                host,
                *port,
                user,
                password,
                database,
                config.max_connections,
            )
            .await
            .context("failed to connect to PostgreSQL")?,
        ),
    };
    tracing::info!("Connected to the database");
    Ok(store)
}

pub async fn run_app(config: Config) -> anyhow::Result<()> {
    let store = connect_store(&config).await?;
    let app = create_app(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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
