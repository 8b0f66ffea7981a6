//! Seatbook HTTP server.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use seatbook::{
    AppState, Config, build_router,
    metrics::MetricsServer,
    server::routes::cors_layer,
};
use seatbook_postgres::PostgresStore;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Seatbook HTTP server");
    info!(
        max_connections = config.postgres.max_connections,
        metrics_port = config.server.metrics_port,
        "Configuration loaded"
    );

    // Database pool
    let connect_options = PgConnectOptions::from_str(&config.postgres.url)
        .context("Invalid DATABASE_URL")?
        .options([(
            "statement_timeout",
            format!("{}s", config.postgres.statement_timeout),
        )]);
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .min_connections(config.postgres.min_connections)
        .acquire_timeout(Duration::from_secs(config.postgres.connect_timeout))
        .idle_timeout(Some(Duration::from_secs(config.postgres.idle_timeout)))
        .connect_with(connect_options)
        .await
        .context("Failed to connect to PostgreSQL")?;
    info!("PostgreSQL connected");

    let store = PostgresStore::from_pool(pool)
        .with_retry_policy(config.ledger.retry_policy())
        .with_password_hashing(
            config
                .auth
                .password_hashing()
                .context("Invalid AUTH_PASSWORD_MEMORY_KIB/AUTH_PASSWORD_ITERATIONS")?,
        );
    store.migrate().await.context("Failed to run migrations")?;
    info!("Migrations complete");

    // Metrics
    let metrics_addr = config
        .server
        .metrics_addr()
        .context("Invalid METRICS_HOST/METRICS_PORT")?;
    let metrics_server = MetricsServer::new(metrics_addr);
    if let Err(e) = metrics_server.start().await {
        warn!(error = %e, "Metrics server unavailable, continuing without it");
    }

    // HTTP server
    let state = AppState::from_store(store, config.auth.session_ttl());
    let app = build_router(state, cors_layer(&config.server.cors_origins));

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(address = %addr, "HTTP server listening");

    let shutdown_timeout = config.server.shutdown_timeout();
    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };

    // Bound the drain: in-flight requests get `SHUTDOWN_TIMEOUT` after the signal.
    tokio::select! {
        result = server => result.context("HTTP server error")?,
        () = async {
            shutdown_signal().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!(timeout = ?shutdown_timeout, "Graceful shutdown timed out");
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (in production environments)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
