//! Business metrics and the Prometheus scrape endpoint.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `seatbook_bookings_total{status}` - Bookings by outcome (confirmed, rejected, cancelled)
//! - `seatbook_seats_debited_total` - Seats reserved by confirmed bookings
//! - `seatbook_seats_credited_total` - Seats released by cancellations
//! - `seatbook_ledger_conflicts_total` - Ledger transactions aborted by lock conflicts
//! - `seatbook_payments_total` - Recorded payments
//! - `seatbook_events_created_total` - Published events
//!
//! The counters are incremented by the storage layer; this module describes
//! them and serves the Prometheus exposition on its own port.
//!
//! # Example
//!
//! ```rust,no_run
//! use seatbook::metrics::MetricsServer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start().await?;
//! // Metrics available at http://localhost:9090/metrics
//! # Ok(())
//! # }
//! ```

use axum::{Router, routing::get};
use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
    /// Failed to bind HTTP server
    #[error("Failed to bind metrics server: {0}")]
    Bind(#[from] std::io::Error),
}

/// Prometheus metrics server.
///
/// Exposes `GET /metrics` on a dedicated address for Prometheus scraping.
pub struct MetricsServer {
    addr: SocketAddr,
}

impl MetricsServer {
    /// Create a new metrics server bound to `addr` once started.
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Install the Prometheus recorder and spawn the scrape endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the recorder cannot be installed or the address
    /// cannot be bound.
    pub async fn start(&self) -> Result<(), MetricsError> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| MetricsError::Install(e.to_string()))?;
        register_business_metrics();

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        let app = Router::new().route("/metrics", get(move || async move { handle.render() }));

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Metrics server stopped");
            }
        });

        tracing::info!(addr = %self.addr, "Metrics server started");
        Ok(())
    }
}

/// Register descriptions for every business metric.
///
/// Called once at startup, after the recorder is installed.
pub fn register_business_metrics() {
    describe_counter!(
        "seatbook_bookings_total",
        "Total number of bookings by status (confirmed, rejected, cancelled)"
    );
    describe_counter!(
        "seatbook_seats_debited_total",
        "Total number of seats reserved by confirmed bookings"
    );
    describe_counter!(
        "seatbook_seats_credited_total",
        "Total number of seats released by cancelled bookings"
    );
    describe_counter!(
        "seatbook_ledger_conflicts_total",
        "Ledger transactions aborted by serialization or lock conflicts"
    );
    describe_counter!("seatbook_payments_total", "Total number of recorded payments");
    describe_counter!(
        "seatbook_events_created_total",
        "Total number of events created"
    );

    tracing::info!("Business metrics registered");
}
