//! # Seatbook
//!
//! HTTP server for the Seatbook event-ticketing platform: organizers publish
//! events with a fixed seat capacity, explorers book and cancel seats, pay
//! for bookings and check in at the door.
//!
//! The core of the service is the seat-inventory ledger. Booking debits
//! seats and cancelling credits them back, each as one atomic read-check-write
//! in the storage layer, so concurrent bookings never oversell an event.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐   ┌─────────────────────┐
//! │  api/*       │──▶│  AppState          │──▶│  seatbook-postgres  │
//! │  handlers    │   │  Arc<dyn Ledger>   │   │  (FOR UPDATE txns)  │
//! │  auth/*      │   │  Arc<dyn Catalog>… │   └─────────────────────┘
//! └──────────────┘   └────────────────────┘   ┌─────────────────────┐
//!                                          └─▶│  seatbook-testing   │
//!                                             │  (InMemoryStore)    │
//!                                             └─────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: environment configuration
//! - [`server`]: state, router, health endpoints
//! - [`auth`]: bearer-session extractors
//! - [`api`]: REST handlers
//! - [`metrics`]: Prometheus exporter and business metric descriptions

pub mod api;
pub mod auth;
pub mod config;
pub mod metrics;
pub mod server;

pub use config::Config;
pub use server::{AppState, build_router};
