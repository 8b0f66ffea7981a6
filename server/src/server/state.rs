//! Application state for the Seatbook HTTP server.

use chrono::Duration;
use seatbook_core::{
    BookingQuery, CheckInStore, EventCatalog, Ledger, PaymentStore, Readiness, UserDirectory,
};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Every service is a trait object, so the same router runs on
/// `PostgresStore` in production and `InMemoryStore` in tests. Cloning is
/// cheap (one `Arc` per service).
#[derive(Clone)]
pub struct AppState {
    /// Seat debit/credit
    pub ledger: Arc<dyn Ledger>,
    /// Booking reads
    pub bookings: Arc<dyn BookingQuery>,
    /// Event CRUD
    pub catalog: Arc<dyn EventCatalog>,
    /// QR check-ins
    pub check_ins: Arc<dyn CheckInStore>,
    /// Payments and payout details
    pub payments: Arc<dyn PaymentStore>,
    /// Users and sessions
    pub users: Arc<dyn UserDirectory>,
    /// Dependency probed by `/ready`
    pub readiness: Arc<dyn Readiness>,
    /// Lifetime of sessions issued at signup
    pub session_ttl: Duration,
}

impl AppState {
    /// Builds the state from one store implementing every service.
    #[must_use]
    pub fn from_store<S>(store: S, session_ttl: Duration) -> Self
    where
        S: Ledger
            + BookingQuery
            + EventCatalog
            + CheckInStore
            + PaymentStore
            + UserDirectory
            + Readiness
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            ledger: store.clone(),
            bookings: store.clone(),
            catalog: store.clone(),
            check_ins: store.clone(),
            payments: store.clone(),
            users: store.clone(),
            readiness: store,
            session_ttl,
        }
    }
}
