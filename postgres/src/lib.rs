//! `PostgreSQL` storage for Seatbook.
//!
//! [`PostgresStore`] implements every service contract from `seatbook-core`
//! on a single connection pool:
//!
//! - [`Ledger`](seatbook_core::Ledger): debit/credit as `SELECT ... FOR UPDATE` transactions
//! - [`EventCatalog`](seatbook_core::EventCatalog): event CRUD and the seat delta primitive
//! - [`BookingQuery`](seatbook_core::BookingQuery), [`CheckInStore`](seatbook_core::CheckInStore),
//!   [`PaymentStore`](seatbook_core::PaymentStore), [`UserDirectory`](seatbook_core::UserDirectory)
//!
//! Queries are checked at runtime (`sqlx::query_as` + `bind`), so the crate
//! builds without a live database.
//!
//! # Example
//!
//! ```no_run
//! use seatbook_postgres::PostgresStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresStore::new("postgres://localhost/seatbook").await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

mod bookings;
mod catalog;
mod checkins;
mod error;
mod ledger;
mod payments;
mod rows;
mod users;

use seatbook_core::error::{LedgerError, Result};
use seatbook_core::password::PasswordHashing;
use seatbook_core::retry::RetryPolicy;
use seatbook_core::{BoxFuture, Readiness};
use sqlx::PgPool;

pub use error::is_conflict_code;

/// Seatbook storage backed by `PostgreSQL`.
///
/// Cloning is cheap: clones share the connection pool.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
    retry: RetryPolicy,
    hashing: PasswordHashing,
}

impl PostgresStore {
    /// Connect to `database_url` with a default pool.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] if the connection cannot be established.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| LedgerError::Database(format!("Failed to connect: {e}")))?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool, using the default retry policy and Argon2
    /// parameters.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            retry: RetryPolicy::default(),
            hashing: PasswordHashing::default(),
        }
    }

    /// Replace the retry policy used for ledger transactions.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the password hashing cost used for new hashes.
    #[must_use]
    pub fn with_password_hashing(mut self, hashing: PasswordHashing) -> Self {
        self.hashing = hashing;
        self
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LedgerError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Round-trip a trivial query, for readiness checks.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] if the database is unreachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(error::db_error("Database ping failed"))?;
        Ok(())
    }
}

impl Readiness for PostgresStore {
    fn component(&self) -> &'static str {
        "database"
    }

    fn check_ready(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.ping())
    }
}
