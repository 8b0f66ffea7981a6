//! # Seatbook Testing
//!
//! Testing utilities for Seatbook:
//! - [`InMemoryStore`]: one value implementing every storage contract
//! - [`mocks::FixedClock`]: deterministic time
//!
//! ## Example
//!
//! ```
//! use seatbook_testing::InMemoryStore;
//! use seatbook_core::Ledger;
//! use seatbook_core::types::{Money, UserId};
//!
//! # async fn example() -> Result<(), seatbook_core::LedgerError> {
//! let store = InMemoryStore::new();
//! let event_id = store.seed_event(10, Money::from_cents(1500)).await;
//!
//! let booking = store.debit(event_id, 4, UserId::new()).await?;
//! assert_eq!(booking.total_price, Money::from_cents(6000));
//! assert!(store.invariant_holds(event_id).await);
//! # Ok(())
//! # }
//! ```

pub mod store;

pub use store::{InMemoryStore, TEST_PASSWORD, register_user};

/// Mock implementations of environment traits.
pub mod mocks {
    use chrono::{DateTime, Utc};
    use seatbook_core::environment::Clock;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use seatbook_testing::mocks::FixedClock;
    /// use seatbook_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }
}
