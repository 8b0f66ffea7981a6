//! # Seatbook Core
//!
//! Domain types and service contracts for the Seatbook event-ticketing platform.
//!
//! The crate is deliberately free of I/O. It defines:
//!
//! - **Types**: identifiers, [`Money`](types::Money), events, bookings, payments
//! - **Inventory**: the bounded seat counter and its debit/credit arithmetic
//! - **Errors**: the [`LedgerError`] taxonomy shared by every layer
//! - **Contracts**: dyn-compatible traits implemented by the storage crates
//!   (`seatbook-postgres` for production, `seatbook-testing` for tests)
//! - **Passwords**: Argon2id hashing for account credentials
//! - **Retry**: bounded retry with backoff for transient isolation conflicts
//!
//! ## The Seat-Inventory Ledger
//!
//! Every event carries `total_seats` and `available_seats`. The ledger keeps
//! the capacity-conservation invariant:
//!
//! ```text
//! available_seats + Σ(seats of confirmed bookings) = total_seats
//! ```
//!
//! - **Debit** reserves seats for a new booking (`available -= n`)
//! - **Credit** releases the seats of a cancelled booking (`available += n`)
//!
//! Both are executed as one atomic read-check-write by the storage layer.
//!
//! ## Example
//!
//! ```
//! use seatbook_core::inventory::Inventory;
//! use seatbook_core::LedgerError;
//!
//! let inventory = Inventory::new(10, 10).unwrap();
//! let after = inventory.debit(5).unwrap();
//! assert_eq!(after.available_seats(), 5);
//!
//! let err = after.debit(6).unwrap_err();
//! assert!(matches!(err, LedgerError::InsufficientCapacity { available: 5, requested: 6 }));
//! ```

pub mod catalog;
pub mod checkin;
pub mod directory;
pub mod environment;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod password;
pub mod payment;
pub mod readiness;
pub mod retry;
pub mod types;

pub use catalog::EventCatalog;
pub use checkin::CheckInStore;
pub use directory::UserDirectory;
pub use error::{LedgerError, Result};
pub use ledger::{BookingQuery, Ledger};
pub use password::{Password, PasswordHashing};
pub use payment::PaymentStore;
pub use readiness::Readiness;
pub use retry::RetryPolicy;

/// Boxed future returned by every service contract.
///
/// The contracts return boxed futures instead of `async fn` so they stay
/// dyn-compatible and can be shared as `Arc<dyn Trait>` across handlers.
pub type BoxFuture<'a, T> = futures::future::BoxFuture<'a, T>;
