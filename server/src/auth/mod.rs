//! Request authentication.
//!
//! Sessions are opaque UUID bearer tokens issued at signup. The extractors in
//! [`middleware`] resolve them through the [`UserDirectory`] and hand
//! handlers a trusted `(user_id, role)`.
//!
//! [`UserDirectory`]: seatbook_core::UserDirectory

pub mod middleware;

pub use middleware::{RequireOrganizer, SessionUser};
