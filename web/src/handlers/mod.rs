//! Shared HTTP handlers.

pub mod health;

pub use health::{HealthReport, health_check, readiness};
