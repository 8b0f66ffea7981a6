//! Readiness probe contract.

use crate::BoxFuture;
use crate::error::Result;

/// A backing service the server needs before it can take traffic.
pub trait Readiness: Send + Sync {
    /// Short name reported by the readiness endpoint.
    fn component(&self) -> &'static str;

    /// Checks that the service answers.
    ///
    /// # Errors
    ///
    /// Returns the storage error when the service is unreachable.
    fn check_ready(&self) -> BoxFuture<'_, Result<()>>;
}
