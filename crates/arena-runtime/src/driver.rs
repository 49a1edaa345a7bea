//! The `GameDriver` trait — the plugin point for game backends.
//!
//! The core treats a driver as an opaque concurrent task: it is handed a
//! [`GameHandle`] and runs the whole simulation to completion, emitting
//! domain events along the way. No game rules live in this workspace.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::GameHandle;

/// Errors a driver can report to the runtime.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The caller-supplied config was rejected by the driver factory.
    #[error("invalid config: {0}")]
    Config(String),

    /// The simulation terminated abnormally.
    #[error("driver failed: {0}")]
    Failed(String),
}

/// The trait game backends implement.
///
/// `build` is the driver factory: it validates the caller's config and
/// constructs the driver. `run` consumes the driver and executes the
/// simulation as an independent task — it may block, spin, or perform
/// I/O; the runtime makes no assumption beyond `Send`.
///
/// Completion contract: returning `Ok(result)` reports COMPLETED,
/// `Err(_)` reports FAILED. A driver may instead call
/// [`GameHandle::report_terminal`] early; whichever terminal report
/// arrives first wins and all later ones are ignored.
pub trait GameDriver: Sized + Send + 'static {
    /// Game-specific creation config, deserialized from the opaque JSON
    /// body of a create-game request.
    type Config: DeserializeOwned + Clone + Send + Sync;

    /// Validates the config and constructs the driver.
    ///
    /// # Errors
    /// Returns [`DriverError::Config`] if the config cannot be accepted.
    fn build(config: Self::Config) -> Result<Self, DriverError>;

    /// Runs the simulation to completion.
    ///
    /// The returned future is spawned as its own task; a panic inside it
    /// is captured as FAILED and never crashes the manager or other
    /// games.
    fn run(
        self,
        handle: GameHandle,
    ) -> impl Future<Output = Result<Option<Value>, DriverError>> + Send;
}
