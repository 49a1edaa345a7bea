//! Game lifecycle management for Arena.
//!
//! Each game runs its driver as an isolated Tokio task supervised by a
//! [`GameRuntime`]; the [`GameManager`] creates, looks up, lists, and
//! tears down runtimes.
//!
//! # Key types
//!
//! - [`GameDriver`] — the trait game backends implement
//! - [`GameManager`] — registry of all running games
//! - [`GameRuntime`] — one game's record, hub, and supervised driver task
//! - [`GameHandle`] — the narrow interface handed to a running driver
//! - [`GameStatus`] — lifecycle state machine

mod driver;
mod error;
mod game;
mod handle;
mod manager;
mod runtime;

pub use driver::{DriverError, GameDriver};
pub use error::GameError;
pub use game::{Game, GameStatus};
pub use handle::GameHandle;
pub use manager::GameManager;
pub use runtime::GameRuntime;
