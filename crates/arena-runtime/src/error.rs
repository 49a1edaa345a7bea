//! Error types for the runtime layer.

use arena_events::GameId;

/// Errors that can occur during game manager operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No game with this id exists (or it was already deleted).
    #[error("game {0} not found")]
    NotFound(GameId),

    /// The create-game config was malformed or rejected by the driver
    /// factory.
    #[error("invalid game config: {0}")]
    ConfigInvalid(String),
}
