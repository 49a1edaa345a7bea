//! Error types for the stream layer.

use arena_events::GameId;

/// Errors that can occur during observer delivery operations.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The observer's queue closed before or during catch-up.
    #[error("observer connection for game {0} closed during attach")]
    ConnectionClosed(GameId),
}
