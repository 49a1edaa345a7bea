//! The game record and its lifecycle state machine.

use arena_events::GameId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// The lifecycle status of a game.
///
/// Transitions are monotonic — no transition out of a terminal state:
///
/// ```text
/// Pending → Running → Completed
///                   ↘ Failed
/// ```
///
/// - **Pending**: record allocated, driver not yet launched.
/// - **Running**: driver task is executing the simulation.
/// - **Completed**: driver finished and reported a result.
/// - **Failed**: driver returned an error, panicked, or was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl GameStatus {
    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// The record for one game instance.
///
/// Mutated only by its own runtime; everyone else gets snapshots. The
/// `payload` is entirely driver-controlled — the core never inspects its
/// shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Unique id, generated at creation.
    pub game_id: GameId,
    /// Current lifecycle status.
    pub status: GameStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Last mutation of status or payload.
    pub updated_at: DateTime<Utc>,
    /// Opaque driver-controlled state.
    pub payload: Value,
    /// Result payload reported on completion, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error description when the game failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Game {
    /// Creates a fresh Pending record.
    pub fn new(game_id: GameId) -> Self {
        let now = Utc::now();
        Self {
            game_id,
            status: GameStatus::Pending,
            created_at: now,
            updated_at: now,
            payload: Value::Null,
            result: None,
            error: None,
        }
    }

    /// Applies a status transition, refusing invalid ones.
    ///
    /// Invalid transitions are a runtime bug, so they are logged and
    /// rejected rather than propagated — a terminal record must never
    /// move again.
    pub fn transition(&mut self, target: GameStatus) -> bool {
        if !self.status.can_transition_to(target) {
            tracing::warn!(
                game_id = %self.game_id,
                from = %self.status,
                to = %target,
                "rejected invalid status transition"
            );
            return false;
        }
        self.status = target;
        self.updated_at = Utc::now();
        true
    }

    /// Replaces the opaque payload, bumping `updated_at`.
    pub fn touch_payload(&mut self, mutate: impl FnOnce(&mut Value)) {
        mutate(&mut self.payload);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_transitions_are_monotonic() {
        assert!(GameStatus::Pending.can_transition_to(GameStatus::Running));
        assert!(GameStatus::Running.can_transition_to(GameStatus::Completed));
        assert!(GameStatus::Running.can_transition_to(GameStatus::Failed));

        assert!(!GameStatus::Pending.can_transition_to(GameStatus::Completed));
        assert!(!GameStatus::Completed.can_transition_to(GameStatus::Running));
        assert!(!GameStatus::Failed.can_transition_to(GameStatus::Completed));
        assert!(!GameStatus::Completed.can_transition_to(GameStatus::Failed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!GameStatus::Pending.is_terminal());
        assert!(!GameStatus::Running.is_terminal());
        assert!(GameStatus::Completed.is_terminal());
        assert!(GameStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(GameStatus::Running).expect("serialize"),
            json!("running")
        );
    }

    #[test]
    fn test_record_rejects_transition_out_of_terminal() {
        let mut game = Game::new(GameId::new());
        assert!(game.transition(GameStatus::Running));
        assert!(game.transition(GameStatus::Completed));
        assert!(!game.transition(GameStatus::Failed));
        assert_eq!(game.status, GameStatus::Completed);
    }

    #[test]
    fn test_touch_payload_bumps_updated_at() {
        let mut game = Game::new(GameId::new());
        let before = game.updated_at;
        game.touch_payload(|p| *p = json!({"turn": 1}));
        assert_eq!(game.payload, json!({"turn": 1}));
        assert!(game.updated_at >= before);
    }
}
