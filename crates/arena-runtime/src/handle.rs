//! The write-side handles shared between a driver and its runtime.

use std::sync::Arc;

use arena_events::{
    EventHub, GameId, EVENT_ERROR, EVENT_GAME_CANCELLED, EVENT_GAME_ENDED,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::{Game, GameStatus};

/// The single terminal outcome of a game.
#[derive(Debug, Clone)]
pub(crate) enum TerminalOutcome {
    Completed(Option<Value>),
    Failed(String),
    Cancelled,
}

impl TerminalOutcome {
    fn status(&self) -> GameStatus {
        match self {
            Self::Completed(_) => GameStatus::Completed,
            Self::Failed(_) | Self::Cancelled => GameStatus::Failed,
        }
    }
}

/// State shared between the manager entry, the supervisor task, and the
/// driver's [`GameHandle`].
///
/// The record mutex is the per-game lock from the concurrency model:
/// status and payload mutations for one game are serialized here and
/// never contend with other games.
pub(crate) struct GameShared {
    pub(crate) record: Mutex<Game>,
    pub(crate) hub: EventHub,
    /// First terminal report wins; later reports are ignored.
    terminal: Mutex<Option<TerminalOutcome>>,
}

impl GameShared {
    pub(crate) fn new(game_id: GameId, event_capacity: usize) -> Self {
        Self {
            record: Mutex::new(Game::new(game_id)),
            hub: EventHub::with_capacity(game_id, event_capacity),
            terminal: Mutex::new(None),
        }
    }

    /// Applies a terminal outcome exactly once.
    ///
    /// Updates the record atomically and publishes the single terminal
    /// event. Any report after the first — a buggy driver reporting twice,
    /// or a cancellation racing a natural completion — is dropped.
    pub(crate) async fn finalize(&self, outcome: TerminalOutcome) {
        {
            let mut terminal = self.terminal.lock().await;
            if terminal.is_some() {
                tracing::debug!(
                    game_id = %self.hub.game_id(),
                    "ignoring duplicate terminal report"
                );
                return;
            }
            *terminal = Some(outcome.clone());
        }

        let status = outcome.status();
        {
            let mut record = self.record.lock().await;
            record.transition(status);
            match &outcome {
                TerminalOutcome::Completed(result) => {
                    record.result = result.clone();
                }
                TerminalOutcome::Failed(message) => {
                    record.error = Some(message.clone());
                }
                TerminalOutcome::Cancelled => {
                    record.error = Some("game cancelled".to_string());
                }
            }
        }

        let (event_type, data) = match outcome {
            TerminalOutcome::Completed(result) => (
                EVENT_GAME_ENDED,
                json!({"status": status, "result": result}),
            ),
            TerminalOutcome::Failed(message) => {
                (EVENT_ERROR, json!({"status": status, "message": message}))
            }
            TerminalOutcome::Cancelled => (
                EVENT_GAME_CANCELLED,
                json!({"status": status, "message": "game cancelled"}),
            ),
        };
        self.hub.publish(event_type, data).await;

        tracing::info!(
            game_id = %self.hub.game_id(),
            %status,
            %event_type,
            "game reached terminal state"
        );
    }

    pub(crate) async fn is_finished(&self) -> bool {
        self.terminal.lock().await.is_some()
    }
}

/// The narrow interface handed to a running driver.
///
/// Cheap to clone. A driver can publish domain events, mutate its opaque
/// payload, and report a terminal outcome — nothing else. It never sees
/// the manager, the registry, or other games.
#[derive(Clone)]
pub struct GameHandle {
    shared: Arc<GameShared>,
}

impl GameHandle {
    pub(crate) fn new(shared: Arc<GameShared>) -> Self {
        Self { shared }
    }

    /// Returns the id of the game this handle belongs to.
    pub fn game_id(&self) -> GameId {
        self.shared.hub.game_id()
    }

    /// Publishes a domain event into the game's hub.
    pub async fn publish_event(&self, event_type: &str, data: Value) {
        self.shared.hub.publish(event_type, data).await;
    }

    /// Mutates the game's opaque payload under the per-game lock.
    pub async fn mutate_payload(&self, mutate: impl FnOnce(&mut Value)) {
        self.shared.record.lock().await.touch_payload(mutate);
    }

    /// Returns a snapshot of the game record.
    pub async fn snapshot(&self) -> Game {
        self.shared.record.lock().await.clone()
    }

    /// Reports the game's terminal outcome.
    ///
    /// Only `Completed` and `Failed` are accepted; anything else is a
    /// driver bug and is ignored with a warning. The first terminal
    /// report (from here or from the driver's return value) wins.
    pub async fn report_terminal(
        &self,
        status: GameStatus,
        payload: Option<Value>,
    ) {
        let outcome = match status {
            GameStatus::Completed => TerminalOutcome::Completed(payload),
            GameStatus::Failed => {
                let message = match payload {
                    Some(Value::String(s)) => s,
                    Some(other) => other.to_string(),
                    None => "driver reported failure".to_string(),
                };
                TerminalOutcome::Failed(message)
            }
            other => {
                tracing::warn!(
                    game_id = %self.game_id(),
                    status = %other,
                    "driver reported a non-terminal status, ignoring"
                );
                return;
            }
        };
        self.shared.finalize(outcome).await;
    }
}
