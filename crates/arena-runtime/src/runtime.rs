//! The game runtime: one supervised driver task per game.

use std::sync::Arc;

use arena_events::{EventHub, GameId};
use tokio::task::{AbortHandle, JoinHandle};

use crate::handle::{GameShared, TerminalOutcome};
use crate::{Game, GameDriver, GameHandle, GameStatus};

/// Owns one game's record, event hub, and the supervised driver task.
///
/// The driver runs in its own task; a second supervisor task awaits it
/// and applies the terminal outcome. Keeping the abort handle here wires
/// explicit cancellation into `delete` — the task is never detached with
/// no way to cancel or observe it.
pub struct GameRuntime {
    shared: Arc<GameShared>,
    driver_abort: AbortHandle,
    /// Held so the supervisor is observable until the runtime is dropped.
    _supervisor: JoinHandle<()>,
}

impl GameRuntime {
    /// Launches a driver for a fresh game and returns its runtime.
    ///
    /// The record is allocated Pending, transitioned to Running, and the
    /// driver spawned — the caller gets the runtime synchronously while
    /// the simulation proceeds in the background.
    pub async fn launch<D: GameDriver>(
        game_id: GameId,
        event_capacity: usize,
        driver: D,
    ) -> Self {
        let shared = Arc::new(GameShared::new(game_id, event_capacity));
        shared.record.lock().await.transition(GameStatus::Running);

        let handle = GameHandle::new(Arc::clone(&shared));
        let driver_task = tokio::spawn(driver.run(handle));
        let driver_abort = driver_task.abort_handle();

        let supervisor = tokio::spawn(supervise(Arc::clone(&shared), driver_task));

        tracing::info!(%game_id, "game runtime launched");

        Self {
            shared,
            driver_abort,
            _supervisor: supervisor,
        }
    }

    /// Returns the game's id.
    pub fn game_id(&self) -> GameId {
        self.shared.hub.game_id()
    }

    /// Returns the game's event hub.
    pub fn hub(&self) -> EventHub {
        self.shared.hub.clone()
    }

    /// Returns a snapshot of the game record.
    pub async fn snapshot(&self) -> Game {
        self.shared.record.lock().await.clone()
    }

    /// Returns `true` once a terminal outcome has been applied.
    pub async fn is_finished(&self) -> bool {
        self.shared.is_finished().await
    }

    /// Cancels the driver task.
    ///
    /// The supervisor observes the abort and drives the cancelled
    /// terminal path (FAILED record, `game_cancelled` event). Safe to
    /// call repeatedly and safe against a racing natural completion —
    /// the first terminal outcome wins.
    pub fn cancel(&self) {
        self.driver_abort.abort();
    }
}

/// Awaits the driver task and applies exactly one terminal outcome.
///
/// An uncaught panic inside a driver is contained here: it becomes
/// FAILED with the panic message captured, and never crashes the manager
/// or any other game.
async fn supervise(
    shared: Arc<GameShared>,
    driver_task: JoinHandle<Result<Option<serde_json::Value>, crate::DriverError>>,
) {
    let outcome = match driver_task.await {
        Ok(Ok(result)) => TerminalOutcome::Completed(result),
        Ok(Err(e)) => TerminalOutcome::Failed(e.to_string()),
        Err(join_err) if join_err.is_cancelled() => TerminalOutcome::Cancelled,
        Err(join_err) => TerminalOutcome::Failed(panic_message(join_err)),
    };
    shared.finalize(outcome).await;
}

/// Extracts a readable message from a panicked driver task.
fn panic_message(join_err: tokio::task::JoinError) -> String {
    match join_err.try_into_panic() {
        Ok(panic) => {
            if let Some(s) = panic.downcast_ref::<&str>() {
                format!("driver panicked: {s}")
            } else if let Some(s) = panic.downcast_ref::<String>() {
                format!("driver panicked: {s}")
            } else {
                "driver panicked".to_string()
            }
        }
        Err(join_err) => format!("driver task failed: {join_err}"),
    }
}
