//! Connection registry: attach/detach and per-observer event delivery.

use std::collections::HashMap;
use std::sync::Arc;

use arena_events::{EventFrame, EventHub, GameId};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;

use crate::{ObserverId, ObserverSender, StreamError};

struct Observer {
    sender: ObserverSender,
    /// Abort handle for the forward task; `None` when the stream was
    /// already terminal at attach time and no live task was needed.
    forward: Option<AbortHandle>,
}

type ObserverMap = HashMap<GameId, HashMap<ObserverId, Observer>>;

/// Tracks live observer connections per game and delivers events to each.
///
/// Cheap to clone — all clones share one map. The map lock is only held
/// for insert/remove/snapshot; actual delivery runs in per-observer
/// forward tasks so one game's observers never contend with another's,
/// and one observer never blocks its siblings.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    observers: Arc<Mutex<ObserverMap>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an observer to a game's event stream.
    ///
    /// Synchronously queues every retained event in sequence order
    /// (catch-up), then spawns a forward task for live events. The hub's
    /// subscription handoff guarantees an event published while attach is
    /// in flight is delivered exactly once and in order.
    ///
    /// If the retained stream already ends in a terminal frame the
    /// observer gets the full replay and no live task — the socket layer
    /// closes it after the terminal frame.
    ///
    /// # Errors
    /// Returns [`StreamError::ConnectionClosed`] if the observer's queue
    /// is gone before catch-up finishes.
    pub async fn attach(
        &self,
        hub: &EventHub,
        sender: ObserverSender,
    ) -> Result<ObserverId, StreamError> {
        let game_id = hub.game_id();
        let observer_id = ObserverId::next();
        let (catch_up, mut live) = hub.subscribe_from(0).await;

        let mut last_sequence = 0;
        let mut caught_terminal = false;
        for event in &catch_up {
            last_sequence = event.sequence;
            caught_terminal = event.is_terminal();
            sender
                .send(event.to_frame())
                .map_err(|_| StreamError::ConnectionClosed(game_id))?;
        }

        tracing::debug!(
            %game_id,
            %observer_id,
            caught_up = catch_up.len(),
            "observer attached"
        );

        if caught_terminal {
            return Ok(observer_id);
        }

        // Lock before spawning: the forward task's self-detach needs this
        // lock too, so the entry is always in the map before the task can
        // remove it.
        let mut observers = self.observers.lock().await;
        let forward = {
            let registry = self.clone();
            let sender = sender.clone();
            tokio::spawn(async move {
                forward_live(
                    registry,
                    game_id,
                    observer_id,
                    sender,
                    &mut live,
                    last_sequence,
                )
                .await;
            })
            .abort_handle()
        };

        observers.entry(game_id).or_default().insert(
            observer_id,
            Observer {
                sender,
                forward: Some(forward),
            },
        );
        Ok(observer_id)
    }

    /// Detaches an observer. Idempotent — detaching an unknown or
    /// already-removed observer is a no-op.
    pub async fn detach(&self, game_id: GameId, observer_id: ObserverId) {
        let mut observers = self.observers.lock().await;
        if let Some(game_observers) = observers.get_mut(&game_id) {
            if let Some(observer) = game_observers.remove(&observer_id) {
                if let Some(forward) = observer.forward {
                    forward.abort();
                }
                tracing::debug!(%game_id, %observer_id, "observer detached");
            }
            if game_observers.is_empty() {
                observers.remove(&game_id);
            }
        }
    }

    /// Delivers a frame to every currently attached observer of a game,
    /// best-effort.
    ///
    /// Observers whose queue has closed are detached rather than allowed
    /// to block delivery to the rest.
    pub async fn broadcast(&self, game_id: GameId, frame: &EventFrame) {
        let mut dead = Vec::new();
        {
            let observers = self.observers.lock().await;
            let Some(game_observers) = observers.get(&game_id) else {
                return;
            };
            for (observer_id, observer) in game_observers {
                if observer.sender.send(frame.clone()).is_err() {
                    dead.push(*observer_id);
                }
            }
        }
        for observer_id in dead {
            self.detach(game_id, observer_id).await;
        }
    }

    /// Returns the number of observers currently attached to a game.
    pub async fn active_count(&self, game_id: GameId) -> usize {
        self.observers
            .lock()
            .await
            .get(&game_id)
            .map_or(0, HashMap::len)
    }

    /// Drops all bookkeeping for a game, aborting any straggling forward
    /// tasks.
    ///
    /// On the graceful path forward tasks have already terminated via the
    /// game's terminal frame; this exists for process shutdown and for
    /// cleaning up after the terminal frame has been delivered.
    pub async fn finish_game(&self, game_id: GameId) {
        let removed = self.observers.lock().await.remove(&game_id);
        if let Some(game_observers) = removed {
            for observer in game_observers.into_values() {
                if let Some(forward) = observer.forward {
                    forward.abort();
                }
            }
            tracing::debug!(%game_id, "observer bookkeeping cleared");
        }
    }
}

/// Pumps live events from a hub subscription into one observer's queue.
///
/// Ends when a terminal frame has been forwarded, the hub closes, or the
/// observer's queue is dropped — and removes the observer's registry
/// entry on the way out. The last-delivered sequence guard drops anything
/// already covered by catch-up; `Lagged` means the observer fell behind
/// the retention window, which the replay contract documents as
/// best-effort.
async fn forward_live(
    registry: ConnectionRegistry,
    game_id: GameId,
    observer_id: ObserverId,
    sender: ObserverSender,
    live: &mut arena_events::LiveReceiver,
    mut last_sequence: u64,
) {
    loop {
        match live.recv().await {
            Ok(event) => {
                if event.sequence <= last_sequence {
                    continue;
                }
                last_sequence = event.sequence;
                let terminal = event.is_terminal();
                if sender.send(event.to_frame()).is_err() {
                    tracing::debug!(
                        %game_id,
                        %observer_id,
                        "observer queue closed, stopping delivery"
                    );
                    break;
                }
                if terminal {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(
                    %game_id,
                    %observer_id,
                    skipped,
                    "observer lagged behind retention window"
                );
            }
            Err(RecvError::Closed) => break,
        }
    }

    // Self-detach; the forward handle is already finished so the abort
    // inside detach is a no-op.
    registry.detach(game_id, observer_id).await;
}
