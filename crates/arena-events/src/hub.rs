//! Per-game event hub: bounded buffer, replay, and live fan-out.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};

use crate::{GameEvent, GameId};

/// Default number of retained events per game.
///
/// Large enough for a full game's events in practice; oldest events are
/// evicted once the cap is exceeded. Sequence numbers are never reused.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Receiver half of a hub's live event stream.
///
/// Subscribers that fall more than the hub capacity behind receive a
/// [`broadcast::error::RecvError::Lagged`] and resume from the newest
/// retained event — the same best-effort window as buffer eviction.
pub type LiveReceiver = broadcast::Receiver<GameEvent>;

/// Buffered state guarded by the hub lock.
struct HubState {
    next_sequence: u64,
    buffer: VecDeque<GameEvent>,
}

struct HubShared {
    game_id: GameId,
    capacity: usize,
    state: Mutex<HubState>,
    live: broadcast::Sender<GameEvent>,
}

/// Ordered, bounded publish/subscribe buffer for a single game.
///
/// Cheap to clone — all clones share the same buffer. One hub exists per
/// game and is owned by that game's runtime; hubs for different games
/// share nothing, so publishing to one game never contends with another.
///
/// The single hub lock serializes three things: sequence assignment,
/// buffer mutation, and the handoff between a catch-up snapshot and a
/// live subscription ([`subscribe_from`](Self::subscribe_from)). Holding
/// all three under one lock is what makes an observer's catch-up-then-live
/// stream gapless and duplicate-free.
#[derive(Clone)]
pub struct EventHub {
    shared: Arc<HubShared>,
}

impl EventHub {
    /// Creates a hub for `game_id` with the default retention capacity.
    pub fn new(game_id: GameId) -> Self {
        Self::with_capacity(game_id, DEFAULT_EVENT_CAPACITY)
    }

    /// Creates a hub retaining at most `capacity` events.
    pub fn with_capacity(game_id: GameId, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (live, _) = broadcast::channel(capacity);
        Self {
            shared: Arc::new(HubShared {
                game_id,
                capacity,
                state: Mutex::new(HubState {
                    next_sequence: 1,
                    buffer: VecDeque::with_capacity(capacity),
                }),
                live,
            }),
        }
    }

    /// Returns the id of the game this hub belongs to.
    pub fn game_id(&self) -> GameId {
        self.shared.game_id
    }

    /// Returns the retention capacity.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Appends an event with the next sequence number and wakes all live
    /// subscribers.
    ///
    /// Atomic with respect to concurrent publishers for the same game:
    /// sequence assignment, buffer append, eviction, and the live send all
    /// happen under the hub lock. A single writer per game is expected,
    /// but the operation is safe even if that is violated.
    pub async fn publish(&self, event_type: &str, data: Value) -> GameEvent {
        let event = {
            let mut state = self.shared.state.lock().await;
            let event = GameEvent {
                sequence: state.next_sequence,
                event_type: event_type.to_string(),
                data,
                timestamp: Utc::now(),
            };
            state.next_sequence += 1;
            state.buffer.push_back(event.clone());
            if state.buffer.len() > self.shared.capacity {
                state.buffer.pop_front();
            }
            // Err means no live subscribers, which is normal.
            let _ = self.shared.live.send(event.clone());
            event
        };
        tracing::trace!(
            game_id = %self.shared.game_id,
            sequence = event.sequence,
            event_type = %event.event_type,
            "event published"
        );
        event
    }

    /// Returns all retained events with sequence > `since_sequence`, in
    /// order.
    ///
    /// If `since_sequence` is older than the retention window the oldest
    /// retained events are returned — observers must tolerate a truncated
    /// prefix after eviction. This is a best-effort replay, not
    /// exactly-once delivery.
    pub async fn replay_from(&self, since_sequence: u64) -> Vec<GameEvent> {
        let state = self.shared.state.lock().await;
        state
            .buffer
            .iter()
            .filter(|e| e.sequence > since_sequence)
            .cloned()
            .collect()
    }

    /// Atomically snapshots the catch-up set and subscribes to live
    /// events.
    ///
    /// Because both happen under the hub lock, no event published between
    /// the snapshot and the subscription can be lost, and nothing in the
    /// snapshot can arrive again on the receiver. The caller delivers the
    /// snapshot first, then switches to the receiver.
    pub async fn subscribe_from(
        &self,
        since_sequence: u64,
    ) -> (Vec<GameEvent>, LiveReceiver) {
        let state = self.shared.state.lock().await;
        let catch_up = state
            .buffer
            .iter()
            .filter(|e| e.sequence > since_sequence)
            .cloned()
            .collect();
        let receiver = self.shared.live.subscribe();
        (catch_up, receiver)
    }

    /// Returns the number of currently retained events.
    pub async fn len(&self) -> usize {
        self.shared.state.lock().await.buffer.len()
    }

    /// Returns `true` if no events are retained.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns the sequence number of the most recently published event,
    /// or 0 if nothing has been published yet.
    pub async fn last_sequence(&self) -> u64 {
        self.shared.state.lock().await.next_sequence - 1
    }
}
