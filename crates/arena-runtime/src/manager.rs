//! Game manager: creates, tracks, and tears down game runtimes.

use std::collections::HashMap;
use std::marker::PhantomData;

use arena_events::{EventHub, GameId, DEFAULT_EVENT_CAPACITY};

use crate::{Game, GameDriver, GameError, GameRuntime};

/// Registry of all active game runtimes for one driver type.
///
/// This is the entry point for lifecycle operations from the service
/// layer. Like the teacher registry it is not internally thread-safe:
/// the service holds it behind a mutex scoped to the single mutating
/// operation, never across the lifetime of a game — per-game state lives
/// behind each game's own lock.
pub struct GameManager<D: GameDriver> {
    /// Active runtimes, keyed by game id.
    games: HashMap<GameId, GameRuntime>,
    /// Creation order, for deterministic listing.
    order: Vec<GameId>,
    /// Retained-event cap for each game's hub.
    event_capacity: usize,
    _driver: PhantomData<fn() -> D>,
}

impl<D: GameDriver> GameManager<D> {
    /// Creates an empty manager with the default event retention.
    pub fn new() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Creates an empty manager whose games retain at most
    /// `event_capacity` events each.
    pub fn with_event_capacity(event_capacity: usize) -> Self {
        Self {
            games: HashMap::new(),
            order: Vec::new(),
            event_capacity,
            _driver: PhantomData,
        }
    }

    /// Creates a new game from an opaque JSON config and launches its
    /// driver.
    ///
    /// Returns the id synchronously; the driver runs in the background.
    /// Concurrent creates are independent — each game gets its own hub
    /// and its own tasks.
    ///
    /// # Errors
    /// Returns [`GameError::ConfigInvalid`] if the body does not
    /// deserialize into the driver's config or the driver factory
    /// rejects it.
    pub async fn create(
        &mut self,
        config: serde_json::Value,
    ) -> Result<GameId, GameError> {
        let config: D::Config = serde_json::from_value(config)
            .map_err(|e| GameError::ConfigInvalid(e.to_string()))?;
        let driver =
            D::build(config).map_err(|e| GameError::ConfigInvalid(e.to_string()))?;

        let game_id = GameId::new();
        let runtime =
            GameRuntime::launch(game_id, self.event_capacity, driver).await;
        self.games.insert(game_id, runtime);
        self.order.push(game_id);

        tracing::info!(%game_id, total = self.games.len(), "game created");
        Ok(game_id)
    }

    /// Returns a snapshot of a game's record.
    pub async fn get(&self, game_id: GameId) -> Result<Game, GameError> {
        let runtime = self
            .games
            .get(&game_id)
            .ok_or(GameError::NotFound(game_id))?;
        Ok(runtime.snapshot().await)
    }

    /// Returns the event hub for a game, for observer attachment.
    pub fn hub(&self, game_id: GameId) -> Result<EventHub, GameError> {
        let runtime = self
            .games
            .get(&game_id)
            .ok_or(GameError::NotFound(game_id))?;
        Ok(runtime.hub())
    }

    /// Returns snapshots of all games in creation order.
    pub async fn list(&self) -> Vec<Game> {
        let mut games = Vec::with_capacity(self.order.len());
        for game_id in &self.order {
            if let Some(runtime) = self.games.get(game_id) {
                games.push(runtime.snapshot().await);
            }
        }
        games
    }

    /// Cancels a game's driver and removes it from the registry.
    ///
    /// If the driver already completed naturally the cancellation is a
    /// no-op and the record's first terminal outcome stands; the entry is
    /// removed either way. Observers receive the game's terminal event
    /// and are closed by the stream layer.
    pub fn delete(&mut self, game_id: GameId) -> Result<(), GameError> {
        let runtime = self
            .games
            .remove(&game_id)
            .ok_or(GameError::NotFound(game_id))?;
        self.order.retain(|id| *id != game_id);
        runtime.cancel();

        tracing::info!(%game_id, remaining = self.games.len(), "game deleted");
        Ok(())
    }

    /// Returns `true` if a game with this id is registered.
    pub fn contains(&self, game_id: GameId) -> bool {
        self.games.contains_key(&game_id)
    }

    /// Returns the number of registered games.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Returns `true` if no games are registered.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Cancels every registered game. Used at process shutdown.
    pub fn shutdown(&mut self) {
        for runtime in self.games.values() {
            runtime.cancel();
        }
        self.games.clear();
        self.order.clear();
    }
}

impl<D: GameDriver> Default for GameManager<D> {
    fn default() -> Self {
        Self::new()
    }
}
