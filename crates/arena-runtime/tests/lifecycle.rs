//! Integration tests for the game lifecycle using mock drivers.

use std::time::Duration;

use arena_events::{EventHub, GameId, EVENT_ERROR, EVENT_GAME_CANCELLED, EVENT_GAME_ENDED};
use arena_runtime::{
    DriverError, GameDriver, GameError, GameHandle, GameManager, GameStatus,
};
use serde::Deserialize;
use serde_json::{json, Value};

// =========================================================================
// Mock drivers
// =========================================================================

/// Publishes a scripted list of events, then completes.
struct ScriptedDriver {
    events: Vec<String>,
    result: Option<Value>,
}

#[derive(Clone, Deserialize)]
struct ScriptedConfig {
    events: Vec<String>,
    #[serde(default)]
    result: Option<Value>,
}

impl GameDriver for ScriptedDriver {
    type Config = ScriptedConfig;

    fn build(config: ScriptedConfig) -> Result<Self, DriverError> {
        if config.events.is_empty() {
            return Err(DriverError::Config("no events scripted".into()));
        }
        Ok(Self {
            events: config.events,
            result: config.result,
        })
    }

    async fn run(self, handle: GameHandle) -> Result<Option<Value>, DriverError> {
        for (i, event_type) in self.events.iter().enumerate() {
            handle.publish_event(event_type, json!({"step": i})).await;
            handle
                .mutate_payload(|p| *p = json!({"last_step": i}))
                .await;
        }
        Ok(self.result)
    }
}

/// Fails partway through with a deterministic error.
struct FailingDriver;

#[derive(Clone, Deserialize)]
struct EmptyConfig {}

impl GameDriver for FailingDriver {
    type Config = EmptyConfig;

    fn build(_config: EmptyConfig) -> Result<Self, DriverError> {
        Ok(Self)
    }

    async fn run(self, handle: GameHandle) -> Result<Option<Value>, DriverError> {
        handle.publish_event("started", json!({})).await;
        Err(DriverError::Failed("deliberate failure".into()))
    }
}

/// Panics instead of returning an error.
struct PanickingDriver;

impl GameDriver for PanickingDriver {
    type Config = EmptyConfig;

    fn build(_config: EmptyConfig) -> Result<Self, DriverError> {
        Ok(Self)
    }

    async fn run(self, _handle: GameHandle) -> Result<Option<Value>, DriverError> {
        panic!("driver blew up");
    }
}

/// Never finishes on its own — used to exercise delete/cancel.
struct StuckDriver;

impl GameDriver for StuckDriver {
    type Config = EmptyConfig;

    fn build(_config: EmptyConfig) -> Result<Self, DriverError> {
        Ok(Self)
    }

    async fn run(self, handle: GameHandle) -> Result<Option<Value>, DriverError> {
        handle.publish_event("started", json!({})).await;
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }
}

/// Reports a terminal outcome through the handle, then also returns one.
struct DoubleReportDriver;

impl GameDriver for DoubleReportDriver {
    type Config = EmptyConfig;

    fn build(_config: EmptyConfig) -> Result<Self, DriverError> {
        Ok(Self)
    }

    async fn run(self, handle: GameHandle) -> Result<Option<Value>, DriverError> {
        handle
            .report_terminal(GameStatus::Completed, Some(json!({"winner": "red"})))
            .await;
        // A buggy second report: the runtime must ignore it.
        Err(DriverError::Failed("this report must lose the race".into()))
    }
}

// =========================================================================
// Helpers
// =========================================================================

async fn wait_for_status<D: GameDriver>(
    manager: &GameManager<D>,
    game_id: GameId,
    expected: GameStatus,
) {
    for _ in 0..200 {
        if manager.get(game_id).await.expect("game exists").status == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("game {game_id} never reached {expected}");
}

async fn drain_event_types(hub: &EventHub) -> Vec<String> {
    hub.replay_from(0)
        .await
        .into_iter()
        .map(|e| e.event_type)
        .collect()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn scripted_driver_completes_with_ordered_events() {
    let mut manager = GameManager::<ScriptedDriver>::new();
    let game_id = manager
        .create(json!({"events": ["a", "b", "c"], "result": {"winner": "x"}}))
        .await
        .expect("create");

    wait_for_status(&manager, game_id, GameStatus::Completed).await;

    let game = manager.get(game_id).await.expect("game exists");
    assert_eq!(game.result, Some(json!({"winner": "x"})));
    assert_eq!(game.payload, json!({"last_step": 2}));
    assert!(game.error.is_none());

    let hub = manager.hub(game_id).expect("hub");
    let types = drain_event_types(&hub).await;
    assert_eq!(types, vec!["a", "b", "c", EVENT_GAME_ENDED]);

    let events = hub.replay_from(0).await;
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.sequence, i as u64 + 1);
    }
}

#[tokio::test]
async fn create_returns_synchronously_while_driver_runs() {
    let mut manager = GameManager::<StuckDriver>::new();
    let game_id = manager.create(json!({})).await.expect("create");

    let game = manager.get(game_id).await.expect("game exists");
    assert_eq!(game.status, GameStatus::Running);
    assert!(manager.contains(game_id));

    manager.delete(game_id).expect("delete");
}

#[tokio::test]
async fn rejected_config_is_config_invalid() {
    let mut manager = GameManager::<ScriptedDriver>::new();

    // Body that does not deserialize at all.
    let err = manager.create(json!({"events": 42})).await.unwrap_err();
    assert!(matches!(err, GameError::ConfigInvalid(_)));

    // Body the driver factory rejects.
    let err = manager.create(json!({"events": []})).await.unwrap_err();
    assert!(matches!(err, GameError::ConfigInvalid(_)));

    assert!(manager.is_empty());
}

#[tokio::test]
async fn failing_driver_marks_game_failed_with_error_event() {
    let mut manager = GameManager::<FailingDriver>::new();
    let game_id = manager.create(json!({})).await.expect("create");

    wait_for_status(&manager, game_id, GameStatus::Failed).await;

    let game = manager.get(game_id).await.expect("game exists");
    assert!(game.error.as_deref().unwrap().contains("deliberate failure"));

    let hub = manager.hub(game_id).expect("hub");
    let types = drain_event_types(&hub).await;
    assert_eq!(types, vec!["started", EVENT_ERROR]);
}

#[tokio::test]
async fn panicking_driver_is_contained_as_failed() {
    let mut manager = GameManager::<PanickingDriver>::new();
    let game_id = manager.create(json!({})).await.expect("create");

    wait_for_status(&manager, game_id, GameStatus::Failed).await;

    let game = manager.get(game_id).await.expect("game exists");
    assert!(game.error.as_deref().unwrap().contains("driver blew up"));
}

#[tokio::test]
async fn one_failing_game_does_not_affect_another() {
    let mut failing = GameManager::<FailingDriver>::new();
    let mut scripted = GameManager::<ScriptedDriver>::new();

    let bad = failing.create(json!({})).await.expect("create");
    let good = scripted
        .create(json!({"events": ["a", "b"]}))
        .await
        .expect("create");

    wait_for_status(&failing, bad, GameStatus::Failed).await;
    wait_for_status(&scripted, good, GameStatus::Completed).await;

    let game = scripted.get(good).await.expect("game exists");
    assert!(game.error.is_none());
}

#[tokio::test]
async fn delete_cancels_running_driver_and_emits_cancelled_event() {
    let mut manager = GameManager::<StuckDriver>::new();
    let game_id = manager.create(json!({})).await.expect("create");

    // Hold the hub across the delete so the terminal event is observable.
    let hub = manager.hub(game_id).expect("hub");
    let (_, mut live) = hub.subscribe_from(0).await;

    manager.delete(game_id).expect("delete");
    assert!(matches!(
        manager.get(game_id).await,
        Err(GameError::NotFound(_))
    ));
    // Second delete is NotFound, not a crash.
    assert!(matches!(
        manager.delete(game_id),
        Err(GameError::NotFound(_))
    ));

    let event = tokio::time::timeout(Duration::from_secs(2), live.recv())
        .await
        .expect("terminal event within window")
        .expect("live stream open");
    assert_eq!(event.event_type, EVENT_GAME_CANCELLED);
}

#[tokio::test]
async fn delete_races_safely_with_natural_completion() {
    let mut manager = GameManager::<ScriptedDriver>::new();
    let game_id = manager
        .create(json!({"events": ["only"]}))
        .await
        .expect("create");

    wait_for_status(&manager, game_id, GameStatus::Completed).await;

    // The driver already finished; delete must still remove the entry
    // without disturbing the recorded outcome.
    let hub = manager.hub(game_id).expect("hub");
    manager.delete(game_id).expect("delete");

    tokio::time::sleep(Duration::from_millis(50)).await;
    let types = drain_event_types(&hub).await;
    assert_eq!(types, vec!["only", EVENT_GAME_ENDED]);
}

#[tokio::test]
async fn first_terminal_report_wins() {
    let mut manager = GameManager::<DoubleReportDriver>::new();
    let game_id = manager.create(json!({})).await.expect("create");

    wait_for_status(&manager, game_id, GameStatus::Completed).await;
    // Give the losing report a chance to land (it must be dropped).
    tokio::time::sleep(Duration::from_millis(50)).await;

    let game = manager.get(game_id).await.expect("game exists");
    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.result, Some(json!({"winner": "red"})));
    assert!(game.error.is_none());

    let hub = manager.hub(game_id).expect("hub");
    let types = drain_event_types(&hub).await;
    assert_eq!(types, vec![EVENT_GAME_ENDED]);
}

#[tokio::test]
async fn list_preserves_creation_order() {
    let mut manager = GameManager::<ScriptedDriver>::new();
    let mut ids = Vec::new();
    for i in 0..3 {
        let id = manager
            .create(json!({"events": [format!("e{i}")]}))
            .await
            .expect("create");
        ids.push(id);
    }

    let listed: Vec<GameId> =
        manager.list().await.into_iter().map(|g| g.game_id).collect();
    assert_eq!(listed, ids);

    manager.delete(ids[1]).expect("delete middle");
    let listed: Vec<GameId> =
        manager.list().await.into_iter().map(|g| g.game_id).collect();
    assert_eq!(listed, vec![ids[0], ids[2]]);
}
