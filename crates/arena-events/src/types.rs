//! Core event types shared across the Arena stack.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// GameId
// ---------------------------------------------------------------------------

/// Opaque unique identifier for a game instance.
///
/// Generated once at creation (UUID v4) and never reused. Serializes as a
/// plain string so it can travel in URLs and JSON unchanged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// ---------------------------------------------------------------------------
// Terminal event types
// ---------------------------------------------------------------------------

/// Final event for a game that completed or failed on its own.
pub const EVENT_GAME_ENDED: &str = "game_ended";
/// Final event when a known error ends the stream.
pub const EVENT_ERROR: &str = "error";
/// Final event for a game torn down by an explicit delete.
pub const EVENT_GAME_CANCELLED: &str = "game_cancelled";

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// An ordered, timestamped record emitted by a game runtime.
///
/// Sequence numbers are strictly increasing and gapless per game,
/// starting at 1. Once emitted an event is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    /// Position in the game's event stream.
    pub sequence: u64,
    /// Event type tag (e.g. `"turn_completed"`). The core only interprets
    /// the terminal types; everything else is driver-defined.
    pub event_type: String,
    /// Opaque event payload, controlled by the driver.
    pub data: Value,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
}

impl GameEvent {
    /// Returns `true` if this event ends the stream for its game.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.event_type.as_str(),
            EVENT_GAME_ENDED | EVENT_ERROR | EVENT_GAME_CANCELLED
        )
    }

    /// Converts this event into the wire shape sent to observers.
    pub fn to_frame(&self) -> EventFrame {
        EventFrame {
            event_type: self.event_type.clone(),
            data: self.data.clone(),
            sequence: self.sequence,
            timestamp: self.timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// EventFrame
// ---------------------------------------------------------------------------

/// The JSON text frame delivered to observers.
///
/// The contract with clients is `{"event_type": string, "data": object}`;
/// `sequence` and `timestamp` ride along so clients can detect truncated
/// replays after buffer eviction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    /// Event type tag.
    pub event_type: String,
    /// Opaque event payload.
    pub data: Value,
    /// Position in the game's event stream.
    pub sequence: u64,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
}

impl EventFrame {
    /// Returns `true` if this frame ends the stream for its game.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.event_type.as_str(),
            EVENT_GAME_ENDED | EVENT_ERROR | EVENT_GAME_CANCELLED
        )
    }
}

impl From<GameEvent> for EventFrame {
    fn from(event: GameEvent) -> Self {
        EventFrame {
            event_type: event.event_type,
            data: event.data,
            sequence: event.sequence,
            timestamp: event.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_game_id_display_round_trips() {
        let id = GameId::new();
        let parsed: GameId = id.to_string().parse().expect("parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_game_id_serializes_as_plain_string() {
        let id = GameId::new();
        let json = serde_json::to_value(id).expect("serialize");
        assert_eq!(json, Value::String(id.to_string()));
    }

    #[test]
    fn test_terminal_event_types() {
        for event_type in [EVENT_GAME_ENDED, EVENT_ERROR, EVENT_GAME_CANCELLED] {
            let event = GameEvent {
                sequence: 1,
                event_type: event_type.to_string(),
                data: json!({}),
                timestamp: Utc::now(),
            };
            assert!(event.is_terminal(), "{event_type} should be terminal");
            assert!(event.to_frame().is_terminal());
        }
    }

    #[test]
    fn test_domain_event_is_not_terminal() {
        let event = GameEvent {
            sequence: 3,
            event_type: "clue_given".to_string(),
            data: json!({"word": "ocean"}),
            timestamp: Utc::now(),
        };
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_frame_wire_shape() {
        let frame = EventFrame {
            event_type: "move_made".to_string(),
            data: json!({"row": 1, "col": 2}),
            sequence: 7,
            timestamp: Utc::now(),
        };
        let wire = serde_json::to_value(&frame).expect("serialize");
        assert_eq!(wire["event_type"], "move_made");
        assert_eq!(wire["data"]["row"], 1);
        assert_eq!(wire["sequence"], 7);
    }
}
