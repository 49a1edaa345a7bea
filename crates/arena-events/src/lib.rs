//! Event model and per-game event hub for Arena.
//!
//! This crate defines the "record of what happened" in a game:
//!
//! - **Types** ([`GameId`], [`GameEvent`], [`EventFrame`]) — the ordered,
//!   timestamped events a game runtime emits and the wire shape observers
//!   receive.
//! - **Hub** ([`EventHub`]) — a bounded per-game buffer with publish,
//!   replay, and an atomic catch-up-then-live subscription.
//!
//! # Architecture
//!
//! The hub sits between the game runtime (the single writer) and any
//! number of observers. It doesn't know about sockets or games — it only
//! knows how to order, retain, and fan out events.
//!
//! ```text
//! Runtime (publish) → EventHub (ring buffer) → Observers (replay + live)
//! ```

mod hub;
mod types;

pub use hub::{EventHub, LiveReceiver, DEFAULT_EVENT_CAPACITY};
pub use types::{
    EventFrame, GameEvent, GameId, EVENT_ERROR, EVENT_GAME_CANCELLED,
    EVENT_GAME_ENDED,
};
