//! Observer connection registry for Arena.
//!
//! This crate delivers a game's event stream to any number of live
//! observers:
//!
//! 1. **Catch-up** — on attach, every retained event is queued in order
//!    before the connection goes live (no gap, no duplicate).
//! 2. **Live delivery** — a per-observer forward task pumps events from
//!    the hub into the observer's queue; a slow or dead observer is
//!    detached, never allowed to block anyone else.
//! 3. **Termination** — a terminal frame ends the stream; the socket
//!    layer closes the connection after writing it.
//!
//! # How it fits in the stack
//!
//! ```text
//! Game runtime (above)  ← publishes into the EventHub
//!     ↕
//! Stream layer (this crate)  ← fans frames out to observer queues
//!     ↕
//! Socket layer (below)  ← drains each queue into one WebSocket
//! ```

mod error;
mod observer;
mod registry;

pub use error::StreamError;
pub use observer::{observer_channel, ObserverId, ObserverReceiver, ObserverSender};
pub use registry::ConnectionRegistry;
