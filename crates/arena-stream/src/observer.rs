//! Observer identity and delivery channel types.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use arena_events::EventFrame;
use tokio::sync::mpsc;

/// Counter for generating unique observer ids.
static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for one attached observer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Allocates the next observer id.
    pub fn next() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obs-{}", self.0)
    }
}

/// Sending half of an observer's delivery queue.
///
/// Unbounded so delivery to one observer can never apply backpressure to
/// the publisher or to other observers; the socket task drains the
/// receiving half and the whole queue is dropped when the socket dies.
pub type ObserverSender = mpsc::UnboundedSender<EventFrame>;

/// Receiving half of an observer's delivery queue.
pub type ObserverReceiver = mpsc::UnboundedReceiver<EventFrame>;

/// Creates a delivery queue for one observer.
pub fn observer_channel() -> (ObserverSender, ObserverReceiver) {
    mpsc::unbounded_channel()
}
