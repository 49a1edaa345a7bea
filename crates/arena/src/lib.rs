//! # Arena
//!
//! Framework for running autonomous AI game backends behind one gateway.
//!
//! A game backend implements the [`GameDriver`] trait and hands it to an
//! [`ArenaService`]; the framework handles game lifecycle, event
//! buffering, and observer delivery over REST + WebSocket.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arena::prelude::*;
//!
//! # async fn example() -> Result<(), ArenaError> {
//! // Implement GameDriver for your game, then:
//! // let service = ArenaService::builder()
//! //     .bind("0.0.0.0:8000")
//! //     .service_name("codenames")
//! //     .build::<MyDriver>()
//! //     .await?;
//! // service.run().await
//! # Ok(())
//! # }
//! ```

mod error;
mod routes;
mod service;
mod ws;

pub use error::ArenaError;
pub use service::{ArenaService, ArenaServiceBuilder};

// Re-export the layer crates so service authors need one dependency.
pub use arena_events::{EventFrame, EventHub, GameEvent, GameId};
pub use arena_runtime::{
    DriverError, Game, GameDriver, GameError, GameHandle, GameManager,
    GameStatus,
};
pub use arena_stream::ConnectionRegistry;

/// Commonly used items for service authors.
pub mod prelude {
    pub use crate::{
        ArenaError, ArenaService, ArenaServiceBuilder, DriverError, Game,
        GameDriver, GameHandle, GameId, GameStatus,
    };
}
