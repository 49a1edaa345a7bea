//! # Arena Gateway
//!
//! Unified entry point in front of independent Arena game services.
//!
//! The gateway holds a static route table mapping logical service names
//! to upstream addresses and exposes three surfaces:
//!
//! - **REST proxy** — `/{method} /api/{service}/{*path}` forwarded
//!   verbatim to the upstream's REST base.
//! - **WebSocket tunnel** — `GET /ws/{service}/{*path}` relayed frame by
//!   frame between the client and the upstream socket.
//! - **Aggregated health** — `GET /health` probing every configured
//!   service concurrently.
//!
//! The gateway never parses what it forwards; game semantics live
//! entirely in the upstream services.

mod config;
mod error;
mod health;
mod proxy;
mod routes;
mod server;
mod tunnel;

pub use config::{GatewayConfig, RouteTable, ServiceRoute};
pub use error::GatewayError;
pub use server::Gateway;
