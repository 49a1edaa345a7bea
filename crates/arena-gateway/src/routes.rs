//! Axum router for the gateway surface.

use std::sync::Arc;

use axum::routing::{any, get};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::GatewayState;
use crate::{health, proxy, tunnel};

/// Builds the complete gateway router:
///
/// - `GET /health` — aggregated health across all configured services
/// - `* /api/{service}/{*path}` — verbatim REST forwarding
/// - `GET /ws/{service}/{*path}` — bidirectional WebSocket tunnel
///
/// CORS allows any origin; the gateway is the single public surface the
/// frontend talks to.
pub(crate) fn build_router(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::aggregate_health))
        .route("/api/{service}/{*path}", any(proxy::forward_rest))
        .route("/ws/{service}/{*path}", get(tunnel::open_tunnel))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
