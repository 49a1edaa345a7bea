//! Axum router and REST handlers for a game service.

use std::sync::Arc;

use arena_events::GameId;
use arena_runtime::GameDriver;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::ServiceState;
use crate::ws;
use crate::ArenaError;

/// Builds the complete router for one game service:
///
/// - `POST /games` — create a game from an opaque JSON config
/// - `GET /games` — list games in creation order
/// - `GET /games/{id}` — game snapshot
/// - `DELETE /games/{id}` — cancel and remove a game
/// - `GET /health` — service liveness (probed by the gateway)
/// - `GET /ws/games/{id}` — observer event stream
///
/// CORS allows any origin — the gateway fronts this and browsers talk to
/// the gateway's origin in production.
pub(crate) fn build_router<D: GameDriver>(
    state: Arc<ServiceState<D>>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/games", post(create_game::<D>).get(list_games::<D>))
        .route(
            "/games/{id}",
            get(get_game::<D>).delete(delete_game::<D>),
        )
        .route("/health", get(health::<D>))
        .route("/ws/games/{id}", get(ws::observe_game::<D>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `POST /games` — the body is forwarded untouched from the client; the
/// core never validates its shape beyond well-formed JSON. The driver
/// factory decides whether to accept it.
async fn create_game<D: GameDriver>(
    State(state): State<Arc<ServiceState<D>>>,
    Json(config): Json<Value>,
) -> Result<Json<Value>, ArenaError> {
    // One lock scope: a delete racing in between would otherwise turn a
    // successful create into a 404.
    let (game_id, game) = {
        let mut manager = state.manager.lock().await;
        let game_id = manager.create(config).await?;
        let game = manager.get(game_id).await?;
        (game_id, game)
    };
    Ok(Json(json!({
        "game_id": game_id,
        "status": game.status,
        "created_at": game.created_at,
    })))
}

async fn list_games<D: GameDriver>(
    State(state): State<Arc<ServiceState<D>>>,
) -> Json<Value> {
    let games = state.manager.lock().await.list().await;
    Json(json!({ "games": games }))
}

async fn get_game<D: GameDriver>(
    State(state): State<Arc<ServiceState<D>>>,
    Path(game_id): Path<GameId>,
) -> Result<Json<Value>, ArenaError> {
    let game = state.manager.lock().await.get(game_id).await?;
    Ok(Json(serde_json::to_value(&game).unwrap_or(Value::Null)))
}

/// `DELETE /games/{id}` — cancels the driver; attached observers receive
/// a `game_cancelled` terminal frame and are closed by the stream layer.
async fn delete_game<D: GameDriver>(
    State(state): State<Arc<ServiceState<D>>>,
    Path(game_id): Path<GameId>,
) -> Result<Json<Value>, ArenaError> {
    state.manager.lock().await.delete(game_id)?;
    Ok(Json(json!({ "message": "Game deleted" })))
}

async fn health<D: GameDriver>(
    State(state): State<Arc<ServiceState<D>>>,
) -> Json<Value> {
    let active_games = state.manager.lock().await.len();
    Json(json!({
        "status": "healthy",
        "service": state.service_name,
        "version": state.version,
        "active_games": active_games,
    }))
}
