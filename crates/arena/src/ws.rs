//! Observer WebSocket endpoint for a game service.
//!
//! Clients connect to `GET /ws/games/{id}` and receive the game's
//! buffered events as JSON text frames, then live events as they occur,
//! then one terminal frame after which the server closes the socket.
//! Client frames are drained and ignored — the stream is read-only.

use std::sync::Arc;

use arena_events::{EventHub, GameId};
use arena_runtime::GameDriver;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::SinkExt;
use tracing::debug;

use crate::service::ServiceState;
use crate::ConnectionRegistry;

/// Policy-violation close code, sent for unknown game ids.
const CLOSE_POLICY: u16 = 1008;
/// Normal close code, sent after the terminal frame.
const CLOSE_NORMAL: u16 = 1000;

/// Upgrades the request and attaches the client as an observer.
pub(crate) async fn observe_game<D: GameDriver>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServiceState<D>>>,
    Path(game_id): Path<GameId>,
) -> impl IntoResponse {
    let hub = state.manager.lock().await.hub(game_id).ok();
    let registry = state.registry.clone();
    ws.on_upgrade(move |socket| handle_observer(socket, game_id, hub, registry))
}

async fn handle_observer(
    mut socket: WebSocket,
    game_id: GameId,
    hub: Option<EventHub>,
    registry: ConnectionRegistry,
) {
    let Some(hub) = hub else {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: CLOSE_POLICY,
                reason: "Game not found".into(),
            })))
            .await;
        return;
    };

    let (sender, mut frames) = arena_stream::observer_channel();
    let observer_id = match registry.attach(&hub, sender).await {
        Ok(id) => id,
        Err(e) => {
            debug!(%game_id, error = %e, "observer attach failed");
            return;
        }
    };
    debug!(%game_id, %observer_id, "observer socket connected");

    loop {
        tokio::select! {
            // Deliver the next queued frame (catch-up and live alike).
            frame = frames.recv() => {
                match frame {
                    Some(frame) => {
                        let text = match serde_json::to_string(&frame) {
                            Ok(t) => t,
                            Err(e) => {
                                debug!(%game_id, error = %e, "frame serialization failed");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(text.into())).await.is_err() {
                            debug!(%game_id, %observer_id, "observer send failed");
                            break;
                        }
                        if frame.is_terminal() {
                            let _ = socket
                                .send(Message::Close(Some(CloseFrame {
                                    code: CLOSE_NORMAL,
                                    reason: "game over".into(),
                                })))
                                .await;
                            break;
                        }
                    }
                    // The registry tore the game down (forced delete or
                    // process shutdown).
                    None => {
                        let _ = socket.close().await;
                        break;
                    }
                }
            }
            // Detect client close; everything else from the client is
            // ignored.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%game_id, %observer_id, "observer disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%game_id, %observer_id, error = %e, "observer socket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    registry.detach(game_id, observer_id).await;
}
