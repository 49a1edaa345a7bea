//! Bidirectional WebSocket tunnelling.
//!
//! Each tunnel moves through `OPENING → TUNNELING → CLOSED`: the
//! upstream dial fails fast with no retry, the pump loop relays frames
//! both ways without inspecting them, and either side's close, error,
//! or idle silence drives both halves to `CLOSED`. Idle is judged per
//! direction, so one half cannot keep the other's silence undetected,
//! and a half-open tunnel never outlives its sibling.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{self, CloseFrame, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{sleep_until, timeout, Instant};
use tokio_tungstenite::tungstenite::protocol::CloseFrame as UpstreamCloseFrame;
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::server::GatewayState;

/// Policy-violation close code, sent for unknown service names.
const CLOSE_POLICY: u16 = 1008;
/// Internal-error close code, sent when the upstream dial fails.
const CLOSE_ERROR: u16 = 1011;

type Upstream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// `GET /ws/{service}/{*path}` — upgrades the client and tunnels it to
/// the service's WebSocket base plus `/{path}`.
pub(crate) async fn open_tunnel(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
    Path((service, path)): Path<(String, String)>,
) -> Response {
    let target = state
        .routes
        .get(&service)
        .map(|route| format!("{}/{path}", route.ws_base));
    let idle_timeout = state.tunnel_idle_timeout;

    ws.on_upgrade(move |mut client| async move {
        match target {
            Some(target) => {
                run_tunnel(client, &service, &target, idle_timeout).await;
            }
            None => {
                let _ = client
                    .send(ws::Message::Close(Some(CloseFrame {
                        code: CLOSE_POLICY,
                        reason: "Unknown service".into(),
                    })))
                    .await;
            }
        }
    })
}

/// One iteration of the pump loop: a frame from either half, or an idle
/// deadline firing.
enum Pump {
    Client(Option<Result<ws::Message, axum::Error>>),
    Upstream(Option<Result<UpstreamMessage, tokio_tungstenite::tungstenite::Error>>),
    Idle,
}

async fn run_tunnel(
    mut client: WebSocket,
    service: &str,
    target: &str,
    idle_timeout: Duration,
) {
    // OPENING: fail fast, no retry.
    let mut upstream: Upstream =
        match tokio_tungstenite::connect_async(target).await {
            Ok((upstream, _)) => upstream,
            Err(e) => {
                warn!(%service, %target, error = %e, "upstream dial failed");
                let _ = client
                    .send(ws::Message::Close(Some(CloseFrame {
                        code: CLOSE_ERROR,
                        reason: "upstream unavailable".into(),
                    })))
                    .await;
                return;
            }
        };
    debug!(%service, %target, "tunnel established");

    // TUNNELING: relay frames until either side ends or one direction
    // goes quiet past the idle timeout. Each direction carries its own
    // idle clock so a chatty client cannot keep a dead upstream looking
    // alive (or vice versa), and every relayed send is bounded by the
    // same timeout so a peer that stops reading cannot park the pump.
    let mut client_deadline = Instant::now() + idle_timeout;
    let mut upstream_deadline = Instant::now() + idle_timeout;
    loop {
        let event = tokio::select! {
            msg = client.recv() => Pump::Client(msg),
            msg = upstream.next() => Pump::Upstream(msg),
            () = sleep_until(client_deadline.min(upstream_deadline)) => {
                Pump::Idle
            }
        };

        match event {
            Pump::Idle => {
                debug!(%service, "tunnel idle timeout");
                break;
            }
            Pump::Client(None) | Pump::Client(Some(Err(_))) => {
                debug!(%service, "client side ended");
                break;
            }
            Pump::Upstream(None) | Pump::Upstream(Some(Err(_))) => {
                debug!(%service, "upstream side ended");
                break;
            }
            Pump::Client(Some(Ok(msg))) => {
                client_deadline = Instant::now() + idle_timeout;
                let closing = matches!(msg, ws::Message::Close(_));
                if let Some(msg) = client_to_upstream(msg) {
                    match timeout(idle_timeout, upstream.send(msg)).await {
                        Ok(Ok(())) => {}
                        _ => break,
                    }
                }
                if closing {
                    break;
                }
            }
            Pump::Upstream(Some(Ok(msg))) => {
                upstream_deadline = Instant::now() + idle_timeout;
                let closing = matches!(msg, UpstreamMessage::Close(_));
                if let Some(msg) = upstream_to_client(msg) {
                    match timeout(idle_timeout, client.send(msg)).await {
                        Ok(Ok(())) => {}
                        _ => break,
                    }
                }
                if closing {
                    break;
                }
            }
        }
    }

    // CLOSED: drive both halves down; closing twice is harmless. The
    // bound keeps a stuck peer from pinning the task past teardown.
    let _ = timeout(idle_timeout, client.send(ws::Message::Close(None))).await;
    let _ = timeout(idle_timeout, upstream.close(None)).await;
    debug!(%service, "tunnel closed");
}

/// Converts a client frame for the upstream socket. Ping/pong are
/// answered locally by each endpoint's own protocol layer and not
/// forwarded.
fn client_to_upstream(msg: ws::Message) -> Option<UpstreamMessage> {
    match msg {
        ws::Message::Text(text) => {
            Some(UpstreamMessage::Text(text.as_str().into()))
        }
        ws::Message::Binary(data) => Some(UpstreamMessage::Binary(data)),
        ws::Message::Close(frame) => {
            Some(UpstreamMessage::Close(frame.map(|f| UpstreamCloseFrame {
                code: f.code.into(),
                reason: f.reason.as_str().into(),
            })))
        }
        ws::Message::Ping(_) | ws::Message::Pong(_) => None,
    }
}

fn upstream_to_client(msg: UpstreamMessage) -> Option<ws::Message> {
    match msg {
        UpstreamMessage::Text(text) => {
            Some(ws::Message::Text(text.as_str().into()))
        }
        UpstreamMessage::Binary(data) => Some(ws::Message::Binary(data)),
        UpstreamMessage::Close(frame) => {
            Some(ws::Message::Close(frame.map(|f| CloseFrame {
                code: f.code.into(),
                reason: f.reason.as_str().into(),
            })))
        }
        UpstreamMessage::Ping(_)
        | UpstreamMessage::Pong(_)
        | UpstreamMessage::Frame(_) => None,
    }
}
