//! WebSocket upgrade handler and per-connection event loop.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use huddle_common::protocol::GatewayFrame;
use huddle_common::ClientEvent;
use tokio::sync::broadcast;
use tokio::time;

use crate::error::ChatError;
use crate::AppState;

use super::fanout::BroadcastPayload;
use super::router::Gateway;
use super::session::GatewaySession;

/// How often the server pings an idle connection.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Consecutive ping intervals without any inbound frame before the
/// connection is dropped.
const MAX_MISSED_PINGS: u32 = 2;

/// Tracks inbound silence across ping ticks.
#[derive(Debug, Default)]
struct Liveness {
    silent_intervals: u32,
}

impl Liveness {
    /// Any inbound frame proves the peer is alive.
    fn record_traffic(&mut self) {
        self.silent_intervals = 0;
    }

    /// Called on each ping tick. Returns `false` once the peer has been
    /// silent for `MAX_MISSED_PINGS` whole intervals.
    fn tick(&mut self) -> bool {
        self.silent_intervals += 1;
        self.silent_intervals < MAX_MISSED_PINGS
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state.gateway))
}

async fn handle_connection(socket: WebSocket, gateway: Arc<Gateway>) {
    let (ws_tx, ws_rx) = socket.split();

    // Subscribe before reading anything so no broadcast after open is missed.
    let opened = gateway.open();
    let session = opened.session;

    tracing::debug!(connection_id = %session.connection_id, "gateway connection opened");

    run_connection(&gateway, &session, ws_tx, ws_rx, opened.events).await;

    // Runs exactly once, however the loop ended.
    gateway.close(&session.connection_id);

    tracing::debug!(connection_id = %session.connection_id, "gateway connection closed");
}

/// Main connection loop: read client frames, forward addressed broadcasts,
/// and drop connections that go silent.
async fn run_connection(
    gateway: &Gateway,
    session: &GatewaySession,
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut ws_rx: SplitStream<WebSocket>,
    mut broadcast_rx: broadcast::Receiver<Arc<BroadcastPayload>>,
) {
    let mut ping_timer = time::interval(PING_INTERVAL);
    ping_timer.tick().await; // First tick fires immediately; skip it.
    let mut liveness = Liveness::default();

    loop {
        tokio::select! {
            // Client sends us a frame.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        liveness.record_traffic();
                        handle_frame(gateway, session, text.as_str());
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Pong, ping, or binary: all count as liveness.
                        liveness.record_traffic();
                    }
                    Some(Err(e)) => {
                        tracing::debug!(?e, connection_id = %session.connection_id, "ws read error");
                        break;
                    }
                }
            }

            // Payload from the fanout hub.
            result = broadcast_rx.recv() => {
                match result {
                    Ok(payload) => {
                        if !session.is_addressed(&payload.audience) {
                            continue;
                        }

                        let frame = GatewayFrame {
                            s: session.next_seq(),
                            event: &payload.event,
                        };
                        let json = match serde_json::to_string(&frame) {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::error!(?e, event = payload.event.name(), "failed to encode frame");
                                continue;
                            }
                        };
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            connection_id = %session.connection_id,
                            skipped = n,
                            "gateway connection lagged behind broadcast"
                        );
                        // Keep going; the skipped events are gone.
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            // Liveness check.
            _ = ping_timer.tick() => {
                if !liveness.tick() {
                    tracing::debug!(
                        connection_id = %session.connection_id,
                        "no traffic from client, closing connection"
                    );
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
                if ws_tx.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Decode one text frame and hand it to the router. Every failure is
/// absorbed here; the connection stays open.
fn handle_frame(gateway: &Gateway, session: &GatewaySession, text: &str) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(
                connection_id = %session.connection_id,
                error = %e,
                "ignoring malformed frame"
            );
            return;
        }
    };

    let name = event.name();
    match gateway.handle(&session.connection_id, event) {
        Ok(()) => {}
        Err(err @ ChatError::UnauthenticatedEvent) => {
            tracing::debug!(connection_id = %session.connection_id, event = name, %err, "ignoring event before join");
        }
        Err(err) => {
            tracing::debug!(connection_id = %session.connection_id, event = name, %err, "event dropped");
        }
    }
}
