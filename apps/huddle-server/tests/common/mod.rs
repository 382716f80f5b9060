#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::{tungstenite, MaybeTlsStream, WebSocketStream};

use huddle_server::config::Config;
use huddle_server::AppState;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for a frame that should arrive.
const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a fresh, empty AppState.
pub fn test_state() -> AppState {
    AppState::new(Config::default())
}

/// Build the full router with a fresh state.
pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    let app = huddle_server::routes::router().with_state(state.clone());
    (app, state)
}

/// Start an actual TCP server for WebSocket testing. The server runs in the background.
pub async fn start_ws_server() -> (SocketAddr, AppState) {
    let (app, state) = test_app();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Open a gateway connection and return it with its own connection id
/// (taken from the `ready` frame).
pub async fn connect(addr: SocketAddr) -> (WsStream, String) {
    let url = format!("ws://{addr}/gateway");
    let (mut ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");

    let ready = expect_event(&mut ws, "ready").await;
    let connection_id = ready["connectionId"]
        .as_str()
        .expect("connectionId present")
        .to_string();
    (ws, connection_id)
}

/// Connect and join as `name`, consuming this connection's own roster and
/// joined frames.
pub async fn connect_and_join(addr: SocketAddr, name: &str) -> (WsStream, String) {
    let (mut ws, connection_id) = connect(addr).await;
    send_event(&mut ws, serde_json::json!({ "t": "join", "d": name })).await;

    let roster = expect_event(&mut ws, "roster").await;
    assert!(roster
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["connectionId"] == connection_id.as_str()));
    let joined = expect_event(&mut ws, "participant-joined").await;
    assert_eq!(joined["connectionId"], connection_id.as_str());

    (ws, connection_id)
}

pub async fn send_event(ws: &mut WsStream, event: Value) {
    ws.send(tungstenite::Message::Text(event.to_string().into()))
        .await
        .expect("send event");
}

pub async fn send_raw(ws: &mut WsStream, text: &str) {
    ws.send(tungstenite::Message::Text(text.to_string().into()))
        .await
        .expect("send raw frame");
}

/// Read the next text frame as JSON, skipping control frames.
pub async fn next_frame(ws: &mut WsStream) -> Value {
    time::timeout(FRAME_TIMEOUT, async {
        loop {
            let msg = ws
                .next()
                .await
                .expect("stream ended")
                .expect("ws read error");
            match msg {
                tungstenite::Message::Text(text) => {
                    return serde_json::from_str::<Value>(&text).expect("parse frame");
                }
                tungstenite::Message::Ping(_) | tungstenite::Message::Pong(_) => continue,
                other => panic!("unexpected frame: {other:?}"),
            }
        }
    })
    .await
    .expect("timeout waiting for frame")
}

/// Read the next frame, assert its event name, and return its payload.
pub async fn expect_event(ws: &mut WsStream, name: &str) -> Value {
    let frame = next_frame(ws).await;
    assert_eq!(frame["t"], name, "unexpected frame: {frame}");
    assert!(frame["s"].as_u64().unwrap() > 0);
    frame["d"].clone()
}

/// Assert that no text frame arrives within `window`.
pub async fn expect_silence(ws: &mut WsStream, window: Duration) {
    let result = time::timeout(window, async {
        loop {
            match ws.next().await {
                Some(Ok(tungstenite::Message::Text(text))) => return Some(text.to_string()),
                Some(Ok(tungstenite::Message::Ping(_))) | Some(Ok(tungstenite::Message::Pong(_))) => {
                    continue
                }
                _ => return None,
            }
        }
    })
    .await;

    if let Ok(Some(text)) = result {
        panic!("expected no frame, got: {text}");
    }
}

/// Display names from a roster payload.
pub fn roster_names(roster: &Value) -> Vec<String> {
    roster
        .as_array()
        .expect("roster is an array")
        .iter()
        .map(|s| s["displayName"].as_str().unwrap().to_string())
        .collect()
}
