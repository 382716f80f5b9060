//! Broadcast hub for dispatching server events to open connections.
//!
//! Uses a single `tokio::sync::broadcast` channel. Every open connection
//! subscribes and filters payloads locally by audience, so targeted
//! deliveries (private messages, join errors) ride the same ordered stream
//! as public broadcasts.

use std::sync::Arc;

use huddle_common::ServerEvent;
use tokio::sync::broadcast;

/// Default capacity of the broadcast channel. Slow receivers that fall behind
/// skip messages (`RecvError::Lagged`) instead of stalling the room.
pub const BROADCAST_CAPACITY: usize = 4096;

/// Which connections a payload is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    /// Only these connection ids. Ids without an open connection are skipped.
    Only(Vec<String>),
}

impl Audience {
    pub fn includes(&self, connection_id: &str) -> bool {
        match self {
            Self::Everyone => true,
            Self::Only(ids) => ids.iter().any(|id| id == connection_id),
        }
    }
}

/// A payload published to all open connections.
#[derive(Debug, Clone)]
pub struct BroadcastPayload {
    pub audience: Audience,
    pub event: ServerEvent,
}

/// The broadcast hub. Cloneable.
#[derive(Clone)]
pub struct GatewayBroadcast {
    sender: broadcast::Sender<Arc<BroadcastPayload>>,
}

impl GatewayBroadcast {
    pub fn new() -> Self {
        Self::with_capacity(BROADCAST_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to the hub. Each connection calls this once when it opens
    /// and only sees payloads published afterwards.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<BroadcastPayload>> {
        self.sender.subscribe()
    }

    /// Publish to every open connection.
    pub fn to_everyone(&self, event: ServerEvent) {
        self.dispatch(BroadcastPayload {
            audience: Audience::Everyone,
            event,
        });
    }

    /// Publish to the listed connections only.
    pub fn to_connections(&self, connection_ids: Vec<String>, event: ServerEvent) {
        self.dispatch(BroadcastPayload {
            audience: Audience::Only(connection_ids),
            event,
        });
    }

    /// Best-effort single attempt: never blocks, never retries.
    pub fn dispatch(&self, payload: BroadcastPayload) {
        // send() returns Err when nobody is subscribed; nothing to do.
        let _ = self.sender.send(Arc::new(payload));
    }
}

impl Default for GatewayBroadcast {
    fn default() -> Self {
        Self::new()
    }
}
