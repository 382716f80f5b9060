//! Per-connection gateway state.

use std::sync::atomic::{AtomicU64, Ordering};

use super::fanout::Audience;

/// State for a single WebSocket connection.
pub struct GatewaySession {
    /// Unique connection identifier (`conn_` prefixed ULID).
    pub connection_id: String,
    /// Monotonically increasing sequence number for outbound frames.
    seq: AtomicU64,
}

impl GatewaySession {
    pub fn new(connection_id: String) -> Self {
        Self {
            connection_id,
            seq: AtomicU64::new(0),
        }
    }

    /// Get the next sequence number for an outbound frame.
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Check whether a fan-out payload is addressed to this connection.
    pub fn is_addressed(&self, audience: &Audience) -> bool {
        audience.includes(&self.connection_id)
    }
}
