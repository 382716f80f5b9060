//! Chat records and the closed set of gateway events exchanged over the wire.
//!
//! Every frame is a JSON object tagged by event name under `t` with its
//! payload under `d`. Server frames additionally carry a per-connection
//! sequence number under `s`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creation-ordered message identifier. Strictly increasing in append order.
pub type MessageId = u64;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// An identity bound to one live connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub connection_id: String,
    pub display_name: String,
}

/// A `(user, symbol)` annotation on a message. Not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub by_user: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: String,
    pub sender_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub is_private: bool,
    pub reactions: Vec<Reaction>,
    /// Display names that marked this message read, in first-read order.
    pub read_by: Vec<String>,
}

impl Message {
    /// Connection ids allowed to see this message, or `None` if it is public.
    pub fn participants(&self) -> Option<Vec<String>> {
        let recipient = self.recipient_id.as_ref()?;
        Some(vec![self.sender_id.clone(), recipient.clone()])
    }
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPayload {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateSendPayload {
    pub recipient_id: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactPayload {
    pub message_id: MessageId,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadPayload {
    pub message_id: MessageId,
}

/// Events a participant sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Carries the requested display name.
    Join(String),
    Send(SendPayload),
    PrivateSend(PrivateSendPayload),
    Typing(bool),
    React(ReactPayload),
    MarkRead(MarkReadPayload),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Send(_) => "send",
            Self::PrivateSend(_) => "private-send",
            Self::Typing(_) => "typing",
            Self::React(_) => "react",
            Self::MarkRead(_) => "mark-read",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Sent once to a connection when it opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
    pub connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

/// Events the server delivers to one or more connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "kebab-case")]
pub enum ServerEvent {
    Ready(ReadyPayload),
    Roster(Vec<Session>),
    ParticipantJoined(Session),
    ParticipantLeft(Session),
    Message(Message),
    MessageUpdated(Message),
    TypingList(Vec<String>),
    Error(ErrorPayload),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready(_) => "ready",
            Self::Roster(_) => "roster",
            Self::ParticipantJoined(_) => "participant-joined",
            Self::ParticipantLeft(_) => "participant-left",
            Self::Message(_) => "message",
            Self::MessageUpdated(_) => "message-updated",
            Self::TypingList(_) => "typing-list",
            Self::Error(_) => "error",
        }
    }
}

/// A server event stamped with the receiving connection's sequence number.
#[derive(Debug, Serialize)]
pub struct GatewayFrame<'a> {
    pub s: u64,
    #[serde(flatten)]
    pub event: &'a ServerEvent,
}
