//! Event router: applies inbound events to the chat components and fans out
//! the resulting state changes.
//!
//! All three components live behind one dispatcher lock. Each inbound event,
//! including disconnect cleanup, runs to completion under that lock and
//! publishes its outbound events before releasing it, so every connection
//! observes broadcasts in processing order and never sees a half-applied
//! disconnect.

use std::sync::Arc;

use huddle_common::id::{ConnectionId, PrefixedId};
use huddle_common::protocol::{ErrorPayload, ReadyPayload};
use huddle_common::{ClientEvent, Message, MessageId, ServerEvent, Session};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::error::ChatError;

use super::fanout::{BroadcastPayload, GatewayBroadcast};
use super::registry::SessionRegistry;
use super::session::GatewaySession;
use super::store::MessageStore;
use super::typing::TypingTracker;

/// Longest accepted message body, in characters.
pub const MAX_BODY_CHARS: usize = 4000;

/// The chat state owned by one gateway.
#[derive(Default)]
struct ChatCore {
    sessions: SessionRegistry,
    messages: MessageStore,
    typing: TypingTracker,
}

/// A freshly opened connection: its state plus its fan-out subscription.
pub struct OpenedConnection {
    pub session: GatewaySession,
    pub events: broadcast::Receiver<Arc<BroadcastPayload>>,
}

pub struct Gateway {
    core: Mutex<ChatCore>,
    broadcast: GatewayBroadcast,
}

impl Gateway {
    pub fn new() -> Self {
        Self::with_broadcast(GatewayBroadcast::new())
    }

    pub fn with_broadcast(broadcast: GatewayBroadcast) -> Self {
        Self {
            core: Mutex::new(ChatCore::default()),
            broadcast,
        }
    }

    /// Allocate a connection id and subscribe it to the fan-out hub.
    ///
    /// The subscription is taken under the dispatcher lock, so the connection
    /// receives exactly the broadcasts processed after it opened, starting
    /// with a `ready` frame carrying its own id.
    pub fn open(&self) -> OpenedConnection {
        let _core = self.core.lock();
        let connection_id = ConnectionId::generate();
        let events = self.broadcast.subscribe();
        self.broadcast.to_connections(
            vec![connection_id.clone()],
            ServerEvent::Ready(ReadyPayload {
                connection_id: connection_id.clone(),
            }),
        );
        OpenedConnection {
            session: GatewaySession::new(connection_id),
            events,
        }
    }

    /// Apply one inbound event from `connection_id`.
    ///
    /// Errors are informational only: every failure has already been
    /// absorbed (nothing changed, nothing broadcast) by the time it returns.
    pub fn handle(&self, connection_id: &str, event: ClientEvent) -> Result<(), ChatError> {
        let mut core = self.core.lock();

        match event {
            ClientEvent::Join(display_name) => self.join(&mut core, connection_id, &display_name),
            ClientEvent::Send(payload) => {
                let sender = require_session(&core, connection_id)?;
                self.send(&mut core, &sender, &payload.body, None)
            }
            ClientEvent::PrivateSend(payload) => {
                let sender = require_session(&core, connection_id)?;
                self.send(&mut core, &sender, &payload.body, Some(payload.recipient_id.as_str()))
            }
            ClientEvent::Typing(is_typing) => {
                let session = require_session(&core, connection_id)?;
                let list = core
                    .typing
                    .set_typing(connection_id, &session.display_name, is_typing);
                self.broadcast.to_everyone(ServerEvent::TypingList(list));
                Ok(())
            }
            ClientEvent::React(payload) => {
                let session = require_session(&core, connection_id)?;
                let message = core.messages.add_reaction(
                    payload.message_id,
                    &session.display_name,
                    &payload.symbol,
                )?;
                self.publish_update(message);
                Ok(())
            }
            ClientEvent::MarkRead(payload) => {
                let session = require_session(&core, connection_id)?;
                let message = core
                    .messages
                    .mark_read(payload.message_id, &session.display_name)?;
                self.publish_update(message);
                Ok(())
            }
        }
    }

    /// Disconnect cleanup. Unconditional and infallible.
    ///
    /// Registry removal and typing-clear happen under a single lock hold,
    /// followed by the left notice, roster, and typing list. Connections
    /// that never joined leave no trace and trigger no broadcast.
    pub fn close(&self, connection_id: &str) {
        let mut core = self.core.lock();
        let left = core.sessions.leave(connection_id);
        core.typing.clear(connection_id);

        let Some(session) = left else {
            tracing::debug!(%connection_id, "connection closed before joining");
            return;
        };

        tracing::info!(
            %connection_id,
            display_name = %session.display_name,
            "participant left"
        );

        self.broadcast.to_everyone(ServerEvent::ParticipantLeft(session));
        self.broadcast
            .to_everyone(ServerEvent::Roster(core.sessions.snapshot()));
        self.broadcast
            .to_everyone(ServerEvent::TypingList(core.typing.snapshot()));
    }

    /// Current roster in join order.
    pub fn roster(&self) -> Vec<Session> {
        self.core.lock().sessions.snapshot()
    }

    /// Display names of participants currently typing.
    pub fn typing(&self) -> Vec<String> {
        self.core.lock().typing.snapshot()
    }

    /// Public messages in the log, oldest first. Private messages are
    /// never exposed through the read interface.
    pub fn public_messages(&self) -> Vec<Message> {
        self.core
            .lock()
            .messages
            .snapshot()
            .into_iter()
            .filter(|m| !m.is_private)
            .collect()
    }

    /// Look up a public message still in the log.
    pub fn public_message(&self, id: MessageId) -> Result<Message, ChatError> {
        let core = self.core.lock();
        core.messages
            .find_by_id(id)
            .filter(|m| !m.is_private)
            .cloned()
            .ok_or(ChatError::NotFound { message_id: id })
    }

    fn join(&self, core: &mut ChatCore, connection_id: &str, display_name: &str) -> Result<(), ChatError> {
        let session = match core.sessions.join(connection_id, display_name) {
            Ok(session) => session,
            Err(err) => {
                self.broadcast.to_connections(
                    vec![connection_id.to_string()],
                    ServerEvent::Error(ErrorPayload {
                        code: err.code().to_string(),
                        message: err.to_string(),
                    }),
                );
                return Err(err);
            }
        };

        tracing::info!(
            %connection_id,
            display_name = %session.display_name,
            "participant joined"
        );

        // A rename must not leave the old name in the typing list.
        let typing_list = if core.typing.is_typing(connection_id) {
            Some(core.typing.set_typing(connection_id, &session.display_name, true))
        } else {
            None
        };

        self.broadcast
            .to_everyone(ServerEvent::Roster(core.sessions.snapshot()));
        self.broadcast
            .to_everyone(ServerEvent::ParticipantJoined(session));
        if let Some(list) = typing_list {
            self.broadcast.to_everyone(ServerEvent::TypingList(list));
        }
        Ok(())
    }

    fn send(
        &self,
        core: &mut ChatCore,
        sender: &Session,
        body: &str,
        recipient_id: Option<&str>,
    ) -> Result<(), ChatError> {
        let body = body.trim();
        if body.is_empty() || body.chars().count() > MAX_BODY_CHARS {
            return Err(ChatError::InvalidBody {
                max: MAX_BODY_CHARS,
            });
        }

        let message = core.messages.append(
            &sender.connection_id,
            &sender.display_name,
            body,
            recipient_id,
        );

        match message.participants() {
            // Delivered to whichever of the two is still open; no retry.
            Some(participants) => {
                tracing::debug!(
                    message_id = message.id,
                    sender_id = %sender.connection_id,
                    recipient_id = ?recipient_id,
                    "private message stored"
                );
                self.broadcast
                    .to_connections(participants, ServerEvent::Message(message));
            }
            None => self.broadcast.to_everyone(ServerEvent::Message(message)),
        }
        Ok(())
    }

    /// Updates to a private message stay between its two parties.
    fn publish_update(&self, message: Message) {
        match message.participants() {
            Some(participants) => self
                .broadcast
                .to_connections(participants, ServerEvent::MessageUpdated(message)),
            None => self
                .broadcast
                .to_everyone(ServerEvent::MessageUpdated(message)),
        }
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

fn require_session(core: &ChatCore, connection_id: &str) -> Result<Session, ChatError> {
    core.sessions
        .get(connection_id)
        .cloned()
        .ok_or(ChatError::UnauthenticatedEvent)
}
