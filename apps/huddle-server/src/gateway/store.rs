//! Bounded, in-memory message log.

use std::collections::VecDeque;

use chrono::Utc;
use huddle_common::{Message, MessageId, Reaction};

use crate::error::ChatError;

/// Maximum number of messages retained in the log.
pub const MAX_MESSAGES: usize = 100;

/// Append-only log of the most recent messages, oldest first.
///
/// Messages are mutated in place by reactions and read receipts and are only
/// ever removed by capacity eviction.
pub struct MessageStore {
    log: VecDeque<Message>,
    capacity: usize,
    /// Id handed to the next appended message. Never reused.
    next_id: MessageId,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_MESSAGES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            log: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Record a new message. Evicts the oldest entry if the log is full.
    pub fn append(
        &mut self,
        sender_id: &str,
        sender_name: &str,
        body: &str,
        recipient_id: Option<&str>,
    ) -> Message {
        let id = self.next_id;
        self.next_id += 1;

        let message = Message {
            id,
            sender_id: sender_id.to_string(),
            sender_name: sender_name.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
            recipient_id: recipient_id.map(str::to_string),
            is_private: recipient_id.is_some(),
            reactions: Vec::new(),
            read_by: Vec::new(),
        };

        self.log.push_back(message.clone());
        while self.log.len() > self.capacity {
            if let Some(evicted) = self.log.pop_front() {
                tracing::trace!(message_id = evicted.id, "evicted message from log");
            }
        }

        message
    }

    pub fn find_by_id(&self, id: MessageId) -> Option<&Message> {
        // Ids are strictly increasing, so the log is sorted by id.
        let idx = self.log.binary_search_by_key(&id, |m| m.id).ok()?;
        self.log.get(idx)
    }

    fn find_mut(&mut self, id: MessageId) -> Result<&mut Message, ChatError> {
        let idx = self
            .log
            .binary_search_by_key(&id, |m| m.id)
            .map_err(|_| ChatError::NotFound { message_id: id })?;
        self.log
            .get_mut(idx)
            .ok_or(ChatError::NotFound { message_id: id })
    }

    /// Append a reaction. Repeats from the same user are kept.
    pub fn add_reaction(
        &mut self,
        id: MessageId,
        by_user: &str,
        symbol: &str,
    ) -> Result<Message, ChatError> {
        let message = self.find_mut(id)?;
        message.reactions.push(Reaction {
            by_user: by_user.to_string(),
            symbol: symbol.to_string(),
        });
        Ok(message.clone())
    }

    /// Add `user` to the message's read set. Idempotent.
    pub fn mark_read(&mut self, id: MessageId, user: &str) -> Result<Message, ChatError> {
        let message = self.find_mut(id)?;
        if !message.read_by.iter().any(|u| u == user) {
            message.read_by.push(user.to_string());
        }
        Ok(message.clone())
    }

    /// Copy of the whole log, oldest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.log.iter().cloned().collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.log.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}
