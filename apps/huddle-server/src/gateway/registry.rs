//! Roster of joined connections.

use std::collections::HashMap;

use huddle_common::Session;

use crate::error::ChatError;

/// A roster slot. `order` fixes the snapshot position at first join.
struct RosterEntry {
    order: u64,
    session: Session,
}

/// Maps each joined connection to its identity.
///
/// Not internally synchronized: the gateway owns it behind the dispatcher
/// lock, which also makes every `snapshot` point-in-time consistent.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, RosterEntry>,
    next_order: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `display_name` to `connection_id`.
    ///
    /// The name is stored trimmed. Re-joining on the same connection
    /// overwrites the name but keeps the original roster position.
    pub fn join(&mut self, connection_id: &str, display_name: &str) -> Result<Session, ChatError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ChatError::InvalidIdentity);
        }

        let session = Session {
            connection_id: connection_id.to_string(),
            display_name: display_name.to_string(),
        };

        match self.sessions.get_mut(connection_id) {
            Some(entry) => entry.session = session.clone(),
            None => {
                let order = self.next_order;
                self.next_order += 1;
                self.sessions.insert(
                    connection_id.to_string(),
                    RosterEntry {
                        order,
                        session: session.clone(),
                    },
                );
            }
        }

        Ok(session)
    }

    /// Remove and return the session, or `None` if the connection never joined.
    pub fn leave(&mut self, connection_id: &str) -> Option<Session> {
        self.sessions.remove(connection_id).map(|e| e.session)
    }

    pub fn get(&self, connection_id: &str) -> Option<&Session> {
        self.sessions.get(connection_id).map(|e| &e.session)
    }

    /// Current roster in join order.
    pub fn snapshot(&self) -> Vec<Session> {
        let mut entries: Vec<&RosterEntry> = self.sessions.values().collect();
        entries.sort_by_key(|e| e.order);
        entries.into_iter().map(|e| e.session.clone()).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
