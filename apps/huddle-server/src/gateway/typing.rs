//! Who is currently composing a message.
//!
//! Purely reactive: there is no expiry timer here. A client that stops typing
//! is expected to send `typing=false`; disconnects are cleared by the gateway.

use std::collections::HashMap;

struct TypingEntry {
    order: u64,
    display_name: String,
}

#[derive(Default)]
pub struct TypingTracker {
    typing: HashMap<String, TypingEntry>,
    next_order: u64,
}

impl TypingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark or unmark a connection as typing. Returns the full list of typing
    /// display names, in the order they started typing.
    pub fn set_typing(&mut self, connection_id: &str, display_name: &str, is_typing: bool) -> Vec<String> {
        if is_typing {
            match self.typing.get_mut(connection_id) {
                Some(entry) => entry.display_name = display_name.to_string(),
                None => {
                    let order = self.next_order;
                    self.next_order += 1;
                    self.typing.insert(
                        connection_id.to_string(),
                        TypingEntry {
                            order,
                            display_name: display_name.to_string(),
                        },
                    );
                }
            }
        } else {
            self.typing.remove(connection_id);
        }
        self.snapshot()
    }

    /// Drop the connection's entry, if any.
    pub fn clear(&mut self, connection_id: &str) {
        self.typing.remove(connection_id);
    }

    pub fn snapshot(&self) -> Vec<String> {
        let mut entries: Vec<&TypingEntry> = self.typing.values().collect();
        entries.sort_by_key(|e| e.order);
        entries.into_iter().map(|e| e.display_name.clone()).collect()
    }

    pub fn is_typing(&self, connection_id: &str) -> bool {
        self.typing.contains_key(connection_id)
    }
}
