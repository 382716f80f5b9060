//! Connection identifiers.
//!
//! A connection id is assigned by the server when a socket opens and is the
//! only handle clients use to address each other (private sends, roster
//! entries, typing state). The format is `conn_<ULID>`.

use ulid::Ulid;

/// Builds `<prefix>_<ULID>`.
///
/// # Examples
/// ```
/// let id = huddle_common::id::prefixed_ulid("conn");
/// assert!(id.starts_with("conn_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new())
}

/// An id kind with a fixed textual prefix.
pub trait PrefixedId {
    const PREFIX: &'static str;

    fn generate() -> String {
        prefixed_ulid(Self::PREFIX)
    }
}

/// A live gateway connection, one per open socket.
pub struct ConnectionId;

impl PrefixedId for ConnectionId {
    const PREFIX: &'static str = "conn";
}
