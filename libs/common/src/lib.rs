pub mod id;
pub mod protocol;

pub use id::PrefixedId;
pub use protocol::{ClientEvent, Message, MessageId, Reaction, ServerEvent, Session};
