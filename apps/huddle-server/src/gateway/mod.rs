//! Real-time chat gateway: roster, message log, typing state, and the event
//! router that fans their changes out over WebSocket connections.

pub mod fanout;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod store;
pub mod typing;

pub use router::Gateway;
