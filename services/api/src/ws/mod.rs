//! WebSocket Stream Endpoint
//!
//! One WebSocket carries one call. The socket's frames are adapted into the
//! ordered signal feed consumed by `ivr_relay_core::StreamSessionHandler`,
//! and the handler's outbound queue is drained back onto the same socket.

pub mod session;

pub use session::ws_handler;
