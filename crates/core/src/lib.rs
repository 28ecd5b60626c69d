//! IVR Relay Core
//!
//! Transport-independent logic for the per-call streaming relay: the wire
//! protocol types, the per-call session state, the message router with its
//! audio and DTMF relays, and the session handler state machine that ties
//! them to a single ordered feed of transport signals.

pub mod error;
pub mod handler;
pub mod protocol;
pub mod relay;
pub mod router;
pub mod session;
pub mod sink;

pub use error::RelayError;
pub use handler::{
    CloseReason, HandlerState, SessionStats, SessionSummary, StreamSessionHandler,
    TransportSignal,
};
pub use protocol::{InboundEvent, OutboundEvent};
pub use relay::{AudioRelay, DtmfRelay, RelayPolicy};
pub use router::MessageRouter;
pub use session::SessionState;
pub use sink::{ChannelSink, OutboundSink};
