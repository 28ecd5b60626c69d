//! IVR Relay API Library Crate
//!
//! This library contains the service surface of the relay: configuration,
//! shared state, the control-plane HTTP handlers, the WebSocket stream
//! endpoint, and routing. The `relay` binary is a thin wrapper around it.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod ws;
