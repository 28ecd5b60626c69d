#![allow(dead_code)]

use ivr_relay_api::{config::Config, router::create_router, state::AppState};
use ivr_relay_core::RelayPolicy;
use std::{net::SocketAddr, sync::Arc};
use tracing::Level;

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        audio_stream_host: "wss://relay.example.com/stream".to_string(),
        webhook_host: "https://hooks.example.com".to_string(),
        stream_content_type: "audio/mulaw;rate=8000".to_string(),
        log_level: Level::DEBUG,
        outbound_queue_capacity: 4,
        relay_policy: RelayPolicy::default(),
    }
}

pub fn test_router() -> axum::Router {
    create_router(Arc::new(AppState::new(test_config())))
}

/// Serves the router on an ephemeral port and returns its address.
pub async fn spawn_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, test_router()).await.unwrap();
    });
    addr
}
