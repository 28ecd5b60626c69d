//! Manages the WebSocket connection lifecycle for a single call stream.

use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{
    SinkExt, StreamExt,
    stream::{BoxStream, SplitSink, SplitStream},
};
use ivr_relay_core::{
    ChannelSink, InboundEvent, OutboundEvent, StreamSessionHandler, TransportSignal,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, warn};
use uuid::Uuid;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Entry point for a new stream. Every call gets its own span and session.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    let session_span = tracing::info_span!("stream_session", %session_id);
    run_stream_session(socket, state)
        .instrument(session_span)
        .await;
}

/// Runs one stream session to completion.
///
/// The read half feeds the session handler; a separate writer task drains the
/// bounded outbound queue onto the write half, so a slow socket holds back the
/// reader instead of growing memory. Echoes still queued when the peer closes
/// the socket are dropped and counted.
async fn run_stream_session(socket: WebSocket, state: Arc<AppState>) {
    info!("New stream connection");
    let (socket_tx, socket_rx) = socket.split();
    let (mut sink, outbound_rx) = ChannelSink::channel(state.config.outbound_queue_capacity);

    let writer = tokio::spawn(write_outbound(socket_tx, outbound_rx).in_current_span());

    let handler = StreamSessionHandler::new(&state.config.relay_policy);
    let summary = handler.run(signal_feed(socket_rx), &mut sink).await;
    drop(sink);

    match writer.await {
        Ok(dropped) => info!(
            close_reason = ?summary.close_reason,
            dropped_echoes = dropped,
            "Stream connection closed"
        ),
        Err(e) => error!(error = ?e, "Outbound writer task panicked"),
    }
}

/// Adapts socket frames into the handler's ordered signal feed.
fn signal_feed(socket_rx: SplitStream<WebSocket>) -> BoxStream<'static, TransportSignal> {
    socket_rx
        .filter_map(|frame| async move {
            match frame {
                Ok(Message::Text(text)) => Some(InboundEvent::decode(text.as_str()).into()),
                Ok(Message::Binary(_)) => Some(TransportSignal::Malformed(
                    "binary frames are not part of the stream protocol".to_string(),
                )),
                Ok(Message::Close(_)) => Some(TransportSignal::End),
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => None,
                Err(e) => Some(TransportSignal::Error(e.to_string())),
            }
        })
        .boxed()
}

/// Drains the outbound queue onto the socket, then closes the write half.
///
/// Once the socket refuses a write, which is what happens after the peer's
/// Close frame has been read, every echo still queued is discarded. Returns
/// how many echoes were dropped that way.
async fn write_outbound(
    mut socket_tx: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<OutboundEvent>,
) -> usize {
    while let Some(event) = outbound_rx.recv().await {
        if let Err(e) = send_event(&mut socket_tx, &event).await {
            outbound_rx.close();
            let mut dropped = 1;
            while outbound_rx.recv().await.is_some() {
                dropped += 1;
            }
            warn!(error = ?e, dropped, "Socket stopped accepting writes; dropping queued echoes");
            return dropped;
        }
    }
    if let Err(e) = socket_tx.close().await {
        debug!(error = %e, "Socket already closed");
    }
    0
}

/// A helper function to serialize and send an `OutboundEvent` to the platform.
async fn send_event(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    event: &OutboundEvent,
) -> Result<()> {
    let serialized = event.encode()?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
