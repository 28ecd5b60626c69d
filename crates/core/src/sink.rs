//! The write side of a stream session.

use crate::{error::RelayError, protocol::OutboundEvent};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Where a session writes its outbound events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutboundSink: Send {
    /// Writes one event. An error here ends the session as a transport error.
    async fn send(&mut self, event: OutboundEvent) -> Result<(), RelayError>;

    /// Closes the outbound side. Further sends fail.
    async fn close(&mut self) -> Result<(), RelayError>;
}

/// A sink backed by a bounded per-session queue.
///
/// When the queue is full `send` waits for the transport writer to drain it,
/// which holds back the session's read loop.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Option<mpsc::Sender<OutboundEvent>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<OutboundEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Creates a sink and the receiver the transport writer drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl OutboundSink for ChannelSink {
    async fn send(&mut self, event: OutboundEvent) -> Result<(), RelayError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| RelayError::Transport("outbound side already closed".to_string()))?;
        tx.send(event)
            .await
            .map_err(|_| RelayError::Transport("outbound writer has gone away".to_string()))
    }

    async fn close(&mut self) -> Result<(), RelayError> {
        self.tx.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dtmf(sequence_num: u32) -> OutboundEvent {
        OutboundEvent::DtmfEcho {
            id: "echo".to_string(),
            digits: "1".to_string(),
            press_duration_ms: 100,
            break_duration_ms: 100,
            sequence_num,
        }
    }

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (mut sink, mut rx) = ChannelSink::channel(4);
        sink.send(dtmf(1)).await.unwrap();
        sink.send(dtmf(2)).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().sequence_num(), 1);
        assert_eq!(rx.recv().await.unwrap().sequence_num(), 2);
    }

    #[tokio::test]
    async fn test_close_ends_the_receiver_and_rejects_sends() {
        let (mut sink, mut rx) = ChannelSink::channel(4);
        sink.close().await.unwrap();
        assert!(rx.recv().await.is_none());

        let err = sink.send(dtmf(1)).await.unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)));
    }

    #[tokio::test]
    async fn test_send_fails_when_writer_dropped() {
        let (mut sink, rx) = ChannelSink::channel(1);
        drop(rx);
        let err = sink.send(dtmf(1)).await.unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)));
    }
}
