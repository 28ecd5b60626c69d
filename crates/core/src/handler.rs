//! The per-stream session state machine.
//!
//! A `StreamSessionHandler` owns one `SessionState` and consumes a single
//! ordered feed of transport signals. Each signal is handled to completion
//! before the next one is read, so events of one session are never reordered
//! or processed concurrently. Once the handler is `Closed` it accepts nothing.

use crate::{
    error::RelayError,
    protocol::{InboundEvent, OutboundEvent},
    relay::RelayPolicy,
    router::MessageRouter,
    session::SessionState,
    sink::OutboundSink,
};
use futures::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

/// A lifecycle signal delivered by the transport for one stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSignal {
    /// A decoded inbound event.
    Data(InboundEvent),
    /// A frame that could not be decoded.
    Malformed(String),
    /// The remote side finished the stream.
    End,
    /// The transport failed.
    Error(String),
}

impl From<Result<InboundEvent, RelayError>> for TransportSignal {
    fn from(decoded: Result<InboundEvent, RelayError>) -> Self {
        match decoded {
            Ok(event) => TransportSignal::Data(event),
            Err(e) => TransportSignal::Malformed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// Stream established, nothing processed yet.
    Open,
    /// At least one event processed.
    Active,
    /// Terminal.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    EndOfStream,
    TransportError(String),
}

/// Counters kept for the lifetime of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub events_received: u64,
    pub echoes_emitted: u64,
    pub missing_content_type: u64,
    pub unrecognized: u64,
    pub malformed: u64,
}

/// What a finished session reports back to its transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub close_reason: CloseReason,
    pub stats: SessionStats,
}

pub struct StreamSessionHandler {
    state: HandlerState,
    session: SessionState,
    router: MessageRouter,
    stats: SessionStats,
    close_reason: Option<CloseReason>,
}

impl StreamSessionHandler {
    pub fn new(policy: &RelayPolicy) -> Self {
        Self {
            state: HandlerState::Open,
            session: SessionState::new(),
            router: MessageRouter::new(policy),
            stats: SessionStats::default(),
            close_reason: None,
        }
    }

    pub fn state(&self) -> HandlerState {
        self.state
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Applies one transport signal and returns the event to write, if any.
    ///
    /// Signals arriving after the handler closed are ignored.
    pub fn on_signal(&mut self, signal: TransportSignal) -> Option<OutboundEvent> {
        if self.state == HandlerState::Closed {
            debug!(?signal, "Ignoring signal on closed session");
            return None;
        }

        match signal {
            TransportSignal::Data(event) => self.on_event(event),
            TransportSignal::Malformed(reason) => {
                self.state = HandlerState::Active;
                self.stats.malformed += 1;
                warn!(%reason, "Dropping malformed frame");
                None
            }
            TransportSignal::End => {
                info!("Stream completed by remote side");
                self.close(CloseReason::EndOfStream);
                None
            }
            TransportSignal::Error(err) => {
                error!(error = %err, "Stream transport error; closing session");
                self.close(CloseReason::TransportError(err));
                None
            }
        }
    }

    fn on_event(&mut self, event: InboundEvent) -> Option<OutboundEvent> {
        self.state = HandlerState::Active;
        self.stats.events_received += 1;
        let kind = event.kind();

        match self.router.route(&mut self.session, event) {
            Ok(outbound) => outbound,
            Err(e) if !e.is_recoverable() => {
                error!(event = kind, error = %e, "Unrecoverable error; closing session");
                self.close(CloseReason::TransportError(e.to_string()));
                None
            }
            Err(e) => {
                match e {
                    RelayError::MissingContentType { .. } => self.stats.missing_content_type += 1,
                    RelayError::UnrecognizedPayload => self.stats.unrecognized += 1,
                    RelayError::MalformedPayload(_) => self.stats.malformed += 1,
                    RelayError::Transport(_) => {}
                }
                warn!(event = kind, error = %e, "Dropping event");
                None
            }
        }
    }

    fn close(&mut self, reason: CloseReason) {
        self.state = HandlerState::Closed;
        self.close_reason = Some(reason);
    }

    /// Drives the session until the feed ends or fails.
    ///
    /// A feed that finishes without an explicit `End` is treated as one. A
    /// failed write to the sink closes the session as a transport error.
    /// `echoes_emitted` counts only writes the sink accepted.
    pub async fn run<F, S>(mut self, mut feed: F, sink: &mut S) -> SessionSummary
    where
        F: Stream<Item = TransportSignal> + Unpin,
        S: OutboundSink + ?Sized,
    {
        info!("Starting stream session");

        while self.state != HandlerState::Closed {
            let signal = feed.next().await.unwrap_or(TransportSignal::End);
            if let Some(outbound) = self.on_signal(signal) {
                match sink.send(outbound).await {
                    Ok(()) => self.stats.echoes_emitted += 1,
                    Err(e) => {
                        self.on_signal(TransportSignal::Error(e.to_string()));
                    }
                }
            }
        }

        if let Err(e) = sink.close().await {
            warn!(error = %e, "Failed to close outbound side");
        }

        let summary = SessionSummary {
            close_reason: self.close_reason.unwrap_or(CloseReason::EndOfStream),
            stats: self.stats,
        };
        info!(
            close_reason = ?summary.close_reason,
            events_received = summary.stats.events_received,
            echoes_emitted = summary.stats.echoes_emitted,
            missing_content_type = summary.stats.missing_content_type,
            unrecognized = summary.stats.unrecognized,
            malformed = summary.stats.malformed,
            "Stream session finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{ChannelSink, MockOutboundSink};
    use bytes::Bytes;
    use futures::stream;

    fn handler() -> StreamSessionHandler {
        StreamSessionHandler::new(&RelayPolicy::default())
    }

    fn started() -> TransportSignal {
        TransportSignal::Data(InboundEvent::CallStarted {
            call_id: "c1".to_string(),
            content_type: "audio/mulaw;rate=8000".to_string(),
        })
    }

    fn audio(sequence_num: u32) -> TransportSignal {
        TransportSignal::Data(InboundEvent::AudioData {
            sequence_num,
            data: Bytes::from_static(b"\x01"),
        })
    }

    #[test]
    fn test_state_transitions() {
        let mut handler = handler();
        assert_eq!(handler.state(), HandlerState::Open);

        handler.on_signal(started());
        assert_eq!(handler.state(), HandlerState::Active);

        handler.on_signal(TransportSignal::End);
        assert_eq!(handler.state(), HandlerState::Closed);
    }

    #[test]
    fn test_end_before_any_event_closes() {
        let mut handler = handler();
        handler.on_signal(TransportSignal::End);
        assert_eq!(handler.state(), HandlerState::Closed);
    }

    #[test]
    fn test_closed_session_produces_nothing() {
        let mut handler = handler();
        handler.on_signal(started());
        handler.on_signal(TransportSignal::Error("connection reset".to_string()));

        assert!(handler.on_signal(audio(1)).is_none());
        assert!(handler
            .on_signal(TransportSignal::Data(InboundEvent::DtmfReceived { digit: "1".into() }))
            .is_none());
        assert_eq!(handler.state(), HandlerState::Closed);
        assert_eq!(handler.stats().events_received, 1);
    }

    #[test]
    fn test_recovered_conditions_are_counted() {
        let mut handler = handler();
        assert!(handler.on_signal(audio(1)).is_none());
        assert!(handler.on_signal(TransportSignal::Data(InboundEvent::Unrecognized)).is_none());
        assert!(handler.on_signal(TransportSignal::Malformed("bad json".into())).is_none());

        assert_eq!(handler.state(), HandlerState::Active);
        assert_eq!(handler.stats().missing_content_type, 1);
        assert_eq!(handler.stats().unrecognized, 1);
        assert_eq!(handler.stats().malformed, 1);
        assert_eq!(handler.session().content_type(), None);
    }

    #[test]
    fn test_decoded_frame_converts_to_signal() {
        let ok: TransportSignal = InboundEvent::decode(r#"{"payload":"notify_dtmf_received_end_data","digit":"9"}"#).into();
        assert_eq!(
            ok,
            TransportSignal::Data(InboundEvent::DtmfReceived { digit: "9".into() })
        );
        let bad: TransportSignal = InboundEvent::decode("{").into();
        assert!(matches!(bad, TransportSignal::Malformed(_)));
    }

    #[tokio::test]
    async fn test_run_treats_exhausted_feed_as_end() {
        let (mut sink, mut rx) = ChannelSink::channel(8);
        let feed = stream::iter(vec![started(), audio(3)]);

        let summary = handler().run(feed, &mut sink).await;

        assert_eq!(summary.close_reason, CloseReason::EndOfStream);
        assert_eq!(rx.recv().await.unwrap().sequence_num(), 3);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_sink_failure_closes_as_transport_error() {
        let mut sink = MockOutboundSink::new();
        sink.expect_send()
            .times(1)
            .returning(|_| Err(RelayError::Transport("socket closed".to_string())));
        sink.expect_close().times(1).returning(|| Ok(()));

        let feed = stream::iter(vec![started(), audio(1), audio(2)]);
        let summary = handler().run(feed, &mut sink).await;

        assert_eq!(
            summary.close_reason,
            CloseReason::TransportError("Transport error: socket closed".to_string())
        );
        assert_eq!(summary.stats.events_received, 2);
        assert_eq!(summary.stats.echoes_emitted, 0);
    }

    #[tokio::test]
    async fn test_echoes_emitted_counts_only_accepted_writes() {
        let mut sink = MockOutboundSink::new();
        let mut accepted = 0;
        sink.expect_send().times(2).returning(move |_| {
            accepted += 1;
            if accepted == 1 {
                Ok(())
            } else {
                Err(RelayError::Transport("socket closed".to_string()))
            }
        });
        sink.expect_close().times(1).returning(|| Ok(()));

        let feed = stream::iter(vec![
            TransportSignal::Data(InboundEvent::DtmfReceived { digit: "1".into() }),
            TransportSignal::Data(InboundEvent::DtmfReceived { digit: "2".into() }),
        ]);
        let summary = handler().run(feed, &mut sink).await;

        assert_eq!(summary.stats.events_received, 2);
        assert_eq!(summary.stats.echoes_emitted, 1);
        assert!(matches!(summary.close_reason, CloseReason::TransportError(_)));
    }
}
