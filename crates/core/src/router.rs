//! Classifies inbound events and dispatches them to the relays.

use crate::{
    error::RelayError,
    protocol::{InboundEvent, OutboundEvent},
    relay::{AudioRelay, DtmfRelay, RelayPolicy},
    session::SessionState,
};
use tracing::{debug, info};

/// Routes each inbound event to the handler for its payload variant.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    audio: AudioRelay,
    dtmf: DtmfRelay,
}

impl MessageRouter {
    pub fn new(policy: &RelayPolicy) -> Self {
        Self {
            audio: AudioRelay::from(policy),
            dtmf: DtmfRelay::from(policy),
        }
    }

    /// Applies one event to the session and returns the echo to send, if any.
    ///
    /// Errors returned here are always recoverable: the caller logs them and
    /// keeps the session running.
    pub fn route(
        &self,
        session: &mut SessionState,
        event: InboundEvent,
    ) -> Result<Option<OutboundEvent>, RelayError> {
        match event {
            InboundEvent::CallStarted {
                call_id,
                content_type,
            } => {
                info!(%call_id, %content_type, "Call started");
                session.set_content_type(content_type);
                Ok(None)
            }
            InboundEvent::CallEnded {
                call_id,
                reason_code,
                reason,
            } => {
                info!(%call_id, ?reason_code, ?reason, "Call ended");
                Ok(None)
            }
            InboundEvent::AudioData { sequence_num, data } => {
                debug!(sequence_num, bytes = data.len(), "Received audio data");
                match session.content_type() {
                    Some(content_type) => Ok(Some(self.audio.echo(content_type, sequence_num, data))),
                    None => Err(RelayError::MissingContentType { sequence_num }),
                }
            }
            InboundEvent::DtmfReceived { digit } => {
                info!(%digit, "Received DTMF digit");
                let sequence_num = session.next_dtmf_sequence();
                Ok(Some(self.dtmf.echo(digit, sequence_num)))
            }
            InboundEvent::Unrecognized => Err(RelayError::UnrecognizedPayload),
        }
    }
}
