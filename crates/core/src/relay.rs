//! Builders for the relay's outbound echo events.

use crate::protocol::OutboundEvent;
use bytes::Bytes;

pub const DEFAULT_AUDIO_ECHO_ID: &str = "testing";
pub const DEFAULT_DTMF_ECHO_ID: &str = "echo";
pub const DEFAULT_DTMF_PRESS_DURATION_MS: u32 = 100;
pub const DEFAULT_DTMF_BREAK_DURATION_MS: u32 = 100;

/// The relay's own correlation ids and synthesized-tone timing.
///
/// None of these are derived from inbound events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayPolicy {
    pub audio_echo_id: String,
    pub dtmf_echo_id: String,
    pub dtmf_press_duration_ms: u32,
    pub dtmf_break_duration_ms: u32,
}

impl Default for RelayPolicy {
    fn default() -> Self {
        Self {
            audio_echo_id: DEFAULT_AUDIO_ECHO_ID.to_string(),
            dtmf_echo_id: DEFAULT_DTMF_ECHO_ID.to_string(),
            dtmf_press_duration_ms: DEFAULT_DTMF_PRESS_DURATION_MS,
            dtmf_break_duration_ms: DEFAULT_DTMF_BREAK_DURATION_MS,
        }
    }
}

/// Echoes caller audio back onto the stream.
#[derive(Debug, Clone)]
pub struct AudioRelay {
    id: String,
}

impl AudioRelay {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Builds the echo for one audio frame.
    ///
    /// The payload and sequence number are carried over untouched; callers
    /// must only invoke this once the content type is known.
    pub fn echo(&self, content_type: &str, sequence_num: u32, data: Bytes) -> OutboundEvent {
        OutboundEvent::AudioEcho {
            id: self.id.clone(),
            data,
            content_type: content_type.to_string(),
            sequence_num,
        }
    }
}

/// Presses the received digit back on the call.
#[derive(Debug, Clone)]
pub struct DtmfRelay {
    id: String,
    press_duration_ms: u32,
    break_duration_ms: u32,
}

impl DtmfRelay {
    pub fn new(id: impl Into<String>, press_duration_ms: u32, break_duration_ms: u32) -> Self {
        Self {
            id: id.into(),
            press_duration_ms,
            break_duration_ms,
        }
    }

    pub fn echo(&self, digit: String, sequence_num: u32) -> OutboundEvent {
        OutboundEvent::DtmfEcho {
            id: self.id.clone(),
            digits: digit,
            press_duration_ms: self.press_duration_ms,
            break_duration_ms: self.break_duration_ms,
            sequence_num,
        }
    }
}

impl From<&RelayPolicy> for AudioRelay {
    fn from(policy: &RelayPolicy) -> Self {
        AudioRelay::new(policy.audio_echo_id.clone())
    }
}

impl From<&RelayPolicy> for DtmfRelay {
    fn from(policy: &RelayPolicy) -> Self {
        DtmfRelay::new(
            policy.dtmf_echo_id.clone(),
            policy.dtmf_press_duration_ms,
            policy.dtmf_break_duration_ms,
        )
    }
}
