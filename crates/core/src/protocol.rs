//! Defines the streaming message protocol between the call platform and the relay.
//!
//! Every frame is a JSON object tagged by its `payload` field. Audio bytes
//! travel base64 encoded.

use crate::error::RelayError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Messages sent from the call platform to the relay.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "payload")]
pub enum InboundEvent {
    /// The call was answered and its audio stream negotiated.
    #[serde(rename = "notify_call_started")]
    CallStarted {
        call_id: String,
        /// Audio encoding and sample rate, e.g. `audio/mulaw;rate=8000`.
        content_type: String,
    },
    /// The call has ended. The stream itself stays open until the transport ends it.
    #[serde(rename = "notify_call_ended")]
    CallEnded {
        call_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason_code: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// A frame of caller audio.
    #[serde(rename = "notify_audio_data")]
    AudioData {
        sequence_num: u32,
        #[serde(rename = "audio_data", with = "base64_bytes")]
        data: Bytes,
    },
    /// The caller finished pressing a DTMF key.
    #[serde(rename = "notify_dtmf_received_end_data")]
    DtmfReceived { digit: String },
    /// Any payload tag this relay does not know about.
    #[serde(other)]
    Unrecognized,
}

impl InboundEvent {
    /// Decodes a single text frame.
    pub fn decode(text: &str) -> Result<Self, RelayError> {
        serde_json::from_str(text).map_err(|e| RelayError::MalformedPayload(e.to_string()))
    }

    /// A short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::CallStarted { .. } => "notify_call_started",
            InboundEvent::CallEnded { .. } => "notify_call_ended",
            InboundEvent::AudioData { .. } => "notify_audio_data",
            InboundEvent::DtmfReceived { .. } => "notify_dtmf_received_end_data",
            InboundEvent::Unrecognized => "unrecognized",
        }
    }
}

/// Messages sent from the relay back to the call platform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "payload")]
pub enum OutboundEvent {
    /// Plays audio back to the caller.
    #[serde(rename = "audio_data")]
    AudioEcho {
        id: String,
        #[serde(rename = "audio_data", with = "base64_bytes")]
        data: Bytes,
        content_type: String,
        sequence_num: u32,
    },
    /// Presses DTMF keys on the call.
    #[serde(rename = "dtmf_data")]
    DtmfEcho {
        id: String,
        #[serde(rename = "dtmf_digits")]
        digits: String,
        press_duration_ms: u32,
        break_duration_ms: u32,
        sequence_num: u32,
    },
}

impl OutboundEvent {
    /// Encodes the event as a single text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn sequence_num(&self) -> u32 {
        match self {
            OutboundEvent::AudioEcho { sequence_num, .. }
            | OutboundEvent::DtmfEcho { sequence_num, .. } => *sequence_num,
        }
    }
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
