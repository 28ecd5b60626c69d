//! Control-Plane Models
//!
//! The call-instruction script returned to the call platform and the shared
//! error body, with `utoipa` schemas for the OpenAPI document.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Metadata tag attached to every audio stream this relay requests.
pub const STREAM_METADATA_TAG: &str = "testing";

/// One command of a call-instruction script.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub enum CallCommand {
    /// Tells the platform to open a bidirectional audio stream to the relay.
    AudioStream(AudioStream),
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioStream {
    pub location: StreamLocation,
    #[schema(example = "audio/mulaw;rate=8000")]
    pub content_type: String,
    /// Where the platform posts events once the stream finishes.
    pub action_url: String,
    pub metadata: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct StreamLocation {
    pub uri: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}
