//! Axum Handlers for the Control-Plane API
//!
//! The call platform asks `/inbound` how to handle a new call and reports
//! post-call events to `/callback`. Neither endpoint holds any state.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    models::{AudioStream, CallCommand, ErrorResponse, STREAM_METADATA_TAG, StreamLocation},
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

/// Empty acknowledgement body.
#[derive(Serialize, ToSchema, Debug)]
pub struct Acknowledgement {}

/// Returns the call-instruction script for a new inbound call.
#[utoipa::path(
    post,
    path = "/inbound",
    responses(
        (status = 200, description = "Script telling the platform to stream call audio to the relay", body = [CallCommand])
    )
)]
#[instrument(skip_all)]
pub async fn inbound(State(state): State<Arc<AppState>>) -> Json<Vec<CallCommand>> {
    info!("Inbound call; returning audio stream script");
    let config = &state.config;
    Json(vec![CallCommand::AudioStream(AudioStream {
        location: StreamLocation {
            uri: config.audio_stream_host.clone(),
        },
        content_type: config.stream_content_type.clone(),
        action_url: config.callback_url(),
        metadata: vec![STREAM_METADATA_TAG.to_string()],
    })])
}

/// Accepts a post-call event from the call platform.
#[utoipa::path(
    post,
    path = "/callback",
    request_body(content = String, description = "Any JSON object describing a call event", content_type = "application/json"),
    responses(
        (status = 200, description = "Event acknowledged", body = Acknowledgement),
        (status = 400, description = "Body was not a JSON object", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn callback(body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let event: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid JSON".to_string()))?;
    info!(event = %serde_json::Value::Object(event), "Received call callback");
    Ok((StatusCode::OK, Json(Acknowledgement {})))
}
