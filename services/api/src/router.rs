//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the relay: the
//! control-plane endpoints, the WebSocket stream endpoint, and the OpenAPI
//! documentation.

use crate::{
    handlers::{self, Acknowledgement},
    models::{AudioStream, CallCommand, ErrorResponse, StreamLocation},
    state::AppState,
    ws::ws_handler,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::inbound, handlers::callback),
    components(
        schemas(CallCommand, AudioStream, StreamLocation, Acknowledgement, ErrorResponse)
    ),
    tags(
        (name = "IVR Relay", description = "Control-plane endpoints for the call platform")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/inbound", post(handlers::inbound))
        .route("/callback", post(handlers::callback))
        .route("/stream", get(ws_handler))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
