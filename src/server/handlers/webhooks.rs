use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::server::AppState;
use crate::webhook::{PlatformEventType, WebhookEvent};

#[derive(Serialize)]
pub struct WebhookResponse {
    pub status: String,
}

/// Catch Google Meet webhooks and republish them as `googlemeet:webhook`
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Json<WebhookResponse> {
    let event = WebhookEvent::from_raw(&body, params);
    tracing::info!(
        "[googlemeet] Received Google Meet webhook. Processing and triggering a package event. {}",
        event.body
    );

    state
        .events
        .trigger_event(PlatformEventType::Webhook, event.into_value());

    Json(WebhookResponse {
        status: "ok".to_string(),
    })
}
