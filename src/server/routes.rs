use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::signature_middleware;
use super::AppState;

/// Create the listener router
pub fn create_router(state: Arc<AppState>) -> Router {
    let webhook_routes = Router::new()
        .route(
            crate::WEBHOOK_PATH,
            any(handlers::webhooks::receive_webhook),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            signature_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/events", get(handlers::events::stream_events))
        .merge(webhook_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
