mod handlers;
mod middleware;
mod routes;

pub use routes::create_router;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::models::Configuration;
use crate::webhook::EventBus;

/// Shared application state
pub struct AppState {
    pub config: Configuration,
    pub events: EventBus,
}

impl AppState {
    pub fn new(config: Configuration, events: EventBus) -> Self {
        Self { config, events }
    }
}

/// Run the webhook listener until the process is stopped
pub async fn run_server(addr: SocketAddr, config: Configuration, events: EventBus) -> Result<()> {
    if config.webhook_secret().is_none() {
        tracing::warn!("No webhookSecret configured, signed webhooks will not be checked");
    }

    let state = Arc::new(AppState::new(config, events));
    let app = create_router(state);

    tracing::info!("Webhook listener on {}{}", addr, crate::WEBHOOK_PATH);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
