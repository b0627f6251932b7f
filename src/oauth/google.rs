use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{build_configuration, Authenticator, OAuthConfig, TokenStore};
use crate::error::{Error, Result};
use crate::models::Configuration;
use crate::webhook::{EventBus, PlatformEventType};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

/// Google OAuth2 authenticator backed by a token store
pub struct GoogleOAuth {
    client: reqwest::Client,
    config: OAuthConfig,
    store: Arc<dyn TokenStore>,
    events: Option<EventBus>,
    refresh_lock: Mutex<()>,
}

impl GoogleOAuth {
    pub fn new(config: OAuthConfig, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            store,
            events: None,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Build from package configuration, running the configuration builder if needed
    pub fn from_configuration(config: &Configuration, store: Arc<dyn TokenStore>) -> Result<Self> {
        let oauth = match &config.oauth {
            Some(oauth) => oauth.clone(),
            None => build_configuration(config.clone())
                .oauth
                .ok_or_else(|| Error::Config("authentication method is not oAuth2".to_string()))?,
        };
        Ok(Self::new(oauth, store))
    }

    /// Publish connect/refresh/disconnect events on the given bus
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    fn client_credentials(&self) -> Result<(&str, &str)> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or_else(|| Error::Config("clientId is not configured".to_string()))?;
        let client_secret = self
            .config
            .client_secret
            .as_deref()
            .ok_or_else(|| Error::Config("clientSecret is not configured".to_string()))?;
        Ok((client_id, client_secret))
    }

    /// URL the user is sent to for consent
    pub fn authorization_url(&self, state: &str) -> Result<String> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or_else(|| Error::Config("clientId is not configured".to_string()))?;

        let mut params = vec![
            ("client_id", client_id),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ];
        if let Some(callback) = self.config.oauth_callback.as_deref() {
            params.push(("redirect_uri", callback));
        }
        if let Some(scope) = self.config.scope.as_deref() {
            params.push(("scope", scope));
        }

        let url = url::Url::parse_with_params(&self.config.auth_url, &params)
            .map_err(|e| Error::Config(format!("invalid authUrl: {}", e)))?;
        Ok(url.to_string())
    }

    /// Exchange an authorization code and store the resulting tokens
    pub async fn connect_user(&self, code: &str) -> Result<()> {
        tracing::info!("[googlemeet] Getting access token from oauth");
        let (client_id, client_secret) = self.client_credentials()?;
        let redirect_uri = self.config.oauth_callback.as_deref().unwrap_or_default();

        let tokens = self
            .request_tokens(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        self.store
            .set(&self.config.access_token_key(), &tokens.access_token)?;
        match tokens.refresh_token {
            Some(refresh) => self.store.set(&self.config.refresh_token_key(), &refresh)?,
            None => tracing::warn!("[googlemeet] No refresh token in authorization response"),
        }

        self.publish(PlatformEventType::UserConnected);
        Ok(())
    }

    /// Remove the user's tokens from the store
    pub async fn disconnect_user(&self) -> Result<()> {
        tracing::info!("[googlemeet] Removing access token from oauth");
        self.store.remove(&self.config.access_token_key())?;
        self.store.remove(&self.config.refresh_token_key())?;
        self.publish(PlatformEventType::UserDisconnected);
        Ok(())
    }

    async fn request_tokens(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let resp = self
            .client
            .post(&self.config.access_token_url)
            .form(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error = resp.text().await.unwrap_or_default();
            return Err(Error::OAuth(format!("token request failed: {} - {}", status, error)));
        }

        resp.json()
            .await
            .map_err(|e| Error::OAuth(format!("failed to parse token response: {}", e)))
    }

    fn publish(&self, event_type: PlatformEventType) {
        if let Some(events) = &self.events {
            events.trigger_event(event_type, json!({ "id": self.config.id }));
        }
    }
}

#[async_trait]
impl Authenticator for GoogleOAuth {
    async fn access_token(&self) -> Result<Option<String>> {
        self.store.get(&self.config.access_token_key())
    }

    async fn refresh_token(&self) -> Result<()> {
        let rejected = self.store.get(&self.config.access_token_key())?;
        let _guard = self.refresh_lock.lock().await;
        if self.store.get(&self.config.access_token_key())? != rejected {
            tracing::debug!("[googlemeet] Access token already refreshed by another request");
            return Ok(());
        }
        tracing::info!("[googlemeet] Refreshing access token");

        let refresh = self
            .store
            .get(&self.config.refresh_token_key())?
            .ok_or_else(|| Error::OAuth("no refresh token stored, run login first".to_string()))?;
        let (client_id, client_secret) = self.client_credentials()?;

        let tokens = self
            .request_tokens(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .await?;

        self.store
            .set(&self.config.access_token_key(), &tokens.access_token)?;
        if let Some(rotated) = tokens.refresh_token {
            self.store.set(&self.config.refresh_token_key(), &rotated)?;
        }

        self.publish(PlatformEventType::TokenRefreshed);
        Ok(())
    }
}
