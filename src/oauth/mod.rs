mod builder;
mod google;
mod store;

pub use builder::*;
pub use google::*;
pub use store::*;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::models::{AuthenticationMethod, Configuration};
use crate::webhook::EventBus;

/// Source of bearer tokens for outgoing requests
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Current access token, if the user is connected
    async fn access_token(&self) -> Result<Option<String>>;

    /// Obtain a fresh access token after the API rejected the current one
    async fn refresh_token(&self) -> Result<()>;
}

/// Token provisioned out of band.
///
/// A refresh re-reads `accessToken` from the configuration file.
pub struct StaticToken {
    token: RwLock<Option<String>>,
    source: PathBuf,
}

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
            source: Configuration::config_path(),
        }
    }

    /// Configuration file consulted on refresh
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = path.into();
        self
    }
}

#[async_trait]
impl Authenticator for StaticToken {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn refresh_token(&self) -> Result<()> {
        let reloaded = Configuration::load(&self.source)?
            .access_token
            .filter(|t| !t.is_empty());

        let mut current = self.token.write().await;
        match reloaded {
            Some(token) if current.as_deref() != Some(token.as_str()) => {
                tracing::info!(
                    "[googlemeet] Picked up a new access token from {}",
                    self.source.display()
                );
                *current = Some(token);
                Ok(())
            }
            _ => Err(Error::OAuth(format!(
                "access token was rejected and {} holds no replacement",
                self.source.display()
            ))),
        }
    }
}

/// Pick the authenticator matching the configured authentication method
pub fn authenticator_for(
    config: &Configuration,
    config_path: &Path,
    store: Arc<dyn TokenStore>,
    events: Option<EventBus>,
) -> Result<Arc<dyn Authenticator>> {
    match config.authentication_method {
        AuthenticationMethod::OAuth2 => {
            let mut oauth = GoogleOAuth::from_configuration(config, store)?;
            if let Some(events) = events {
                oauth = oauth.with_events(events);
            }
            Ok(Arc::new(oauth))
        }
        AuthenticationMethod::AccessToken => {
            let token = StaticToken::new(config.access_token.clone()).with_source(config_path);
            Ok(Arc::new(token))
        }
    }
}
