mod auth;
mod config;
mod request;

pub use auth::*;
pub use config::*;
pub use request::*;

use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::MeetClient;
use crate::models::Configuration;
use crate::oauth::{authenticator_for, build_configuration, FileTokenStore, GoogleOAuth};
use crate::webhook::EventBus;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn print<T: Serialize + std::fmt::Display>(&self, value: &T) {
        match self {
            OutputFormat::Human => println!("{}", value),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
        }
    }

    pub fn print_json<T: Serialize>(&self, value: &T) {
        match self {
            OutputFormat::Human => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(value).unwrap_or_default());
            }
        }
    }
}

/// Success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

impl std::fmt::Display for SuccessResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Everything a command needs: built configuration, token store and event bus
pub struct Context {
    pub config_path: PathBuf,
    pub config: Configuration,
    pub store: Arc<FileTokenStore>,
    pub events: EventBus,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Configuration::config_path);
        let config = Configuration::load(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        Ok(Self {
            config_path,
            config: build_configuration(config),
            store: Arc::new(FileTokenStore::new(FileTokenStore::default_path())),
            events: EventBus::new(),
        })
    }

    /// API client using the configured authentication method
    pub fn client(&self) -> Result<MeetClient> {
        let auth = authenticator_for(
            &self.config,
            &self.config_path,
            self.store.clone(),
            Some(self.events.clone()),
        )?;
        Ok(MeetClient::new(&self.config, auth))
    }

    pub fn oauth(&self) -> Result<GoogleOAuth> {
        let oauth = GoogleOAuth::from_configuration(&self.config, self.store.clone())?
            .with_events(self.events.clone());
        Ok(oauth)
    }
}
