use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::oauth::OAuthConfig;

/// How the adapter obtains the bearer token it sends to Google
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthenticationMethod {
    /// Google OAuth2 with refresh tokens kept in a token store
    #[default]
    #[serde(rename = "oAuth2", alias = "oauth", alias = "oauth2")]
    OAuth2,
    /// A token provisioned out of band (e.g. by another service)
    #[serde(rename = "accessToken")]
    AccessToken,
}

impl AuthenticationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticationMethod::OAuth2 => "oAuth2",
            AuthenticationMethod::AccessToken => "accessToken",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "oAuth2" | "oauth" | "oauth2" => Some(AuthenticationMethod::OAuth2),
            "accessToken" => Some(AuthenticationMethod::AccessToken),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuthenticationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_api_base_url() -> String {
    crate::DEFAULT_API_BASE_URL.to_string()
}

fn default_user_id() -> String {
    "default".to_string()
}

/// Package configuration, built once and read throughout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default)]
    pub authentication_method: AuthenticationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Space separated OAuth scopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_scopes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_callback: Option<String>,
    #[serde(rename = "GOOGLE_MEET_API_BASE_URL", default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
    /// Id of the user record the tokens belong to
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Filled in by the configuration builder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthConfig>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            authentication_method: AuthenticationMethod::default(),
            client_id: None,
            client_secret: None,
            auth_scopes: None,
            oauth_callback: None,
            api_base_url: default_api_base_url(),
            webhook_secret: None,
            user_id: default_user_id(),
            access_token: None,
            oauth: None,
        }
    }
}

impl Configuration {
    pub fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".config")
            .join(crate::APP_NAME)
            .join("config.json")
    }

    /// Read the configuration file (defaults when absent) and apply env overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("GOOGLE_CLIENT_ID") {
            self.client_id = Some(v);
        }
        if let Ok(v) = std::env::var("GOOGLE_CLIENT_SECRET") {
            self.client_secret = Some(v);
        }
        if let Ok(v) = std::env::var("GOOGLE_MEET_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Ok(v) = std::env::var("GOOGLE_MEET_WEBHOOK_SECRET") {
            self.webhook_secret = Some(v);
        }
        if let Ok(v) = std::env::var("GOOGLE_MEET_ACCESS_TOKEN") {
            self.access_token = Some(v);
        }
    }

    /// Whole configuration as a JSON object
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Look up a single property by its configuration key
    pub fn get(&self, property: &str) -> Option<Value> {
        match self.to_json() {
            Value::Object(mut map) => map.remove(property),
            _ => None,
        }
    }

    /// Webhook secret, treating an empty string as unset
    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_platform_keys() {
        let config: Configuration = serde_json::from_str(
            r#"{
                "authenticationMethod": "oauth",
                "clientId": "id-123",
                "clientSecret": "secret",
                "authScopes": "https://www.googleapis.com/auth/meetings.space.created",
                "oauthCallback": "http://localhost:8085/callback",
                "GOOGLE_MEET_API_BASE_URL": "https://meet.example.test/v2",
                "webhookSecret": "shh"
            }"#,
        )
        .unwrap();

        assert_eq!(config.authentication_method, AuthenticationMethod::OAuth2);
        assert_eq!(config.client_id.as_deref(), Some("id-123"));
        assert_eq!(config.api_base_url, "https://meet.example.test/v2");
        assert_eq!(config.user_id, "default");
        assert_eq!(config.webhook_secret(), Some("shh"));
    }

    #[test]
    fn test_get_property() {
        let config = Configuration {
            client_id: Some("abc".to_string()),
            ..Default::default()
        };

        assert_eq!(config.get("clientId"), Some(Value::String("abc".to_string())));
        assert_eq!(
            config.get("GOOGLE_MEET_API_BASE_URL"),
            Some(Value::String(crate::DEFAULT_API_BASE_URL.to_string()))
        );
        assert_eq!(config.get("clientSecret"), None);
        assert_eq!(config.get("nope"), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Configuration {
            authentication_method: AuthenticationMethod::AccessToken,
            user_id: "user-42".to_string(),
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = Configuration::load(&path).unwrap();
        assert_eq!(loaded.authentication_method, AuthenticationMethod::AccessToken);
        assert_eq!(loaded.user_id, "user-42");
    }

    #[test]
    fn test_empty_webhook_secret_is_unset() {
        let config = Configuration {
            webhook_secret: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.webhook_secret(), None);
    }

    #[test]
    fn test_authentication_method_parse() {
        assert_eq!(AuthenticationMethod::parse("oAuth2"), Some(AuthenticationMethod::OAuth2));
        assert_eq!(AuthenticationMethod::parse("oauth"), Some(AuthenticationMethod::OAuth2));
        assert_eq!(
            AuthenticationMethod::parse("accessToken"),
            Some(AuthenticationMethod::AccessToken)
        );
        assert_eq!(AuthenticationMethod::parse("basic"), None);
    }
}
