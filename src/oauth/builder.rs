use serde::{Deserialize, Serialize};

use crate::models::{AuthenticationMethod, Configuration};

/// OAuth block consumed by the authenticator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthConfig {
    /// Installation id, also the prefix of the token storage keys
    pub id: String,
    pub auth_url: String,
    pub access_token_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_callback: Option<String>,
}

impl OAuthConfig {
    pub fn access_token_key(&self) -> String {
        access_token_key(&self.id)
    }

    pub fn refresh_token_key(&self) -> String {
        refresh_token_key(&self.id)
    }
}

/// Installation id for the given user record
pub fn installation_id(user_id: &str) -> String {
    format!("installationInfo-{}-User-{}", crate::APP_NAME, user_id)
}

pub fn access_token_key(installation_id: &str) -> String {
    format!("{} - access_token", installation_id)
}

pub fn refresh_token_key(installation_id: &str) -> String {
    format!("{} - refresh_token", installation_id)
}

/// Attach the oauth block to the configuration when OAuth2 is selected
pub fn build_configuration(mut config: Configuration) -> Configuration {
    if config.authentication_method == AuthenticationMethod::OAuth2 {
        config.oauth = Some(OAuthConfig {
            id: installation_id(&config.user_id),
            auth_url: crate::GOOGLE_AUTH_URL.to_string(),
            access_token_url: crate::GOOGLE_TOKEN_URL.to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.auth_scopes.clone(),
            oauth_callback: config.oauth_callback.clone(),
        });
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_oauth_block() {
        let config = Configuration {
            client_id: Some("client".to_string()),
            client_secret: Some("secret".to_string()),
            auth_scopes: Some("scope-a scope-b".to_string()),
            oauth_callback: Some("http://localhost:8085/callback".to_string()),
            user_id: "u1".to_string(),
            ..Default::default()
        };

        let built = build_configuration(config);
        let oauth = serde_json::to_value(built.oauth.unwrap()).unwrap();

        assert_eq!(
            oauth,
            json!({
                "id": "installationInfo-googlemeet-User-u1",
                "authUrl": "https://accounts.google.com/o/oauth2/auth",
                "accessTokenUrl": "https://oauth2.googleapis.com/token",
                "clientId": "client",
                "clientSecret": "secret",
                "scope": "scope-a scope-b",
                "oauthCallback": "http://localhost:8085/callback"
            })
        );
    }

    #[test]
    fn test_access_token_method_has_no_oauth_block() {
        let config = Configuration {
            authentication_method: AuthenticationMethod::AccessToken,
            ..Default::default()
        };
        assert!(build_configuration(config).oauth.is_none());
    }

    #[test]
    fn test_storage_keys() {
        let id = installation_id("42");
        assert_eq!(access_token_key(&id), "installationInfo-googlemeet-User-42 - access_token");
        assert_eq!(refresh_token_key(&id), "installationInfo-googlemeet-User-42 - refresh_token");
    }
}
