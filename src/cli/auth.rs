use anyhow::{Context as _, Result};
use serde::Serialize;
use std::collections::HashMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{Context, OutputFormat, SuccessResponse};
use crate::crypto::generate_state;
use crate::oauth::GoogleOAuth;

/// Redirect URI used when `oauthCallback` is not configured
pub const DEFAULT_OAUTH_CALLBACK: &str = "http://localhost:8085/callback";

/// Response from login command
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub installation_id: String,
}

impl std::fmt::Display for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Connected to Google Meet")?;
        writeln!(f, "Installation: {}", self.installation_id)
    }
}

/// Run the OAuth consent flow and store the resulting tokens
pub async fn run_login(ctx: &Context, format: OutputFormat) -> Result<()> {
    let mut oauth_config = ctx.oauth()?.config().clone();
    let callback = oauth_config
        .oauth_callback
        .get_or_insert_with(|| DEFAULT_OAUTH_CALLBACK.to_string())
        .clone();
    let oauth = GoogleOAuth::new(oauth_config, ctx.store.clone()).with_events(ctx.events.clone());

    let callback_url = url::Url::parse(&callback).context("Invalid oauthCallback URL")?;
    let port = callback_url.port_or_known_default().unwrap_or(80);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("Failed to bind to port {}", port))?;

    let state = generate_state();
    let auth_url = oauth.authorization_url(&state)?;

    println!("Opening browser for Google sign-in...");
    if open::that(&auth_url).is_err() {
        println!("Please open this URL in your browser:\n{}", auth_url);
    }

    let code = tokio::time::timeout(
        std::time::Duration::from_secs(300),
        receive_code(listener, &state),
    )
    .await
    .context("Authentication timed out")??;

    oauth
        .connect_user(&code)
        .await
        .context("Failed to exchange authorization code")?;

    format.print(&LoginResponse {
        installation_id: oauth.config().id.clone(),
    });
    Ok(())
}

/// Accept the browser redirect and answer it
async fn receive_code(listener: tokio::net::TcpListener, state: &str) -> Result<String> {
    let (mut socket, _) = listener
        .accept()
        .await
        .context("Failed to accept connection")?;

    let mut buffer = [0u8; 4096];
    let n = socket.read(&mut buffer).await?;
    let request = String::from_utf8_lossy(&buffer[..n]);
    let result = parse_callback_request(&request, state);

    let (status, message) = match &result {
        Ok(_) => ("200 OK", "You can close this window and return to the terminal."),
        Err(_) => ("400 Bad Request", "Login failed. Please close this window and try again."),
    };
    let body = format!("<html><body><h1>googlemeet</h1><p>{}</p></body></html>", message);
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.flush().await;

    result
}

/// Extract the authorization code from the raw callback request
fn parse_callback_request(request: &str, expected_state: &str) -> Result<String> {
    let first_line = request.lines().next().unwrap_or("");
    let path = first_line.split_whitespace().nth(1).unwrap_or("/");
    let query = path.split('?').nth(1).unwrap_or("");
    let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    if let Some(error) = params.get("error") {
        anyhow::bail!("{}", error);
    }
    if params.get("state").map(String::as_str) != Some(expected_state) {
        anyhow::bail!("State mismatch in OAuth callback");
    }

    params
        .get("code")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No authorization code in callback"))
}

/// Remove stored tokens
pub async fn run_logout(ctx: &Context, format: OutputFormat) -> Result<()> {
    ctx.oauth()?.disconnect_user().await?;

    format.print(&SuccessResponse {
        message: "Logged out successfully".to_string(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_callback_request() {
        let request = "GET /callback?state=s1&code=4%2F0Ab HTTP/1.1\r\nHost: localhost\r\n\r\n";
        assert_eq!(parse_callback_request(request, "s1").unwrap(), "4/0Ab");
    }

    #[test]
    fn test_parse_callback_request_rejects_bad_state() {
        let request = "GET /callback?state=other&code=abc HTTP/1.1\r\n\r\n";
        assert!(parse_callback_request(request, "s1").is_err());
    }

    #[test]
    fn test_parse_callback_request_error() {
        let request = "GET /callback?error=access_denied HTTP/1.1\r\n\r\n";
        let err = parse_callback_request(request, "s1").unwrap_err();
        assert_eq!(err.to_string(), "access_denied");
    }
}
