mod meet;

pub use meet::*;

use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::{Authorization, Configuration, RequestOptions};
use crate::oauth::Authenticator;
use crate::utils::merge_json;

/// HTTP verbs exposed by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "HEAD" => Some(HttpMethod::Head),
            "OPTIONS" => Some(HttpMethod::Options),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// Google Meet API client.
///
/// Every request gets the API base URL, a JSON content type and the bearer
/// token injected. A 401 triggers one token refresh and exactly one retry.
#[derive(Clone)]
pub struct MeetClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<dyn Authenticator>,
}

impl MeetClient {
    pub fn new(config: &Configuration, auth: Arc<dyn Authenticator>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            auth,
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, options: Option<Value>) -> Result<Value> {
        self.request(HttpMethod::Get, Some(path), options).await
    }

    pub async fn post(&self, path: &str, options: Option<Value>) -> Result<Value> {
        self.request(HttpMethod::Post, Some(path), options).await
    }

    pub async fn put(&self, path: &str, options: Option<Value>) -> Result<Value> {
        self.request(HttpMethod::Put, Some(path), options).await
    }

    pub async fn patch(&self, path: &str, options: Option<Value>) -> Result<Value> {
        self.request(HttpMethod::Patch, Some(path), options).await
    }

    pub async fn delete(&self, path: &str, options: Option<Value>) -> Result<Value> {
        self.request(HttpMethod::Delete, Some(path), options).await
    }

    pub async fn head(&self, path: &str, options: Option<Value>) -> Result<Value> {
        self.request(HttpMethod::Head, Some(path), options).await
    }

    pub async fn options(&self, path: &str, options: Option<Value>) -> Result<Value> {
        self.request(HttpMethod::Options, Some(path), options).await
    }

    /// Normalize `path`/`options` and send the request
    pub async fn request(
        &self,
        method: HttpMethod,
        path: Option<&str>,
        options: Option<Value>,
    ) -> Result<Value> {
        let options = RequestOptions::normalize(path, options)?;
        self.send(method, options).await
    }

    /// Shape and send fully formed options, retrying once after a 401
    pub async fn send(&self, method: HttpMethod, options: RequestOptions) -> Result<Value> {
        let options = self.shape(options).await?;

        match self.dispatch(method, &options).await {
            Err(err) if err.is_unauthorized() => {
                tracing::info!("[googlemeet] Handling request {}", err);
                self.auth.refresh_token().await?;
                let options = self.set_authorization(options).await?;
                self.dispatch(method, &options).await
            }
            other => other,
        }
    }

    async fn shape(&self, options: RequestOptions) -> Result<RequestOptions> {
        let options = self.set_api_uri(options);
        let options = set_request_headers(options);
        self.set_authorization(options).await
    }

    fn set_api_uri(&self, mut options: RequestOptions) -> RequestOptions {
        let path = options.path.as_deref().unwrap_or_default();
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("[googlemeet] Set url: {} -> {}", path, url);
        options.url = Some(url);
        options
    }

    async fn set_authorization(&self, mut options: RequestOptions) -> Result<RequestOptions> {
        tracing::debug!("[googlemeet] setting authorization");
        let token = self.auth.access_token().await?;
        options.authorization = Some(Authorization::oauth2(token));
        Ok(options)
    }

    async fn dispatch(&self, method: HttpMethod, options: &RequestOptions) -> Result<Value> {
        let url = options
            .url
            .as_deref()
            .ok_or_else(|| Error::Config("request url is not set".to_string()))?;

        let mut req = self.http.request(method.into(), url);

        let query = options.query_pairs();
        if !query.is_empty() {
            req = req.query(&query);
        }
        for (name, value) in options.header_pairs() {
            req = req.header(name, value);
        }
        if let Some(value) = options
            .authorization
            .as_ref()
            .and_then(Authorization::header_value)
        {
            req = req.header(AUTHORIZATION, value);
        }
        match &options.body {
            None | Some(Value::Null) => {}
            Some(Value::String(raw)) => req = req.body(raw.clone()),
            Some(body) => req = req.body(serde_json::to_vec(body)?),
        }

        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let body = parse_body(&bytes);

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// Force a JSON content type, replacing whatever the caller set
fn set_request_headers(mut options: RequestOptions) -> RequestOptions {
    options
        .headers
        .retain(|name, _| !name.eq_ignore_ascii_case("content-type"));
    let merged = merge_json(
        &Value::Object(std::mem::take(&mut options.headers)),
        &json!({ "Content-Type": "application/json" }),
    );
    if let Value::Object(headers) = merged {
        options.headers = headers;
    }
    options
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
