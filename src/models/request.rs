use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Authorization block attached to every outgoing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    #[serde(rename = "type")]
    pub auth_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub header_prefix: String,
}

impl Authorization {
    pub fn oauth2(access_token: Option<String>) -> Self {
        Self {
            auth_type: "oauth2".to_string(),
            access_token,
            header_prefix: "Bearer".to_string(),
        }
    }

    /// Value for the `Authorization` header, if a token is present
    pub fn header_value(&self) -> Option<String> {
        self.access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("{} {}", self.header_prefix, t))
    }
}

/// Per-call request options, discarded once the response is returned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Query parameters
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub headers: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<Authorization>,
    /// Absolute URL, computed from the base URL and `path`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RequestOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), Value::String(value.into()));
        self
    }

    /// Build options from a path and either http-package options or a bare body.
    ///
    /// Options that already carry `path`, `params` or `body` are kept and only
    /// get their path replaced. Anything else is taken as the request body.
    pub fn normalize(path: Option<&str>, options: Option<Value>) -> Result<Self> {
        let path = path.filter(|p| !p.is_empty());
        let options = options.filter(|o| !o.is_null());

        let Some(path) = path else {
            return match options {
                None => Ok(Self::default()),
                Some(value @ Value::Object(_)) => Self::from_value(value),
                Some(body) => Ok(Self {
                    body: Some(body),
                    ..Default::default()
                }),
            };
        };

        match options {
            Some(Value::Object(map)) if is_http_options(&map) => {
                let mut options = Self::from_value(Value::Object(map))?;
                options.path = Some(path.to_string());
                Ok(options)
            }
            body => Ok(Self {
                path: Some(path.to_string()),
                body,
                ..Default::default()
            }),
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::Config(format!("invalid request options: {}", e)))
    }

    /// Query parameters rendered as string pairs
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect()
    }

    /// Headers rendered as string pairs
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect()
    }
}

fn is_http_options(map: &Map<String, Value>) -> bool {
    ["path", "params", "body"]
        .iter()
        .any(|key| map.get(*key).is_some_and(is_truthy))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
