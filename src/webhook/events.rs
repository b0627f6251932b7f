use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Internal events published by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEventType {
    /// Google Meet webhook received
    Webhook,
    /// A user finished the OAuth flow
    UserConnected,
    /// A user's tokens were removed
    UserDisconnected,
    /// An access token was refreshed
    TokenRefreshed,
}

impl PlatformEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformEventType::Webhook => "googlemeet:webhook",
            PlatformEventType::UserConnected => "googlemeet:userConnected",
            PlatformEventType::UserDisconnected => "googlemeet:disconnectUser",
            PlatformEventType::TokenRefreshed => "googlemeet:refreshToken",
        }
    }
}

impl std::fmt::Display for PlatformEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event envelope handed to subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    pub id: String,
    /// Event name, e.g. `googlemeet:webhook`
    pub event: String,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl PlatformEvent {
    pub fn new(event_type: PlatformEventType, data: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event: event_type.as_str().to_string(),
            timestamp: Utc::now(),
            data,
        }
    }
}

/// Inbound webhook payload, forwarded verbatim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Parsed JSON body, or the raw text when it is not JSON
    pub body: Value,
    /// Query string parameters
    pub params: Map<String, Value>,
}

impl WebhookEvent {
    pub fn from_raw(body: &[u8], params: impl IntoIterator<Item = (String, String)>) -> Self {
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
        };

        Self {
            body,
            params: params
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        }
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_webhook_event_json_body() {
        let event = WebhookEvent::from_raw(
            br#"{"message":{"data":"eyJ9"}}"#,
            vec![("token".to_string(), "abc".to_string())],
        );

        assert_eq!(event.body, json!({"message": {"data": "eyJ9"}}));
        assert_eq!(
            event.into_value(),
            json!({"body": {"message": {"data": "eyJ9"}}, "params": {"token": "abc"}})
        );
    }

    #[test]
    fn test_webhook_event_text_body() {
        let event = WebhookEvent::from_raw(b"plain text", Vec::new());
        assert_eq!(event.body, json!("plain text"));

        let empty = WebhookEvent::from_raw(b"", Vec::new());
        assert_eq!(empty.body, Value::Null);
    }

    #[test]
    fn test_event_names() {
        let event = PlatformEvent::new(PlatformEventType::Webhook, json!({}));
        assert_eq!(event.event, "googlemeet:webhook");
        assert_eq!(
            PlatformEventType::UserConnected.to_string(),
            "googlemeet:userConnected"
        );
        assert_eq!(
            PlatformEventType::UserDisconnected.to_string(),
            "googlemeet:disconnectUser"
        );
    }
}
