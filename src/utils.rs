use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::Configuration;

/// A date given either as epoch milliseconds or as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Millis(i64),
    Text(String),
}

impl From<i64> for DateInput {
    fn from(ms: i64) -> Self {
        DateInput::Millis(ms)
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

/// Epoch milliseconds wrapper, serialized as `{"timestamp": ...}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub timestamp: i64,
}

/// Convert a date to epoch milliseconds; empty input and `0` yield `None`
pub fn from_date_to_timestamp(input: impl Into<DateInput>) -> Option<Timestamp> {
    let timestamp = match input.into() {
        DateInput::Millis(0) => return None,
        DateInput::Millis(ms) => ms,
        DateInput::Text(text) => parse_date(text.trim())?.timestamp_millis(),
    };
    Some(Timestamp { timestamp })
}

/// Convert epoch milliseconds to a UTC date
pub fn from_timestamp_to_date(timestamp: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(timestamp).single()
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Whole configuration as a JSON string, or a single property value
pub fn get_configuration(config: &Configuration, property: Option<&str>) -> Value {
    match property.filter(|p| !p.is_empty()) {
        None => {
            tracing::debug!("[googlemeet] Get configuration");
            Value::String(config.to_json().to_string())
        }
        Some(property) => {
            tracing::debug!("[googlemeet] Get property: {}", property);
            config.get(property).unwrap_or(Value::Null)
        }
    }
}

/// Append `key=value` to a path without encoding either part
pub fn concat_query(path: &str, key: &str, value: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", path, separator, key, value)
}

/// Shallow merge of two JSON objects; keys of `b` win. Non-objects count as empty.
pub fn merge_json(a: &Value, b: &Value) -> Value {
    let mut merged = Map::new();
    for source in [a, b] {
        if let Value::Object(map) = source {
            for (key, value) in map {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_date_to_timestamp() {
        assert_eq!(
            from_date_to_timestamp("2024-03-01T10:00:00Z"),
            Some(Timestamp {
                timestamp: 1_709_287_200_000
            })
        );
        assert_eq!(
            from_date_to_timestamp("2024-03-01T12:00:00+02:00"),
            Some(Timestamp {
                timestamp: 1_709_287_200_000
            })
        );
        assert_eq!(
            from_date_to_timestamp("2024-03-01"),
            Some(Timestamp {
                timestamp: 1_709_251_200_000
            })
        );
        assert_eq!(
            from_date_to_timestamp(1_709_287_200_000_i64),
            Some(Timestamp {
                timestamp: 1_709_287_200_000
            })
        );
    }

    #[test]
    fn test_from_date_to_timestamp_falsy_and_invalid() {
        assert_eq!(from_date_to_timestamp(""), None);
        assert_eq!(from_date_to_timestamp(0_i64), None);
        assert_eq!(from_date_to_timestamp("not a date"), None);
    }

    #[test]
    fn test_timestamp_serializes_as_object() {
        let ts = from_date_to_timestamp(42_i64).unwrap();
        assert_eq!(serde_json::to_value(ts).unwrap(), json!({"timestamp": 42}));
    }

    #[test]
    fn test_from_timestamp_to_date() {
        let date = from_timestamp_to_date(1_709_287_200_000).unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_concat_query() {
        assert_eq!(concat_query("/spaces", "pageSize", "10"), "/spaces?pageSize=10");
        assert_eq!(
            concat_query("/spaces?pageSize=10", "pageToken", "a b"),
            "/spaces?pageSize=10&pageToken=a b"
        );
        assert_eq!(concat_query("", "k", "v"), "?k=v");
    }

    #[test]
    fn test_merge_json() {
        let merged = merge_json(
            &json!({"a": 1, "b": {"x": 1}}),
            &json!({"b": {"y": 2}, "c": 3}),
        );
        assert_eq!(merged, json!({"a": 1, "b": {"y": 2}, "c": 3}));

        assert_eq!(merge_json(&Value::Null, &json!({"a": 1})), json!({"a": 1}));
        assert_eq!(merge_json(&json!([1, 2]), &json!("x")), json!({}));
    }

    #[test]
    fn test_get_configuration() {
        let config = Configuration {
            client_id: Some("cid".to_string()),
            ..Default::default()
        };

        assert_eq!(get_configuration(&config, Some("clientId")), json!("cid"));
        assert_eq!(get_configuration(&config, Some("missing")), Value::Null);

        let whole = get_configuration(&config, None);
        let parsed: Value = serde_json::from_str(whole.as_str().unwrap()).unwrap();
        assert_eq!(parsed["clientId"], json!("cid"));
    }
}
