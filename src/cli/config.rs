use anyhow::{Context as _, Result};
use serde_json::Value;

use super::{Context, OutputFormat, SuccessResponse};
use crate::models::Configuration;
use crate::utils::get_configuration;

/// Keys whose values are masked in human output
const SECRET_KEYS: &[&str] = &["clientSecret", "webhookSecret", "accessToken"];

fn redact(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        for key in SECRET_KEYS {
            if let Some(v) = map.get_mut(*key) {
                *v = Value::String("********".to_string());
            }
        }
        if let Some(oauth) = map.get_mut("oauth") {
            *oauth = redact(oauth.take());
        }
    }
    value
}

/// Configuration or one of its properties, with secrets masked
fn shown_value(config: &Configuration, property: Option<&str>) -> Result<Value> {
    let value = match property {
        None => {
            let raw = get_configuration(config, None);
            let whole: Value = serde_json::from_str(raw.as_str().unwrap_or("{}"))?;
            redact(whole)
        }
        Some(property) => match get_configuration(config, Some(property)) {
            Value::Null => Value::Null,
            _ if SECRET_KEYS.contains(&property) => Value::String("********".to_string()),
            value => redact(value),
        },
    };
    Ok(value)
}

/// Show the whole configuration or a single property
pub fn run_config_show(ctx: &Context, property: Option<&str>, format: OutputFormat) -> Result<()> {
    format.print_json(&shown_value(&ctx.config, property)?);
    Ok(())
}

/// Show the oauth block produced by the configuration builder
pub fn run_config_oauth(ctx: &Context, format: OutputFormat) -> Result<()> {
    let oauth = ctx
        .config
        .oauth
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("authenticationMethod is not oAuth2"))?;
    format.print_json(&redact(serde_json::to_value(oauth)?));
    Ok(())
}

/// Set one configuration key in the configuration file
pub fn run_config_set(ctx: &Context, key: &str, value: &str, format: OutputFormat) -> Result<()> {
    let mut raw = if ctx.config_path.exists() {
        let content = std::fs::read_to_string(&ctx.config_path)?;
        serde_json::from_str(&content).context("Configuration file is not valid JSON")?
    } else {
        serde_json::Map::new()
    };
    raw.insert(key.to_string(), Value::String(value.to_string()));

    let config: Configuration = serde_json::from_value(Value::Object(raw))
        .with_context(|| format!("Invalid value for {}", key))?;
    if config.get(key).is_none() {
        anyhow::bail!("Unknown configuration key '{}'", key);
    }
    config.save(&ctx.config_path)?;

    format.print(&SuccessResponse {
        message: format!("{} updated in {}", key, ctx.config_path.display()),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::FileTokenStore;
    use crate::webhook::EventBus;
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;

    fn context(dir: &Path) -> Context {
        Context {
            config_path: dir.join("config.json"),
            config: Configuration::default(),
            store: Arc::new(FileTokenStore::new(dir.join("tokens.json"))),
            events: EventBus::new(),
        }
    }

    #[test]
    fn test_redact() {
        let value = redact(json!({
            "clientId": "id",
            "clientSecret": "s",
            "oauth": {"clientId": "id", "clientSecret": "s"}
        }));

        assert_eq!(value["clientId"], "id");
        assert_eq!(value["clientSecret"], "********");
        assert_eq!(value["oauth"]["clientSecret"], "********");
    }

    #[test]
    fn test_single_secret_property_is_masked() {
        let config = crate::oauth::build_configuration(Configuration {
            client_id: Some("id".to_string()),
            client_secret: Some("s".to_string()),
            ..Default::default()
        });

        assert_eq!(shown_value(&config, Some("clientSecret")).unwrap(), json!("********"));
        assert_eq!(shown_value(&config, Some("clientId")).unwrap(), json!("id"));
        assert_eq!(shown_value(&config, Some("webhookSecret")).unwrap(), Value::Null);

        let oauth = shown_value(&config, Some("oauth")).unwrap();
        assert_eq!(oauth["clientSecret"], "********");
        assert_eq!(oauth["clientId"], "id");
    }

    #[test]
    fn test_config_set_writes_known_key() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        run_config_set(&ctx, "clientId", "abc", OutputFormat::Json).unwrap();

        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(&ctx.config_path).unwrap()).unwrap();
        assert_eq!(saved["clientId"], "abc");
    }

    #[test]
    fn test_config_set_rejects_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        let err = run_config_set(&ctx, "client_id", "abc", OutputFormat::Json).unwrap_err();
        assert!(err.to_string().contains("client_id"));
        assert!(!ctx.config_path.exists());
    }
}
