use anyhow::{Context as _, Result};
use serde_json::{Map, Value};

use super::{Context, OutputFormat, SuccessResponse};
use crate::client::{AccessType, HttpMethod, PageRequest, Space, SpaceConfig};

/// Parse `key=value` query arguments
pub fn parse_query_args(args: &[String]) -> Result<Map<String, Value>> {
    args.iter()
        .map(|arg| {
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Invalid query parameter '{}', use key=value", arg))?;
            Ok((key.to_string(), Value::String(value.to_string())))
        })
        .collect()
}

/// Body argument as JSON, or as a raw string when it is not JSON
pub fn parse_body_arg(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Send an arbitrary request through the authorized client
pub async fn run_request(
    ctx: &Context,
    method: &str,
    path: &str,
    body: Option<&str>,
    query: &[String],
    format: OutputFormat,
) -> Result<()> {
    let method = HttpMethod::parse(method)
        .ok_or_else(|| anyhow::anyhow!("Unsupported method '{}'", method))?;

    let params = parse_query_args(query)?;
    let mut options = Map::new();
    if !params.is_empty() {
        options.insert("params".to_string(), Value::Object(params));
    }
    if let Some(body) = body {
        options.insert("body".to_string(), parse_body_arg(body));
    }
    let options = (!options.is_empty()).then_some(Value::Object(options));

    let client = ctx.client()?;
    let response = client
        .request(method, Some(path), options)
        .await
        .with_context(|| format!("{} {} failed", method, path))?;

    format.print_json(&response);
    Ok(())
}

/// Create a meeting space
pub async fn run_space_create(
    ctx: &Context,
    access_type: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let access_type = access_type
        .map(|a| {
            serde_json::from_value::<AccessType>(Value::String(a.to_ascii_uppercase()))
                .map_err(|_| anyhow::anyhow!("Invalid access type. Use: open, trusted, or restricted"))
        })
        .transpose()?;

    let space = Space {
        config: access_type.map(|access_type| SpaceConfig {
            access_type: Some(access_type),
            entry_point_access: None,
        }),
        ..Default::default()
    };

    let created = ctx
        .client()?
        .create_space(&space)
        .await
        .context("Failed to create space")?;
    format.print_json(&created);
    Ok(())
}

pub async fn run_space_get(ctx: &Context, name: &str, format: OutputFormat) -> Result<()> {
    let space = ctx
        .client()?
        .get_space(name)
        .await
        .context("Failed to get space")?;
    format.print_json(&space);
    Ok(())
}

pub async fn run_space_end(ctx: &Context, name: &str, format: OutputFormat) -> Result<()> {
    ctx.client()?
        .end_active_conference(name)
        .await
        .context("Failed to end conference")?;
    format.print(&SuccessResponse {
        message: format!("Active conference in {} ended", name),
    });
    Ok(())
}

/// List conference records
pub async fn run_records_list(
    ctx: &Context,
    filter: Option<&str>,
    page: PageRequest,
    format: OutputFormat,
) -> Result<()> {
    let records = ctx
        .client()?
        .list_conference_records(filter, &page)
        .await
        .context("Failed to list conference records")?;
    format.print_json(&records);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query_args() {
        let params =
            parse_query_args(&["pageSize=10".to_string(), "filter=a=b".to_string()]).unwrap();
        assert_eq!(params["pageSize"], json!("10"));
        assert_eq!(params["filter"], json!("a=b"));

        assert!(parse_query_args(&["nokey".to_string()]).is_err());
    }

    #[test]
    fn test_parse_body_arg() {
        assert_eq!(parse_body_arg(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_body_arg("raw text"), json!("raw text"));
    }
}
