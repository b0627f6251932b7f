//! Typed helpers for the Meet REST v2 resources.
//!
//! These are thin conveniences over the generic verbs of [`MeetClient`]; they
//! go through the same shaping and retry-on-401 path.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::{HttpMethod, MeetClient};
use crate::error::Result;
use crate::models::RequestOptions;

/// Who may join a meeting space without knocking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    AccessTypeUnspecified,
    Open,
    Trusted,
    Restricted,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type: Option<AccessType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point_access: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveConference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference_record: Option<String>,
}

/// A virtual meeting place, e.g. `spaces/jQCFfuBOdN5z`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SpaceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_conference: Option<ActiveConference>,
}

/// A single conference held in a space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceRecord {
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub expire_time: Option<DateTime<Utc>>,
    pub space: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub earliest_start_time: Option<DateTime<Utc>>,
    pub latest_end_time: Option<DateTime<Utc>>,
    pub signedin_user: Option<Value>,
    pub anonymous_user: Option<Value>,
    pub phone_user: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub name: String,
    pub state: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub drive_destination: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub name: String,
    pub state: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub docs_destination: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConferenceRecordsResponse {
    #[serde(default)]
    pub conference_records: Vec<ConferenceRecord>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParticipantsResponse {
    #[serde(default)]
    pub participants: Vec<Participant>,
    pub next_page_token: Option<String>,
    pub total_size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecordingsResponse {
    #[serde(default)]
    pub recordings: Vec<Recording>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTranscriptsResponse {
    #[serde(default)]
    pub transcripts: Vec<Transcript>,
    pub next_page_token: Option<String>,
}

/// Pagination controls for list calls
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
}

impl PageRequest {
    fn apply(&self, mut options: RequestOptions) -> RequestOptions {
        if let Some(size) = self.page_size {
            options = options.with_param("pageSize", size);
        }
        if let Some(token) = &self.page_token {
            options = options.with_param("pageToken", token.as_str());
        }
        options
    }
}

/// Accept both `spaces/abc` and a bare id or meeting code
fn space_name(name: &str) -> String {
    if name.starts_with("spaces/") {
        name.to_string()
    } else {
        format!("spaces/{}", name)
    }
}

fn record_name(name: &str) -> String {
    if name.starts_with("conferenceRecords/") {
        name.to_string()
    } else {
        format!("conferenceRecords/{}", name)
    }
}

impl MeetClient {
    async fn call<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        options: RequestOptions,
    ) -> Result<T> {
        let body = self.send(method, options).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn create_space(&self, space: &Space) -> Result<Space> {
        let options = RequestOptions::new("/spaces").with_body(serde_json::to_value(space)?);
        self.call(HttpMethod::Post, options).await
    }

    pub async fn get_space(&self, name: &str) -> Result<Space> {
        let options = RequestOptions::new(format!("/{}", space_name(name)));
        self.call(HttpMethod::Get, options).await
    }

    pub async fn patch_space(
        &self,
        name: &str,
        space: &Space,
        update_mask: Option<&str>,
    ) -> Result<Space> {
        let mut options = RequestOptions::new(format!("/{}", space_name(name)))
            .with_body(serde_json::to_value(space)?);
        if let Some(mask) = update_mask {
            options = options.with_param("updateMask", mask);
        }
        self.call(HttpMethod::Patch, options).await
    }

    pub async fn end_active_conference(&self, name: &str) -> Result<()> {
        let options = RequestOptions::new(format!("/{}:endActiveConference", space_name(name)))
            .with_body(Value::Object(Default::default()));
        self.send(HttpMethod::Post, options).await?;
        Ok(())
    }

    pub async fn list_conference_records(
        &self,
        filter: Option<&str>,
        page: &PageRequest,
    ) -> Result<ListConferenceRecordsResponse> {
        let mut options = page.apply(RequestOptions::new("/conferenceRecords"));
        if let Some(filter) = filter {
            options = options.with_param("filter", filter);
        }
        self.call(HttpMethod::Get, options).await
    }

    pub async fn get_conference_record(&self, name: &str) -> Result<ConferenceRecord> {
        let options = RequestOptions::new(format!("/{}", record_name(name)));
        self.call(HttpMethod::Get, options).await
    }

    pub async fn list_participants(
        &self,
        record: &str,
        page: &PageRequest,
    ) -> Result<ListParticipantsResponse> {
        let options = page.apply(RequestOptions::new(format!(
            "/{}/participants",
            record_name(record)
        )));
        self.call(HttpMethod::Get, options).await
    }

    pub async fn list_recordings(
        &self,
        record: &str,
        page: &PageRequest,
    ) -> Result<ListRecordingsResponse> {
        let options = page.apply(RequestOptions::new(format!(
            "/{}/recordings",
            record_name(record)
        )));
        self.call(HttpMethod::Get, options).await
    }

    pub async fn list_transcripts(
        &self,
        record: &str,
        page: &PageRequest,
    ) -> Result<ListTranscriptsResponse> {
        let options = page.apply(RequestOptions::new(format!(
            "/{}/transcripts",
            record_name(record)
        )));
        self.call(HttpMethod::Get, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Configuration;
    use crate::oauth::StaticToken;
    use axum::{
        extract::{Path, Query},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    async fn spawn_meet_api() -> MeetClient {
        let app = Router::new()
            .route(
                "/v2/spaces",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "name": "spaces/jQCFfuBOdN5z",
                        "meetingUri": "https://meet.google.com/abc-mnop-xyz",
                        "meetingCode": "abc-mnop-xyz",
                        "config": body["config"].clone()
                    }))
                }),
            )
            .route(
                "/v2/spaces/:id",
                get(|Path(id): Path<String>| async move {
                    Json(json!({ "name": format!("spaces/{}", id) }))
                }),
            )
            .route(
                "/v2/conferenceRecords",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!({
                        "conferenceRecords": [{
                            "name": "conferenceRecords/rec-1",
                            "startTime": "2024-03-01T10:00:00.123Z",
                            "endTime": null,
                            "expireTime": "2024-04-01T10:00:00Z",
                            "space": q.get("filter").cloned()
                        }],
                        "nextPageToken": q.get("pageToken").map(|t| format!("{}-next", t))
                    }))
                }),
            )
            .route(
                "/v2/conferenceRecords/:id/participants",
                get(|Path(id): Path<String>| async move {
                    Json(json!({
                        "participants": [{ "name": format!("conferenceRecords/{}/participants/p1", id) }],
                        "totalSize": 1
                    }))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = Configuration {
            api_base_url: format!("http://{}/v2", addr),
            ..Default::default()
        };
        MeetClient::new(&config, Arc::new(StaticToken::new(Some("token".to_string()))))
    }

    #[tokio::test]
    async fn test_create_and_get_space() {
        let client = spawn_meet_api().await;

        let space = client
            .create_space(&Space {
                config: Some(SpaceConfig {
                    access_type: Some(AccessType::Trusted),
                    entry_point_access: None,
                }),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(space.meeting_code.as_deref(), Some("abc-mnop-xyz"));
        assert_eq!(
            space.config.and_then(|c| c.access_type),
            Some(AccessType::Trusted)
        );

        let fetched = client.get_space("jQCFfuBOdN5z").await.unwrap();
        assert_eq!(fetched.name.as_deref(), Some("spaces/jQCFfuBOdN5z"));
    }

    #[tokio::test]
    async fn test_list_conference_records_with_paging() {
        let client = spawn_meet_api().await;

        let page = PageRequest {
            page_size: Some(10),
            page_token: Some("tok".to_string()),
        };
        let resp = client
            .list_conference_records(Some("space.name = \"spaces/abc\""), &page)
            .await
            .unwrap();

        assert_eq!(resp.conference_records.len(), 1);
        let record = &resp.conference_records[0];
        assert_eq!(record.name, "conferenceRecords/rec-1");
        assert_eq!(record.space.as_deref(), Some("space.name = \"spaces/abc\""));
        assert!(record.start_time.is_some());
        assert!(record.end_time.is_none());
        assert_eq!(resp.next_page_token.as_deref(), Some("tok-next"));
    }

    #[tokio::test]
    async fn test_list_participants() {
        let client = spawn_meet_api().await;

        let resp = client
            .list_participants("rec-1", &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(resp.total_size, Some(1));
        assert_eq!(
            resp.participants[0].name,
            "conferenceRecords/rec-1/participants/p1"
        );
    }

    #[test]
    fn test_resource_names() {
        assert_eq!(space_name("abc"), "spaces/abc");
        assert_eq!(space_name("spaces/abc"), "spaces/abc");
        assert_eq!(record_name("r1"), "conferenceRecords/r1");
    }
}
