//! HTTP transport for the remote JSON store
//!
//! Writes go straight to the store; reads can be routed through a read-only
//! proxy that wraps the upstream body in a `contents` string field.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use url::{form_urlencoded, Url};

use shared::{component_debug, format_timestamp, logging::Component, ProjectId};
use crate::config::BoardConfig;
use crate::error::{BoardError, BoardResult};
use crate::traits::RemoteStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response body excerpt kept in errors and notices
pub const BODY_EXCERPT_LEN: usize = 100;

/// Real remote store implementation backed by `reqwest`
#[derive(Clone)]
pub struct RealRemoteStore {
    client: reqwest::Client,
    store_url: Url,
    metadata_url: Url,
    read_proxy: Option<String>,
}

impl RealRemoteStore {
    pub fn new(config: &BoardConfig) -> BoardResult<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            store_url: parse_url("store_url", &config.store_url)?,
            metadata_url: parse_url("metadata_url", &config.metadata_url)?,
            read_proxy: config.read_proxy.clone(),
        })
    }

    /// `{store}?action=PUT&id={project}`
    pub fn write_url(&self, project: &ProjectId) -> Url {
        self.action_url("PUT", project)
    }

    /// Read URL, wrapped by the proxy when one is configured
    pub fn read_url(&self, project: &ProjectId) -> String {
        let target = self.action_url("GET", project);
        match &self.read_proxy {
            Some(proxy) => {
                let encoded: String = form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect();
                format!("{proxy}{encoded}")
            }
            None => target.into(),
        }
    }

    pub fn metadata_url(&self, project: &ProjectId) -> Url {
        let mut url = self.metadata_url.clone();
        url.query_pairs_mut().append_pair("id", project.as_str());
        url
    }

    fn action_url(&self, action: &str, project: &ProjectId) -> Url {
        let mut url = self.store_url.clone();
        url.query_pairs_mut()
            .append_pair("action", action)
            .append_pair("id", project.as_str());
        url
    }

    async fn check_status(response: reqwest::Response) -> BoardResult<String> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BoardError::HttpStatus {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl RemoteStore for RealRemoteStore {
    async fn put_records(&self, project: &ProjectId, body: String) -> BoardResult<()> {
        let url = self.write_url(project);
        component_debug!(Component::Sync, "📤 POST {} ({} bytes)", url, body.len());

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        Self::check_status(response).await.map(|_| ())
    }

    async fn fetch_payload(&self, project: &ProjectId) -> BoardResult<Value> {
        let url = self.read_url(project);
        component_debug!(Component::Sync, "📥 GET {}", url);

        let response = self.client.get(&url).send().await?;
        let body = Self::check_status(response).await?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| BoardError::format(format!("response is not JSON: {e}")))?;

        Ok(if self.read_proxy.is_some() {
            unwrap_proxy_envelope(payload)
        } else {
            payload
        })
    }

    async fn put_metadata(&self, project: &ProjectId, note: &str, modified_at: DateTime<Utc>) -> BoardResult<()> {
        let body = json!({
            "note": note,
            "ultima_modifica": format_timestamp(modified_at),
        });

        let response = self.client.post(self.metadata_url(project)).json(&body).send().await?;
        Self::check_status(response).await.map(|_| ())
    }
}

/// Replace a proxy envelope by the upstream body it carries
///
/// A `contents` string is parsed as JSON, or kept as a raw string when it is
/// not JSON. Envelopes without a non-empty `contents` string pass through.
pub fn unwrap_proxy_envelope(payload: Value) -> Value {
    let contents = match payload.get("contents") {
        Some(Value::String(contents)) if !contents.is_empty() => contents.clone(),
        _ => return payload,
    };
    serde_json::from_str(&contents).unwrap_or(Value::String(contents))
}

/// First `BODY_EXCERPT_LEN` characters of a body, with an ellipsis when cut
pub fn excerpt(body: &str) -> String {
    if body.chars().count() <= BODY_EXCERPT_LEN {
        return body.to_string();
    }
    let cut: String = body.chars().take(BODY_EXCERPT_LEN).collect();
    format!("{cut}...")
}

fn parse_url(field: &str, value: &str) -> BoardResult<Url> {
    Url::parse(value).map_err(|e| BoardError::config(format!("{field} {value:?} is not a valid URL: {e}")))
}
