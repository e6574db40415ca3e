use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::blocks::NotionBlock;

#[derive(Debug, Error)]
pub enum NotionApiError {
    #[error("notion request failed: {0}")]
    Transport(String),
    #[error("notion returned {status} ({code}): {message}")]
    Api { status: u16, code: String, message: String },
    #[error("failed to decode notion response: {0}")]
    Decode(String),
}

/// The wire request for `POST /v1/pages`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreatePageRequest {
    pub parent: Value,
    pub properties: Value,
    pub children: Vec<NotionBlock>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CreatedPage {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub title: String,
    pub workspace_id: Option<String>,
}

#[async_trait]
pub trait NotionApi: Send + Sync {
    async fn create_page(&self, request: &CreatePageRequest) -> Result<CreatedPage, NotionApiError>;
    async fn append_children(
        &self,
        block_id: &str,
        children: &[NotionBlock],
    ) -> Result<(), NotionApiError>;
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseInfo, NotionApiError>;
}

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    token: SecretString,
    api_base_url: String,
    api_version: String,
}

impl NotionClient {
    pub fn new(
        token: SecretString,
        api_base_url: impl Into<String>,
        api_version: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotionApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| NotionApiError::Transport(error.to_string()))?;
        Ok(Self {
            http,
            token,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, NotionApiError> {
        let url = format!("{}/v1/{}", self.api_base_url, path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(self.token.expose_secret())
            .header("Notion-Version", &self.api_version);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|error| {
            warn!(
                event_name = "notion.request.transport_failed",
                method = %method,
                path,
                error = %error,
                "notion request failed before a response arrived"
            );
            NotionApiError::Transport(error.to_string())
        })?;

        let status = response.status();
        let text =
            response.text().await.map_err(|error| NotionApiError::Transport(error.to_string()))?;
        debug!(
            event_name = "notion.request.completed",
            method = %method,
            path,
            status = status.as_u16(),
            "notion request completed"
        );

        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        serde_json::from_str(&text).map_err(|error| NotionApiError::Decode(error.to_string()))
    }
}

fn api_error(status: StatusCode, body: &str) -> NotionApiError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed.as_ref().and_then(|value| value.get(name)).and_then(Value::as_str).map(str::to_string)
    };
    let error = NotionApiError::Api {
        status: status.as_u16(),
        code: field("code").unwrap_or_else(|| "unknown".to_string()),
        message: field("message").unwrap_or_else(|| body.trim().to_string()),
    };
    warn!(event_name = "notion.request.rejected", status = status.as_u16(), error = %error);
    error
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn create_page(&self, request: &CreatePageRequest) -> Result<CreatedPage, NotionApiError> {
        let body = serde_json::to_value(request)
            .map_err(|error| NotionApiError::Decode(error.to_string()))?;
        let response = self.send(Method::POST, "pages", Some(&body)).await?;
        serde_json::from_value(response).map_err(|error| NotionApiError::Decode(error.to_string()))
    }

    async fn append_children(
        &self,
        block_id: &str,
        children: &[NotionBlock],
    ) -> Result<(), NotionApiError> {
        let body = json!({ "children": children });
        self.send(Method::PATCH, &format!("blocks/{block_id}/children"), Some(&body)).await?;
        Ok(())
    }

    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseInfo, NotionApiError> {
        let response = self.send(Method::GET, &format!("databases/{database_id}"), None).await?;
        Ok(database_info(&response))
    }
}

/// Title is the concatenated plain text of the database title runs.
fn database_info(response: &Value) -> DatabaseInfo {
    let title = response
        .get("title")
        .and_then(Value::as_array)
        .map(|runs| {
            runs.iter()
                .filter_map(|run| {
                    run.get("plain_text")
                        .or_else(|| run.get("text").and_then(|text| text.get("content")))
                        .and_then(Value::as_str)
                })
                .collect::<String>()
        })
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());
    let workspace_id = response
        .get("workspace_id")
        .or_else(|| response.get("parent").and_then(|parent| parent.get("workspace_id")))
        .and_then(Value::as_str)
        .map(str::to_string);

    DatabaseInfo { title, workspace_id }
}
