use std::sync::Arc;

use async_trait::async_trait;
use retail_core::errors::ToolError;
use retail_notion::{
    publish, sharing_url, NotionApi, NotionApiError, NotionBlock, PageDraft, PublishError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{parse_input, to_payload, Tool};

pub(crate) const NOTION_UNCONFIGURED: &str =
    "Notion credentials are not configured; set notion.token and notion.database_id";

/// A configured Notion database that pages are created in.
#[derive(Clone)]
pub struct NotionTarget {
    pub api: Arc<dyn NotionApi>,
    pub database_id: String,
    pub page_base_url: String,
}

pub(crate) fn notion_tool_error(context: &str, error: &NotionApiError) -> ToolError {
    ToolError::collaborator(format!("{context}: {error}"))
}

/// Names the partly written page, if any, so a retry does not duplicate it.
pub(crate) fn publish_tool_error(context: &str, error: &PublishError) -> ToolError {
    match error.page() {
        Some(page) => ToolError::collaborator(format!(
            "{context}: {}. A partial page was created (id {}, {}); complete or delete it \
             before retrying",
            error.api_error(),
            page.id,
            page.url
        )),
        None => notion_tool_error(context, error.api_error()),
    }
}

#[derive(Debug, Deserialize)]
struct PosterInput {
    title: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PosterPayload {
    message: String,
    page_id: String,
    url: String,
    sharing_url: String,
    database: String,
}

pub struct NotionPosterTool {
    target: Option<NotionTarget>,
}

impl NotionPosterTool {
    pub fn new(target: Option<NotionTarget>) -> Self {
        Self { target }
    }
}

#[async_trait]
impl Tool for NotionPosterTool {
    fn name(&self) -> &'static str {
        "notion_poster"
    }

    fn description(&self) -> &'static str {
        "Creates a Notion page holding the given text and returns its direct and sharing links."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string", "description": "Page title"},
                "content": {"type": "string", "description": "Page body, posted as one paragraph"},
                "tags": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["title", "content"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let input: PosterInput = parse_input(self.name(), input)?;
        if input.title.trim().is_empty() {
            return Err(ToolError::invalid_input("title must not be empty"));
        }
        let Some(target) = self.target.as_ref() else {
            return Err(ToolError::unavailable(NOTION_UNCONFIGURED));
        };

        let database = target.api.retrieve_database(&target.database_id).await.map_err(|error| {
            warn!(
                event_name = "tool.notion_poster.database_unreachable",
                database_id = %target.database_id,
                error = %error,
                "notion database check failed"
            );
            notion_tool_error("Error connecting to database", &error)
        })?;

        let draft = PageDraft {
            database_id: target.database_id.clone(),
            title: input.title,
            tags: input.tags,
            children: vec![NotionBlock::paragraph(&input.content)],
        };
        let page = publish(target.api.as_ref(), &draft, &target.page_base_url)
            .await
            .map_err(|error| publish_tool_error("Error creating Notion page", &error))?;
        let sharing =
            sharing_url(&target.page_base_url, database.workspace_id.as_deref(), &page.id);

        info!(
            event_name = "tool.notion_poster.created",
            page_id = %page.id,
            database = %database.title,
            "notion page created"
        );
        to_payload(&PosterPayload {
            message: format!(
                "Successfully created Notion page!\nDirect URL: {}\nSharing URL: {}\nDatabase: {}",
                page.url, sharing, database.title
            ),
            page_id: page.id,
            url: page.url,
            sharing_url: sharing,
            database: database.title,
        })
    }
}
