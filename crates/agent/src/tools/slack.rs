use std::sync::Arc;

use async_trait::async_trait;
use retail_core::errors::ToolError;
use retail_slack::{PostMessageRequest, SlackApi, SlackApiError};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{parse_input, to_payload, Tool};

pub(crate) const SLACK_UNCONFIGURED: &str =
    "SLACK_BOT_TOKEN is not configured; set slack.bot_token or RETAIL_SLACK_BOT_TOKEN";

#[derive(Debug, Deserialize)]
struct SlackInput {
    #[serde(alias = "channel")]
    channel_id: String,
    #[serde(alias = "text")]
    message: String,
    #[serde(default)]
    thread_ts: Option<String>,
    #[serde(default)]
    blocks: Option<Value>,
}

pub struct SlackCommunicatorTool {
    slack: Option<Arc<dyn SlackApi>>,
}

impl SlackCommunicatorTool {
    pub fn new(slack: Option<Arc<dyn SlackApi>>) -> Self {
        Self { slack }
    }
}

pub(crate) fn slack_tool_error(error: &SlackApiError) -> ToolError {
    ToolError::collaborator(error.describe())
}

#[async_trait]
impl Tool for SlackCommunicatorTool {
    fn name(&self) -> &'static str {
        "slack_communicator"
    }

    fn description(&self) -> &'static str {
        "Posts a markdown message (optionally threaded, optionally with Block Kit blocks) to a Slack channel."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "channel_id": {"type": "string", "description": "Slack channel ID, e.g. C0123456789"},
                "message": {"type": "string", "description": "Message text; Slack markdown is enabled"},
                "thread_ts": {"type": "string", "description": "Parent message timestamp to reply in a thread"},
                "blocks": {"type": "array", "description": "Raw Block Kit blocks", "items": {"type": "object"}}
            },
            "required": ["channel_id", "message"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let input: SlackInput = parse_input(self.name(), input)?;
        if input.channel_id.trim().is_empty() {
            return Err(ToolError::invalid_input("channel_id must not be empty"));
        }
        if input.blocks.as_ref().is_some_and(|blocks| !blocks.is_array() && !blocks.is_null()) {
            return Err(ToolError::invalid_input("blocks must be an array of Block Kit blocks"));
        }
        let Some(slack) = self.slack.as_ref() else {
            return Err(ToolError::unavailable(SLACK_UNCONFIGURED));
        };

        let request = PostMessageRequest::new(input.channel_id.trim(), input.message)
            .in_thread(input.thread_ts)
            .with_blocks(input.blocks);
        let posted = slack.post_message(&request).await.map_err(|error| {
            warn!(
                event_name = "tool.slack_communicator.failed",
                channel = %request.channel,
                error = %error,
                "slack message was not delivered"
            );
            slack_tool_error(&error)
        })?;

        info!(
            event_name = "tool.slack_communicator.sent",
            channel = %posted.channel,
            ts = %posted.ts,
            "slack message delivered"
        );
        to_payload(&posted)
    }
}
