use std::sync::Arc;

use async_trait::async_trait;
use retail_core::errors::ToolError;
use retail_core::report::content::ReportContent;
use retail_core::report::metrics::Metrics;
use retail_core::report::{
    render_json, render_text, OutputEncoding, ReportGenerator, ReportKind, ReportRequest,
};
use retail_notion::{publish, report_blocks, PageDraft};
use retail_slack::{report_published_message, PostMessageRequest, SlackApi};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::notion::{publish_tool_error, NotionTarget, NOTION_UNCONFIGURED};
use super::slack::SLACK_UNCONFIGURED;
use super::{parse_input, to_payload, Tool};

#[derive(Debug, Deserialize)]
struct ReportInput {
    #[serde(alias = "report_kind")]
    report_type: String,
    #[serde(alias = "raw_metrics", alias = "metrics")]
    data: Value,
    title: String,
    #[serde(default, alias = "format", alias = "output_encoding")]
    format_type: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    notify_channel: Option<String>,
}

/// What happened to the Slack announcement of a published report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Notification {
    Sent { channel: String, ts: String },
    Skipped { reason: String },
    Failed { channel: String, error: String },
}

#[derive(Debug, Serialize)]
struct PublishedReport {
    format: &'static str,
    message: String,
    title: String,
    report_type: ReportKind,
    page_id: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<Notification>,
}

pub struct ReportGeneratorTool {
    generator: ReportGenerator,
    notion: Option<NotionTarget>,
    slack: Option<Arc<dyn SlackApi>>,
    default_channel: Option<String>,
}

impl ReportGeneratorTool {
    pub fn new(
        generator: ReportGenerator,
        notion: Option<NotionTarget>,
        slack: Option<Arc<dyn SlackApi>>,
    ) -> Self {
        Self { generator, notion, slack, default_channel: None }
    }

    /// Channel announced to when the caller does not name one.
    pub fn with_default_channel(mut self, channel: Option<String>) -> Self {
        self.default_channel = channel.filter(|channel| !channel.trim().is_empty());
        self
    }

    fn request(input: &ReportInput) -> Result<ReportRequest, ToolError> {
        let kind = input.report_type.parse::<ReportKind>()?;
        let encoding = match input.format_type.as_deref() {
            Some(selector) => selector.parse::<OutputEncoding>()?,
            None => OutputEncoding::default(),
        };
        if !input.data.is_object() {
            return Err(ToolError::invalid_input("data must be a mapping of metric name to value"));
        }
        let metrics: Metrics = serde_json::from_value(input.data.clone())
            .map_err(|error| ToolError::invalid_input(format!("invalid metrics: {error}")))?;

        Ok(ReportRequest {
            kind,
            metrics,
            title: input.title.clone(),
            encoding,
            tags: input.tags.clone(),
        })
    }

    async fn publish(
        &self,
        request: &ReportRequest,
        content: &ReportContent,
        notify_channel: Option<String>,
    ) -> Result<Value, ToolError> {
        let Some(target) = self.notion.as_ref() else {
            return Err(ToolError::unavailable(NOTION_UNCONFIGURED));
        };

        let draft = PageDraft {
            database_id: target.database_id.clone(),
            title: request.title.clone(),
            tags: request.tags.clone(),
            children: report_blocks(content),
        };
        let page = publish(target.api.as_ref(), &draft, &target.page_base_url).await.map_err(
            |error| {
                warn!(
                    event_name = "tool.report_generator.publish_failed",
                    report_type = %request.kind,
                    partial_page = error.page().map(|page| page.id.as_str()),
                    error = %error,
                    "report could not be saved to notion"
                );
                publish_tool_error("Error saving to Notion", &error)
            },
        )?;

        let channel = notify_channel
            .filter(|channel| !channel.trim().is_empty())
            .or_else(|| self.default_channel.clone());
        let notification = match channel {
            Some(channel) => Some(self.announce(&channel, content, &page.url).await),
            None => None,
        };

        to_payload(&PublishedReport {
            format: "notion",
            message: format!(
                "Report generated successfully!\nTitle: {}\nType: {}\nView in Notion: {}",
                request.title, request.kind, page.url
            ),
            title: request.title.clone(),
            report_type: request.kind,
            page_id: page.id,
            url: page.url,
            notification,
        })
    }

    async fn announce(&self, channel: &str, content: &ReportContent, url: &str) -> Notification {
        let Some(slack) = self.slack.as_ref() else {
            return Notification::Skipped { reason: SLACK_UNCONFIGURED.to_string() };
        };

        let template =
            report_published_message(&content.title, content.kind.as_str(), &content.generated_at, url);
        let request = PostMessageRequest::new(channel.trim(), template.fallback_text.clone())
            .with_blocks(Some(template.blocks_value()));
        match slack.post_message(&request).await {
            Ok(posted) => Notification::Sent { channel: posted.channel, ts: posted.ts },
            Err(error) => {
                warn!(
                    event_name = "tool.report_generator.notify_failed",
                    channel,
                    error = %error,
                    "report published but the slack announcement failed"
                );
                Notification::Failed { channel: channel.to_string(), error: error.describe() }
            }
        }
    }
}

#[async_trait]
impl Tool for ReportGeneratorTool {
    fn name(&self) -> &'static str {
        "report_generator"
    }

    fn description(&self) -> &'static str {
        "Shapes business metrics into an executive summary, detailed analysis or dashboard and \
         returns it as text, JSON, or a Notion page (optionally announced in Slack)."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "report_type": {
                    "type": "string",
                    "enum": ["executive_summary", "detailed_analysis", "dashboard"]
                },
                "data": {
                    "type": "object",
                    "description": "Metric name to number, string, list, or mapping with marker keys \
                                    (value, highlight, recommendation, detailed, trend, insight, kpi, performance, alert)"
                },
                "title": {"type": "string"},
                "format_type": {"type": "string", "enum": ["notion", "text", "json"], "default": "notion"},
                "tags": {"type": "array", "items": {"type": "string"}},
                "notify_channel": {
                    "type": "string",
                    "description": "Slack channel to announce the Notion page in"
                }
            },
            "required": ["report_type", "data", "title"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let input: ReportInput = parse_input(self.name(), input)?;
        let request = Self::request(&input)?;
        let content = self.generator.generate(&request);
        info!(
            event_name = "tool.report_generator.generated",
            report_type = %request.kind,
            metrics = request.metrics.len(),
            sections = content.sections.len(),
            "report content generated"
        );

        match request.encoding {
            OutputEncoding::PlainText => {
                Ok(json!({"format": "text", "report": render_text(&content)}))
            }
            OutputEncoding::Json => {
                let report = render_json(&content)?;
                Ok(json!({"format": "json", "report": report}))
            }
            OutputEncoding::StructuredDocument => {
                self.publish(&request, &content, input.notify_channel).await
            }
        }
    }
}
