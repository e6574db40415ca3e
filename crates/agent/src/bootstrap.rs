use std::sync::Arc;
use std::time::Duration;

use retail_core::clock::Clock;
use retail_core::config::AppConfig;
use retail_core::report::ReportGenerator;
use retail_notion::{NotionApiError, NotionClient};
use retail_slack::{SlackApi, SlackApiError, SlackWebClient};
use secrecy::SecretString;
use thiserror::Error;
use tracing::info;

use crate::agency::Agency;
use crate::runtime::AgentRuntime;
use crate::tools::notion::NotionTarget;
use crate::tools::{
    GetDateTool, NotionPosterTool, ReportGeneratorTool, SlackCommunicatorTool, TaskManagerTool,
    ToolRegistry,
};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("slack client could not be built: {0}")]
    Slack(#[source] SlackApiError),
    #[error("notion client could not be built: {0}")]
    Notion(#[source] NotionApiError),
}

/// External clients, present only when their credentials are configured.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub slack: Option<Arc<dyn SlackApi>>,
    pub notion: Option<NotionTarget>,
}

impl Collaborators {
    pub fn from_config(config: &AppConfig) -> Result<Self, BootstrapError> {
        let timeout = Duration::from_secs(config.http.timeout_secs);

        let slack = match config.slack.bot_token() {
            Some(token) => {
                let client = SlackWebClient::new(
                    SecretString::from(token.to_string()),
                    config.slack.api_base_url.clone(),
                    timeout,
                )
                .map_err(BootstrapError::Slack)?;
                Some(Arc::new(client) as Arc<dyn SlackApi>)
            }
            None => None,
        };

        let notion = match (config.notion.token(), config.notion.database_id()) {
            (Some(token), Some(database_id)) => {
                let client = NotionClient::new(
                    SecretString::from(token.to_string()),
                    config.notion.api_base_url.clone(),
                    config.notion.api_version.clone(),
                    timeout,
                )
                .map_err(BootstrapError::Notion)?;
                Some(NotionTarget {
                    api: Arc::new(client),
                    database_id: database_id.to_string(),
                    page_base_url: config.notion.page_base_url.clone(),
                })
            }
            _ => None,
        };

        info!(
            event_name = "system.bootstrap.collaborators",
            slack_configured = slack.is_some(),
            notion_configured = notion.is_some(),
            "external collaborators resolved"
        );
        Ok(Self { slack, notion })
    }
}

/// Registers every tool on the roster against the given collaborators.
pub fn build_runtime(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
    collaborators: Collaborators,
) -> AgentRuntime {
    let mut registry = ToolRegistry::default();
    registry.register(GetDateTool::new(clock.clone(), config.agency.default_timezone.clone()));
    registry.register(TaskManagerTool::new(clock.clone()));
    registry.register(SlackCommunicatorTool::new(collaborators.slack.clone()));
    registry.register(NotionPosterTool::new(collaborators.notion.clone()));
    registry.register(
        ReportGeneratorTool::new(
            ReportGenerator::new(clock),
            collaborators.notion,
            collaborators.slack,
        )
        .with_default_channel(config.agency.report_channel.clone()),
    );

    AgentRuntime::new(Agency::retail(), registry)
}

pub fn runtime_from_config(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<AgentRuntime, BootstrapError> {
    let collaborators = Collaborators::from_config(config)?;
    Ok(build_runtime(config, clock, collaborators))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use retail_core::clock::SystemClock;
    use retail_core::config::AppConfig;
    use retail_core::errors::ToolErrorKind;
    use serde_json::json;

    use super::{runtime_from_config, Collaborators};
    use crate::agency::AgentRole;
    use crate::runtime::ToolOutcome;

    #[test]
    fn default_config_has_no_collaborators() {
        let collaborators = Collaborators::from_config(&AppConfig::default()).expect("builds");

        assert!(collaborators.slack.is_none());
        assert!(collaborators.notion.is_none());
    }

    #[test]
    fn notion_needs_both_token_and_database() {
        let mut config = AppConfig::default();
        config.notion.token = "secret_abc".to_string().into();

        let collaborators = Collaborators::from_config(&config).expect("builds");
        assert!(collaborators.notion.is_none());

        config.notion.database_id = Some("db1".to_string());
        let collaborators = Collaborators::from_config(&config).expect("builds");
        assert!(collaborators.notion.is_some());
    }

    #[tokio::test]
    async fn every_roster_tool_is_registered() {
        let runtime =
            runtime_from_config(&AppConfig::default(), Arc::new(SystemClock)).expect("runtime");

        let mut names: Vec<&str> = runtime.registry().names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["get_date", "notion_poster", "report_generator", "slack_communicator", "task_manager"]
        );

        let outcome = runtime
            .invoke(AgentRole::Ceo, "slack_communicator", json!({"channel_id": "C1", "message": "hi"}))
            .await;
        assert!(matches!(
            outcome,
            ToolOutcome::Error { kind: ToolErrorKind::CollaboratorUnavailable, .. }
        ));
    }
}
