use std::sync::Arc;
use std::time::Instant;

use retail_core::errors::{ToolError, ToolErrorKind};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::agency::{Agency, AgencyError, AgentRole};
use crate::tools::{Tool, ToolDefinition, ToolRegistry};

/// Result of one tool call as the conversation sees it. Every call ends in
/// one of these; errors never propagate past the runtime.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Ok {
        agent: AgentRole,
        tool: String,
        payload: Value,
    },
    Error {
        agent: AgentRole,
        tool: String,
        kind: ToolErrorKind,
        message: String,
        user_message: &'static str,
    },
}

impl ToolOutcome {
    fn failure(agent: AgentRole, tool: &str, error: &ToolError) -> Self {
        Self::Error {
            agent,
            tool: tool.to_string(),
            kind: error.kind,
            message: error.message.clone(),
            user_message: error.user_message(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Ok { payload, .. } => Some(payload),
            Self::Error { .. } => None,
        }
    }
}

/// A validated hand-off from one agent to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Delegation {
    pub from: AgentRole,
    pub to: AgentRole,
    pub message: String,
}

pub struct AgentRuntime {
    agency: Agency,
    registry: ToolRegistry,
}

impl AgentRuntime {
    pub fn new(agency: Agency, registry: ToolRegistry) -> Self {
        Self { agency, registry }
    }

    pub fn agency(&self) -> &Agency {
        &self.agency
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Definitions of the tools `agent` may call, in roster order.
    pub fn tools_for(&self, agent: AgentRole) -> Vec<ToolDefinition> {
        self.agency
            .agent(agent)
            .map(|profile| {
                profile
                    .tools
                    .iter()
                    .filter_map(|name| self.registry.get(name))
                    .map(|tool| tool.definition())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn invoke(&self, agent: AgentRole, tool_name: &str, input: Value) -> ToolOutcome {
        let tool = match self.authorize(agent, tool_name) {
            Ok(tool) => tool,
            Err(error) => {
                warn!(
                    event_name = "agent.tool.refused",
                    agent = %agent,
                    tool = tool_name,
                    error = %error,
                    "tool call refused"
                );
                return ToolOutcome::failure(
                    agent,
                    tool_name,
                    &ToolError::invalid_input(error.to_string()),
                );
            }
        };

        let started = Instant::now();
        let result = tool.execute(input).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(payload) => {
                info!(
                    event_name = "agent.tool.completed",
                    agent = %agent,
                    tool = tool_name,
                    elapsed_ms,
                    "tool call completed"
                );
                ToolOutcome::Ok { agent, tool: tool_name.to_string(), payload }
            }
            Err(error) => {
                warn!(
                    event_name = "agent.tool.failed",
                    agent = %agent,
                    tool = tool_name,
                    kind = %error.kind,
                    elapsed_ms,
                    error = %error.message,
                    "tool call failed"
                );
                ToolOutcome::failure(agent, tool_name, &error)
            }
        }
    }

    pub fn delegate(
        &self,
        from: AgentRole,
        to: AgentRole,
        message: impl Into<String>,
    ) -> Result<Delegation, AgencyError> {
        if !self.agency.can_delegate(from, to) {
            return Err(AgencyError::DelegationNotAllowed { from, to });
        }
        let delegation = Delegation { from, to, message: message.into() };
        info!(
            event_name = "agent.delegation.sent",
            from = %from,
            to = %to,
            "delegated request"
        );
        Ok(delegation)
    }

    fn authorize(
        &self,
        agent: AgentRole,
        tool_name: &str,
    ) -> Result<Arc<dyn Tool>, AgencyError> {
        let tool = self
            .registry
            .get(tool_name)
            .ok_or_else(|| AgencyError::UnknownTool(tool_name.to_string()))?;
        if !self.agency.can_use(agent, tool_name) {
            return Err(AgencyError::ToolNotAssigned { agent, tool: tool_name.to_string() });
        }
        Ok(tool)
    }
}
