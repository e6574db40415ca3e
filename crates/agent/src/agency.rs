//! Agent roster and the communication flows between agents.

use serde::Serialize;
use thiserror::Error;

pub const SHARED_INSTRUCTIONS: &str = include_str!("../instructions/agency.md");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AgentRole {
    #[serde(rename = "CEO")]
    Ceo,
    #[serde(rename = "ReportingManager")]
    ReportingManager,
}

impl AgentRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ceo => "CEO",
            Self::ReportingManager => "ReportingManager",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = AgencyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['_', '-', ' '], "").as_str() {
            "ceo" => Ok(Self::Ceo),
            "reportingmanager" => Ok(Self::ReportingManager),
            _ => Err(AgencyError::UnknownAgent(value.to_string())),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgencyError {
    #[error("unknown agent `{0}` (expected CEO|ReportingManager)")]
    UnknownAgent(String),
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    #[error("tool `{tool}` is not assigned to {agent}")]
    ToolNotAssigned { agent: AgentRole, tool: String },
    #[error("{from} cannot delegate to {to}")]
    DelegationNotAllowed { from: AgentRole, to: AgentRole },
}

#[derive(Clone, Debug, Serialize)]
pub struct AgentProfile {
    pub role: AgentRole,
    pub description: &'static str,
    #[serde(skip)]
    pub instructions: &'static str,
    pub tools: &'static [&'static str],
}

#[derive(Clone, Debug, Serialize)]
pub struct Agency {
    pub entry_point: AgentRole,
    pub agents: Vec<AgentProfile>,
    /// Directed `(from, to)` pairs; only these delegations are allowed.
    pub flows: Vec<(AgentRole, AgentRole)>,
}

impl Agency {
    pub fn retail() -> Self {
        Self {
            entry_point: AgentRole::Ceo,
            agents: vec![
                AgentProfile {
                    role: AgentRole::Ceo,
                    description: "Entry point of the retail assistant. Understands the business \
                                  question and coordinates the ReportingManager.",
                    instructions: include_str!("../instructions/ceo.md"),
                    tools: &["get_date", "task_manager", "slack_communicator", "notion_poster"],
                },
                AgentProfile {
                    role: AgentRole::ReportingManager,
                    description: "Turns retail metrics into executive summaries, detailed \
                                  analyses and dashboards.",
                    instructions: include_str!("../instructions/reporting_manager.md"),
                    tools: &["report_generator", "slack_communicator"],
                },
            ],
            flows: vec![(AgentRole::Ceo, AgentRole::ReportingManager)],
        }
    }

    pub fn agent(&self, role: AgentRole) -> Option<&AgentProfile> {
        self.agents.iter().find(|agent| agent.role == role)
    }

    pub fn can_use(&self, role: AgentRole, tool: &str) -> bool {
        self.agent(role).is_some_and(|agent| agent.tools.contains(&tool))
    }

    pub fn can_delegate(&self, from: AgentRole, to: AgentRole) -> bool {
        self.flows.contains(&(from, to))
    }

    /// Shared agency text followed by the agent's own instructions.
    pub fn instructions_for(&self, role: AgentRole) -> Option<String> {
        self.agent(role).map(|agent| format!("{SHARED_INSTRUCTIONS}\n{}", agent.instructions))
    }
}

#[cfg(test)]
mod tests {
    use super::{Agency, AgencyError, AgentRole};

    #[test]
    fn roles_parse_loosely() {
        assert_eq!("CEO".parse::<AgentRole>(), Ok(AgentRole::Ceo));
        assert_eq!("reporting_manager".parse::<AgentRole>(), Ok(AgentRole::ReportingManager));
        assert_eq!("ReportingManager".parse::<AgentRole>(), Ok(AgentRole::ReportingManager));
        assert_eq!(
            "Intern".parse::<AgentRole>(),
            Err(AgencyError::UnknownAgent("Intern".to_string()))
        );
    }

    #[test]
    fn tool_assignment_follows_roster() {
        let agency = Agency::retail();

        assert!(agency.can_use(AgentRole::Ceo, "notion_poster"));
        assert!(!agency.can_use(AgentRole::Ceo, "report_generator"));
        assert!(agency.can_use(AgentRole::ReportingManager, "report_generator"));
        assert!(agency.can_use(AgentRole::ReportingManager, "slack_communicator"));
    }

    #[test]
    fn only_ceo_delegates_to_reporting_manager() {
        let agency = Agency::retail();

        assert!(agency.can_delegate(AgentRole::Ceo, AgentRole::ReportingManager));
        assert!(!agency.can_delegate(AgentRole::ReportingManager, AgentRole::Ceo));
    }

    #[test]
    fn instructions_include_shared_protocol() {
        let text = Agency::retail()
            .instructions_for(AgentRole::ReportingManager)
            .expect("agent on roster");

        assert!(text.starts_with("# Retail Management Agency"));
        assert!(text.contains("# ReportingManager"));
    }
}
