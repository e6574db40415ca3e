pub mod config;
pub mod date;
pub mod notion;
pub mod report;
pub mod slack;
pub mod task;
pub mod tools;

use std::path::PathBuf;
use std::sync::Arc;

use retail_agent::{runtime_from_config, AgentRole, ToolOutcome};
use retail_core::clock::SystemClock;
use retail_core::config::{AppConfig, LoadOptions};
use retail_core::errors::ToolErrorKind;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::logging::init_logging;

pub const EXIT_INVALID_INPUT: u8 = 2;
pub const EXIT_UNAVAILABLE: u8 = 3;
pub const EXIT_COLLABORATOR: u8 = 4;
pub const EXIT_CONFIG: u8 = 5;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with(command, message, None)
    }

    pub fn success_with(command: &str, message: impl Into<String>, payload: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            payload,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    /// Output printed verbatim, without the JSON envelope.
    pub fn raw(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            payload: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Maps a tool outcome onto the command envelope and exit code.
    pub fn from_outcome(command: &str, outcome: ToolOutcome) -> Self {
        match outcome {
            ToolOutcome::Ok { tool, payload, .. } => {
                Self::success_with(command, format!("{tool} completed"), Some(payload))
            }
            ToolOutcome::Error { kind, message, .. } => {
                Self::failure(command, kind.as_str(), message, exit_code_for(kind))
            }
        }
    }
}

pub fn exit_code_for(kind: ToolErrorKind) -> u8 {
    match kind {
        ToolErrorKind::UnsupportedSelector | ToolErrorKind::InvalidInput => EXIT_INVALID_INPUT,
        ToolErrorKind::CollaboratorUnavailable => EXIT_UNAVAILABLE,
        ToolErrorKind::CollaboratorError => EXIT_COLLABORATOR,
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config_path.clone(),
            require_file: self.config_path.is_some(),
            ..LoadOptions::default()
        }
    }

    pub fn load_config(&self, command: &str) -> Result<AppConfig, CommandResult> {
        AppConfig::load(self.load_options()).map_err(|error| {
            CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
        })
    }

    /// Loads configuration, wires the runtime and runs one tool as `agent`.
    pub async fn invoke(
        &self,
        command: &str,
        agent: AgentRole,
        tool: &str,
        input: Value,
    ) -> Result<ToolOutcome, CommandResult> {
        let config = self.load_config(command)?;
        init_logging(&config.logging);
        info!(event_name = "cli.command.started", command, agent = %agent, tool, "running tool");

        let runtime = runtime_from_config(&config, Arc::new(SystemClock)).map_err(|error| {
            CommandResult::failure(command, "bootstrap", error.to_string(), EXIT_CONFIG)
        })?;
        Ok(runtime.invoke(agent, tool, input).await)
    }
}
