use std::sync::Arc;

use retail_agent::{build_runtime, Collaborators};
use retail_core::clock::SystemClock;
use serde_json::{json, Value};

use super::{CommandContext, CommandResult};

const COMMAND: &str = "tools";

/// Describes the roster without contacting Slack or Notion.
pub fn run(context: &CommandContext) -> CommandResult {
    let config = match context.load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = build_runtime(&config, Arc::new(SystemClock), Collaborators::default());
    let agency = runtime.agency();

    let agents: Vec<Value> = agency
        .agents
        .iter()
        .map(|profile| {
            json!({
                "role": profile.role,
                "description": profile.description,
                "tools": runtime.tools_for(profile.role),
            })
        })
        .collect();
    let flows: Vec<Value> =
        agency.flows.iter().map(|(from, to)| json!({"from": from, "to": to})).collect();

    CommandResult::success_with(
        COMMAND,
        format!("{} agents, {} tools", agents.len(), runtime.registry().len()),
        Some(json!({
            "entry_point": agency.entry_point,
            "agents": agents,
            "flows": flows,
        })),
    )
}
