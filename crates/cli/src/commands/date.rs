use retail_agent::AgentRole;
use serde_json::json;

use super::{CommandContext, CommandResult};

const COMMAND: &str = "date";

pub async fn run(context: &CommandContext, timezone: Option<String>, format: String) -> CommandResult {
    let mut input = json!({ "format": format });
    if let Some(timezone) = timezone {
        input["timezone"] = json!(timezone);
    }

    match context.invoke(COMMAND, AgentRole::Ceo, "get_date", input).await {
        Ok(outcome) => CommandResult::from_outcome(COMMAND, outcome),
        Err(result) => result,
    }
}
