use retail_agent::AgentRole;
use serde_json::json;

use super::{CommandContext, CommandResult};

const COMMAND: &str = "slack";

pub async fn run(
    context: &CommandContext,
    channel: String,
    message: String,
    thread_ts: Option<String>,
) -> CommandResult {
    let input = json!({
        "channel_id": channel,
        "message": message,
        "thread_ts": thread_ts,
    });

    match context.invoke(COMMAND, AgentRole::Ceo, "slack_communicator", input).await {
        Ok(outcome) => CommandResult::from_outcome(COMMAND, outcome),
        Err(result) => result,
    }
}
