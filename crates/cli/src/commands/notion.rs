use retail_agent::AgentRole;
use serde_json::json;

use super::{CommandContext, CommandResult};

const COMMAND: &str = "notion";

pub async fn run(
    context: &CommandContext,
    title: String,
    content: String,
    tags: Vec<String>,
) -> CommandResult {
    let input = json!({ "title": title, "content": content, "tags": tags });

    match context.invoke(COMMAND, AgentRole::Ceo, "notion_poster", input).await {
        Ok(outcome) => CommandResult::from_outcome(COMMAND, outcome),
        Err(result) => result,
    }
}
