use clap::Args;
use retail_agent::AgentRole;
use serde_json::json;

use super::{CommandContext, CommandResult};

const COMMAND: &str = "task";

#[derive(Debug, Clone, Args)]
pub struct TaskArgs {
    #[arg(long, help = "e.g. reporting, store_operations, customer_service")]
    pub task_type: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub assigned_to: String,
    #[arg(long, help = "low | medium | high")]
    pub priority: Option<String>,
    #[arg(long, help = "new | in_progress | completed | blocked")]
    pub status: Option<String>,
    #[arg(long, help = "Defaults to TASK_<timestamp>")]
    pub task_id: Option<String>,
}

pub async fn run(context: &CommandContext, args: TaskArgs) -> CommandResult {
    let input = json!({
        "task_id": args.task_id,
        "task_type": args.task_type,
        "description": args.description,
        "assigned_to": args.assigned_to,
        "priority": args.priority,
        "status": args.status,
    });

    match context.invoke(COMMAND, AgentRole::Ceo, "task_manager", input).await {
        Ok(outcome) => CommandResult::from_outcome(COMMAND, outcome),
        Err(result) => result,
    }
}
