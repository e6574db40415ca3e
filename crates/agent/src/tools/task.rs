use std::sync::Arc;

use async_trait::async_trait;
use retail_core::clock::Clock;
use retail_core::errors::ToolError;
use retail_core::tasks::{TaskDraft, TaskRecord};
use serde_json::{json, Value};
use tracing::info;

use super::{parse_input, to_payload, Tool};

/// Builds task records. Nothing is stored; the record is handed back to the
/// caller.
pub struct TaskManagerTool {
    clock: Arc<dyn Clock>,
}

impl TaskManagerTool {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl Tool for TaskManagerTool {
    fn name(&self) -> &'static str {
        "task_manager"
    }

    fn description(&self) -> &'static str {
        "Creates a task record for delegated work (reporting, store operations, customer service)."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": {"type": "string", "description": "Defaults to TASK_<YYYYmmdd_HHMMSS>"},
                "task_type": {"type": "string", "description": "e.g. reporting, store_operations"},
                "description": {"type": "string"},
                "assigned_to": {"type": "string", "description": "Agent or team owning the task"},
                "priority": {"type": "string", "enum": ["low", "medium", "high"]},
                "status": {"type": "string", "enum": ["new", "in_progress", "completed", "blocked"]}
            },
            "required": ["task_type", "description", "assigned_to"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let draft: TaskDraft = parse_input(self.name(), input)?;
        let record = TaskRecord::create(draft, self.clock.as_ref())?;
        info!(
            event_name = "tool.task_manager.created",
            task_id = %record.task_id,
            assigned_to = %record.assigned_to,
            "task record created"
        );
        to_payload(&record)
    }
}
