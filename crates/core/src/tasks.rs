use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::Clock;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("unsupported task priority `{0}` (expected low|medium|high)")]
    UnsupportedPriority(String),
    #[error("unsupported task status `{0}` (expected new|in_progress|completed|blocked)")]
    UnsupportedStatus(String),
    #[error("task field `{0}` must not be empty")]
    MissingField(&'static str),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::str::FromStr for TaskPriority {
    type Err = TaskError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(TaskError::UnsupportedPriority(value.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    New,
    InProgress,
    Completed,
    Blocked,
}

impl std::str::FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "blocked" => Ok(Self::Blocked),
            _ => Err(TaskError::UnsupportedStatus(value.to_string())),
        }
    }
}

/// Task fields as an agent supplies them.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TaskDraft {
    #[serde(default)]
    pub task_id: Option<String>,
    pub task_type: String,
    pub description: String,
    pub assigned_to: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub task_type: String,
    pub description: String,
    pub assigned_to: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub created_at: String,
    pub last_updated: String,
}

impl TaskRecord {
    pub fn create(draft: TaskDraft, clock: &dyn Clock) -> Result<Self, TaskError> {
        let task_type = required("task_type", draft.task_type)?;
        let description = required("description", draft.description)?;
        let assigned_to = required("assigned_to", draft.assigned_to)?;
        let priority = draft
            .priority
            .as_deref()
            .map(str::parse::<TaskPriority>)
            .transpose()?
            .unwrap_or_default();
        let status =
            draft.status.as_deref().map(str::parse::<TaskStatus>).transpose()?.unwrap_or_default();

        let now = clock.now().with_timezone(&Local);
        let task_id = draft
            .task_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("TASK_{}", now.format("%Y%m%d_%H%M%S")));
        let stamp = now.to_rfc3339_opts(SecondsFormat::Secs, false);

        Ok(Self {
            task_id,
            task_type,
            description,
            assigned_to,
            priority,
            status,
            created_at: stamp.clone(),
            last_updated: stamp,
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, TaskError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
