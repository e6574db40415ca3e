//! Tools the agents act through.
//!
//! Every tool takes a JSON object, validates it into a typed input and
//! returns a JSON payload or a [`ToolError`]. Transport failures never
//! escape a tool as anything else.

pub mod date;
pub mod notion;
pub mod report;
pub mod slack;
pub mod task;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use retail_core::errors::ToolError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use date::GetDateTool;
pub use notion::NotionPosterTool;
pub use report::ReportGeneratorTool;
pub use slack::SlackCommunicatorTool;
pub use task::TaskManagerTool;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON schema of the accepted input object.
    fn parameters(&self) -> Value;
    async fn execute(&self, input: Value) -> Result<Value, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: self.description(),
            parameters: self.parameters(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Deserializes tool input, reporting shape errors as `invalid_input`.
pub(crate) fn parse_input<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T, ToolError> {
    let input = if input.is_null() { Value::Object(Default::default()) } else { input };
    serde_json::from_value(input)
        .map_err(|error| ToolError::invalid_input(format!("invalid input for `{tool}`: {error}")))
}

pub(crate) fn to_payload<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value)
        .map_err(|error| ToolError::invalid_input(format!("payload serialization failed: {error}")))
}
