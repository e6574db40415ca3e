//! Agent Runtime - the retail agency's agents and the tools they act through
//!
//! The language model that picks tools lives outside this crate. What lives
//! here is everything it talks to:
//! - **Agency** (`agency`) - the CEO and ReportingManager roster, their
//!   instructions and who may delegate to whom
//! - **Tools** (`tools`) - report generator, Slack messaging, Notion posting,
//!   date lookup and task records
//! - **Runtime** (`runtime`) - `AgentRuntime::invoke`, which checks tool
//!   assignment and turns every result into a `ToolOutcome`
//! - **Bootstrap** (`bootstrap`) - builds the runtime from `AppConfig`
//!
//! # Flow
//!
//! ```text
//! AgentRuntime::invoke(agent, tool, input)
//!        ↓ roster check
//! Tool::execute(input) → Result<Value, ToolError>
//!        ↓
//! ToolOutcome { status: ok | error }
//! ```

pub mod agency;
pub mod bootstrap;
pub mod runtime;
pub mod tools;

pub use agency::{Agency, AgencyError, AgentRole};
pub use bootstrap::{build_runtime, runtime_from_config, BootstrapError, Collaborators};
pub use runtime::{AgentRuntime, Delegation, ToolOutcome};
pub use tools::{Tool, ToolDefinition, ToolRegistry};
