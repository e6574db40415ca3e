//! Retail Agency core - report shaping, configuration and shared tool types
//!
//! Everything in this crate is deterministic and free of network access:
//! - **Reports** (`report`) - bucket raw business metrics into report shapes
//!   and render them as plain text or JSON
//! - **Clock** (`clock`) - wall clock seam and timezone-aware date lookup
//! - **Tasks** (`tasks`) - task records handed out by the CEO agent
//! - **Config** (`config`) - layered configuration (defaults, file, env, overrides)
//! - **Errors** (`errors`) - the structured tool error taxonomy
//!
//! The Slack and Notion crates depend on this one; the agent crate wires all
//! of them into tools.

pub mod clock;
pub mod config;
pub mod errors;
pub mod report;
pub mod tasks;

pub use clock::{Clock, DateFormat, DateReading, FixedClock, InputFallback, SystemClock};
pub use errors::{ReportError, ToolError, ToolErrorKind};
pub use report::{
    content::{ReportContent, Section, SectionLine, SectionValue},
    metrics::{Marker, MetricEntry, Metrics, TaggedMetric},
    OutputEncoding, ReportGenerator, ReportKind, ReportRequest,
};
pub use tasks::{TaskDraft, TaskError, TaskPriority, TaskRecord, TaskStatus};
