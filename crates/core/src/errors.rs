use serde::Serialize;
use thiserror::Error;

use crate::tasks::TaskError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error(
        "unsupported report type `{0}` (expected executive_summary|detailed_analysis|dashboard)"
    )]
    UnsupportedReportKind(String),
    #[error("unsupported output format `{0}` (expected notion|text|json)")]
    UnsupportedOutputEncoding(String),
    #[error("report serialization failed: {0}")]
    Serialization(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    UnsupportedSelector,
    InvalidInput,
    CollaboratorUnavailable,
    CollaboratorError,
}

impl ToolErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedSelector => "unsupported_selector",
            Self::InvalidInput => "invalid_input",
            Self::CollaboratorUnavailable => "collaborator_unavailable",
            Self::CollaboratorError => "collaborator_error",
        }
    }
}

impl std::fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single tool call. Tools never panic or bubble transport
/// errors; they hand one of these back and the runtime turns it into an
/// outcome the conversation can continue from.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::UnsupportedSelector, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidInput, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::CollaboratorUnavailable, message)
    }

    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::CollaboratorError, message)
    }

    pub fn user_message(&self) -> &'static str {
        match self.kind {
            ToolErrorKind::UnsupportedSelector | ToolErrorKind::InvalidInput => {
                "The request could not be processed. Check the tool arguments and try again."
            }
            ToolErrorKind::CollaboratorUnavailable => {
                "The integration is not configured. Ask an operator to provide credentials."
            }
            ToolErrorKind::CollaboratorError => {
                "The external service rejected the request or could not be reached."
            }
        }
    }
}

impl From<ReportError> for ToolError {
    fn from(value: ReportError) -> Self {
        match value {
            ReportError::UnsupportedReportKind(_) | ReportError::UnsupportedOutputEncoding(_) => {
                Self::unsupported(value.to_string())
            }
            ReportError::Serialization(_) => Self::invalid_input(value.to_string()),
        }
    }
}

impl From<TaskError> for ToolError {
    fn from(value: TaskError) -> Self {
        match value {
            TaskError::UnsupportedPriority(_) | TaskError::UnsupportedStatus(_) => {
                Self::unsupported(value.to_string())
            }
            TaskError::MissingField(_) => Self::invalid_input(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ReportError, ToolError, ToolErrorKind};
    use crate::tasks::TaskError;

    #[test]
    fn unsupported_report_kind_maps_to_unsupported_selector() {
        let error = ToolError::from(ReportError::UnsupportedReportKind("weekly".to_owned()));

        assert_eq!(error.kind, ToolErrorKind::UnsupportedSelector);
        assert!(error.message.contains("weekly"));
    }

    #[test]
    fn missing_task_field_maps_to_invalid_input() {
        let error = ToolError::from(TaskError::MissingField("description"));

        assert_eq!(error.kind, ToolErrorKind::InvalidInput);
        assert_eq!(
            error.user_message(),
            "The request could not be processed. Check the tool arguments and try again."
        );
    }

    #[test]
    fn display_prefixes_machine_readable_kind() {
        let error = ToolError::unavailable("notion token is not configured");

        assert_eq!(error.to_string(), "collaborator_unavailable: notion token is not configured");
    }
}
