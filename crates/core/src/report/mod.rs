//! Report shaping and rendering.
//!
//! A [`ReportRequest`] names one of three report kinds. The generator
//! buckets the raw metrics into that kind's sections and stamps the result
//! with the local time; the renderers turn the [`ReportContent`] into plain
//! text or pretty JSON. The rich-document rendering lives with the Notion
//! client because its block format is Notion's.

pub mod content;
pub mod metrics;

use std::sync::Arc;

use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::errors::ReportError;

use self::content::{ReportContent, SectionLine};
use self::metrics::Metrics;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    ExecutiveSummary,
    DetailedAnalysis,
    Dashboard,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExecutiveSummary => "executive_summary",
            Self::DetailedAnalysis => "detailed_analysis",
            Self::Dashboard => "dashboard",
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "executive_summary" => Ok(Self::ExecutiveSummary),
            "detailed_analysis" => Ok(Self::DetailedAnalysis),
            "dashboard" => Ok(Self::Dashboard),
            _ => Err(ReportError::UnsupportedReportKind(value.to_string())),
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputEncoding {
    #[default]
    StructuredDocument,
    PlainText,
    Json,
}

impl std::str::FromStr for OutputEncoding {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "notion" | "structured_document" => Ok(Self::StructuredDocument),
            "text" | "plain_text" => Ok(Self::PlainText),
            "json" => Ok(Self::Json),
            _ => Err(ReportError::UnsupportedOutputEncoding(value.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReportRequest {
    pub kind: ReportKind,
    pub metrics: Metrics,
    pub title: String,
    pub encoding: OutputEncoding,
    pub tags: Vec<String>,
}

#[derive(Clone)]
pub struct ReportGenerator {
    clock: Arc<dyn Clock>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self { clock: Arc::new(SystemClock) }
    }
}

impl ReportGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn generate(&self, request: &ReportRequest) -> ReportContent {
        ReportContent {
            title: request.title.clone(),
            kind: request.kind,
            generated_at: self.clock.local_timestamp(),
            sections: content::shape(request.kind, &request.metrics),
        }
    }
}

pub fn render_json(content: &ReportContent) -> Result<String, ReportError> {
    serde_json::to_string_pretty(content).map_err(|error| ReportError::Serialization(error.to_string()))
}

pub fn render_text(content: &ReportContent) -> String {
    let mut text = String::new();
    text.push_str(&format!("{}\n", content.title));
    text.push_str(&format!("{}\n", "=".repeat(content.title.chars().count())));
    text.push_str(&format!("Generated: {}\n", content.generated_at));
    text.push_str(&format!("Type: {}\n\n", content.kind));

    for section in &content.sections {
        text.push_str(&format!("\n{}\n{}\n", section.heading(), "-".repeat(section.name.len())));
        for line in section.value.lines() {
            match line {
                SectionLine::Field { label, value } => {
                    text.push_str(&format!("{label}: {value}\n"));
                }
                SectionLine::Item(item) => text.push_str(&format!("- {item}\n")),
                SectionLine::Bare(value) => text.push_str(&format!("{value}\n")),
            }
        }
    }

    text
}
