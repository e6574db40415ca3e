use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use retail_agent::{AgentRole, ToolOutcome};
use serde_json::{json, Value};

use super::{CommandContext, CommandResult, EXIT_INVALID_INPUT};

const COMMAND: &str = "report";

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    #[arg(long, default_value = "executive_summary", help = "executive_summary | detailed_analysis | dashboard")]
    pub kind: String,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "notion", help = "text | json | notion")]
    pub format: String,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long, help = "JSON metrics file; reads stdin when omitted or `-`")]
    pub metrics: Option<PathBuf>,
    #[arg(long, help = "Slack channel announced to after a Notion publish")]
    pub notify_channel: Option<String>,
}

pub async fn run(context: &CommandContext, args: ReportArgs) -> CommandResult {
    let metrics = match read_metrics(args.metrics.as_deref()) {
        Ok(metrics) => metrics,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_input",
                format!("{error:#}"),
                EXIT_INVALID_INPUT,
            )
        }
    };

    let mut input = json!({
        "report_type": args.kind,
        "data": metrics,
        "title": args.title,
        "format_type": args.format,
        "tags": args.tags,
    });
    if let Some(channel) = args.notify_channel {
        input["notify_channel"] = Value::String(channel);
    }

    let outcome =
        match context.invoke(COMMAND, AgentRole::ReportingManager, "report_generator", input).await
        {
            Ok(outcome) => outcome,
            Err(result) => return result,
        };

    render(outcome)
}

/// Text and JSON reports print as-is; Notion publications keep the envelope.
fn render(outcome: ToolOutcome) -> CommandResult {
    let raw = outcome
        .payload()
        .filter(|payload| payload["format"] != "notion")
        .and_then(|payload| payload["report"].as_str())
        .map(str::to_string);

    match raw {
        Some(report) => CommandResult::raw(report),
        None => CommandResult::from_outcome(COMMAND, outcome),
    }
}

fn read_metrics(path: Option<&Path>) -> anyhow::Result<Value> {
    let raw = match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("could not read metrics file `{}`", path.display()))?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("could not read metrics from stdin")?;
            buffer
        }
    };

    let metrics: Value = serde_json::from_str(&raw).context("metrics must be valid JSON")?;
    if !metrics.is_object() {
        bail!("metrics must be a JSON object mapping metric names to values");
    }
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use retail_agent::{AgentRole, ToolOutcome};
    use serde_json::json;

    use super::{read_metrics, render};

    #[test]
    fn metrics_file_must_hold_an_object() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "[1, 2, 3]").expect("write metrics");

        let error = read_metrics(Some(file.path())).expect_err("array rejected");
        assert!(error.to_string().contains("JSON object"));
    }

    #[test]
    fn missing_metrics_file_names_the_path() {
        let error = read_metrics(Some(std::path::Path::new("/nonexistent/metrics.json")))
            .expect_err("missing file");
        assert!(format!("{error:#}").contains("/nonexistent/metrics.json"));
    }

    #[test]
    fn text_reports_render_raw() {
        let outcome = ToolOutcome::Ok {
            agent: AgentRole::ReportingManager,
            tool: "report_generator".to_string(),
            payload: json!({"format": "text", "report": "Q1\n"}),
        };

        let result = render(outcome);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "Q1\n");
    }
}
