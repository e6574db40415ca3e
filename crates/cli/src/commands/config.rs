use std::env;
use std::fs;
use std::path::Path;

use retail_core::config::{resolve_config_path, AppConfig};
use secrecy::ExposeSecret;
use toml::Value;

use super::{CommandContext, CommandResult, EXIT_CONFIG};

const COMMAND: &str = "config";

pub fn run(context: &CommandContext) -> CommandResult {
    let config = match context.load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = resolve_config_path(context.config_path.as_deref());
    let config_file_doc = match load_config_file_doc(config_file_path.as_deref()) {
        Ok(doc) => doc,
        Err(message) => return CommandResult::failure(COMMAND, "config_file", message, EXIT_CONFIG),
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in entries(&config) {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, &value, source));
    }

    CommandResult::raw(lines.join("\n"))
}

type Entry = (&'static str, String, &'static [&'static str]);

fn entries(config: &AppConfig) -> Vec<Entry> {
    vec![
        entry(
            "slack.bot_token",
            redact_token(config.slack.bot_token.expose_secret()),
            &["RETAIL_SLACK_BOT_TOKEN", "SLACK_BOT_TOKEN"],
        ),
        entry("slack.api_base_url", config.slack.api_base_url.clone(), &["RETAIL_SLACK_API_BASE_URL"]),
        entry(
            "notion.token",
            redact_token(config.notion.token.expose_secret()),
            &["RETAIL_NOTION_TOKEN", "NOTION_TOKEN"],
        ),
        entry(
            "notion.database_id",
            config.notion.database_id().unwrap_or("<unset>").to_string(),
            &["RETAIL_NOTION_DATABASE_ID", "NOTION_DATABASE_ID"],
        ),
        entry(
            "notion.api_base_url",
            config.notion.api_base_url.clone(),
            &["RETAIL_NOTION_API_BASE_URL"],
        ),
        entry(
            "notion.page_base_url",
            config.notion.page_base_url.clone(),
            &["RETAIL_NOTION_PAGE_BASE_URL"],
        ),
        entry("notion.api_version", config.notion.api_version.clone(), &["RETAIL_NOTION_API_VERSION"]),
        entry(
            "agency.default_timezone",
            config.agency.default_timezone.clone(),
            &["RETAIL_AGENCY_DEFAULT_TIMEZONE"],
        ),
        entry(
            "agency.report_channel",
            config.agency.report_channel.clone().unwrap_or_else(|| "<unset>".to_string()),
            &["RETAIL_AGENCY_REPORT_CHANNEL"],
        ),
        entry("http.timeout_secs", config.http.timeout_secs.to_string(), &["RETAIL_HTTP_TIMEOUT_SECS"]),
        entry(
            "logging.level",
            config.logging.level.clone(),
            &["RETAIL_LOGGING_LEVEL", "RETAIL_LOG_LEVEL"],
        ),
        entry(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["RETAIL_LOGGING_FORMAT", "RETAIL_LOG_FORMAT"],
        ),
    ]
}

fn entry(key: &'static str, value: String, env_keys: &'static [&'static str]) -> Entry {
    (key, value, env_keys)
}

fn load_config_file_doc(path: Option<&Path>) -> Result<Option<Value>, String> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("could not read `{}`: {error}", path.display()))?;
    raw.parse::<Value>()
        .map(Some)
        .map_err(|error| format!("could not parse `{}`: {error}", path.display()))
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps a token's vendor prefix (`xoxb-`) and hides the rest.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
