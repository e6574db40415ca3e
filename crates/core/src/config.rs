use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::resolve_timezone;

pub const CONFIG_FILE_NAME: &str = "retail-agency.toml";
pub const NESTED_CONFIG_FILE: &str = "config/retail-agency.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub slack: SlackConfig,
    pub notion: NotionConfig,
    pub agency: AgencyConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub bot_token: SecretString,
    pub api_base_url: String,
}

#[derive(Clone, Debug)]
pub struct NotionConfig {
    pub token: SecretString,
    pub database_id: Option<String>,
    pub api_base_url: String,
    pub page_base_url: String,
    pub api_version: String,
}

#[derive(Clone, Debug)]
pub struct AgencyConfig {
    pub default_timezone: String,
    pub report_channel: Option<String>,
}

#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub slack_bot_token: Option<String>,
    pub slack_api_base_url: Option<String>,
    pub notion_token: Option<String>,
    pub notion_database_id: Option<String>,
    pub notion_api_base_url: Option<String>,
    pub default_timezone: Option<String>,
    pub report_channel: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slack: SlackConfig {
                bot_token: String::new().into(),
                api_base_url: "https://slack.com/api".to_string(),
            },
            notion: NotionConfig {
                token: String::new().into(),
                database_id: None,
                api_base_url: "https://api.notion.com".to_string(),
                page_base_url: "https://notion.so".to_string(),
                api_version: "2022-06-28".to_string(),
            },
            agency: AgencyConfig { default_timezone: "UTC".to_string(), report_channel: None },
            http: HttpConfig { timeout_secs: 30 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl SlackConfig {
    /// The bot token, or `None` when it was never configured.
    pub fn bot_token(&self) -> Option<&str> {
        non_empty_secret(&self.bot_token)
    }
}

impl NotionConfig {
    pub fn token(&self) -> Option<&str> {
        non_empty_secret(&self.token)
    }

    pub fn database_id(&self) -> Option<&str> {
        self.database_id.as_deref().map(str::trim).filter(|value| !value.is_empty())
    }
}

fn non_empty_secret(secret: &SecretString) -> Option<&str> {
    let value = secret.expose_secret();
    (!value.trim().is_empty()).then_some(value)
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(slack) = patch.slack {
            if let Some(slack_bot_token_value) = slack.bot_token {
                self.slack.bot_token = secret_value(slack_bot_token_value);
            }
            if let Some(api_base_url) = slack.api_base_url {
                self.slack.api_base_url = api_base_url;
            }
        }

        if let Some(notion) = patch.notion {
            if let Some(notion_token_value) = notion.token {
                self.notion.token = secret_value(notion_token_value);
            }
            if let Some(database_id) = notion.database_id {
                self.notion.database_id = Some(database_id);
            }
            if let Some(api_base_url) = notion.api_base_url {
                self.notion.api_base_url = api_base_url;
            }
            if let Some(page_base_url) = notion.page_base_url {
                self.notion.page_base_url = page_base_url;
            }
            if let Some(api_version) = notion.api_version {
                self.notion.api_version = api_version;
            }
        }

        if let Some(agency) = patch.agency {
            if let Some(default_timezone) = agency.default_timezone {
                self.agency.default_timezone = default_timezone;
            }
            if let Some(report_channel) = agency.report_channel {
                self.agency.report_channel = Some(report_channel);
            }
        }

        if let Some(http) = patch.http {
            if let Some(timeout_secs) = http.timeout_secs {
                self.http.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let bot_token = read_env("RETAIL_SLACK_BOT_TOKEN").or_else(|| read_env("SLACK_BOT_TOKEN"));
        if let Some(value) = bot_token {
            self.slack.bot_token = secret_value(value);
        }
        if let Some(value) = read_env("RETAIL_SLACK_API_BASE_URL") {
            self.slack.api_base_url = value;
        }

        let notion_token = read_env("RETAIL_NOTION_TOKEN").or_else(|| read_env("NOTION_TOKEN"));
        if let Some(value) = notion_token {
            self.notion.token = secret_value(value);
        }
        let database_id =
            read_env("RETAIL_NOTION_DATABASE_ID").or_else(|| read_env("NOTION_DATABASE_ID"));
        if let Some(value) = database_id {
            self.notion.database_id = Some(value);
        }
        if let Some(value) = read_env("RETAIL_NOTION_API_BASE_URL") {
            self.notion.api_base_url = value;
        }
        if let Some(value) = read_env("RETAIL_NOTION_PAGE_BASE_URL") {
            self.notion.page_base_url = value;
        }
        if let Some(value) = read_env("RETAIL_NOTION_API_VERSION") {
            self.notion.api_version = value;
        }

        if let Some(value) = read_env("RETAIL_AGENCY_DEFAULT_TIMEZONE") {
            self.agency.default_timezone = value;
        }
        if let Some(value) = read_env("RETAIL_AGENCY_REPORT_CHANNEL") {
            self.agency.report_channel = Some(value);
        }

        if let Some(value) = read_env("RETAIL_HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = parse_u64("RETAIL_HTTP_TIMEOUT_SECS", &value)?;
        }

        let log_level = read_env("RETAIL_LOGGING_LEVEL").or_else(|| read_env("RETAIL_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("RETAIL_LOGGING_FORMAT").or_else(|| read_env("RETAIL_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(slack_bot_token) = overrides.slack_bot_token {
            self.slack.bot_token = secret_value(slack_bot_token);
        }
        if let Some(api_base_url) = overrides.slack_api_base_url {
            self.slack.api_base_url = api_base_url;
        }
        if let Some(notion_token) = overrides.notion_token {
            self.notion.token = secret_value(notion_token);
        }
        if let Some(database_id) = overrides.notion_database_id {
            self.notion.database_id = Some(database_id);
        }
        if let Some(api_base_url) = overrides.notion_api_base_url {
            self.notion.api_base_url = api_base_url;
        }
        if let Some(default_timezone) = overrides.default_timezone {
            self.agency.default_timezone = default_timezone;
        }
        if let Some(report_channel) = overrides.report_channel {
            self.agency.report_channel = Some(report_channel);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_slack(&self.slack)?;
        validate_notion(&self.notion)?;
        validate_agency(&self.agency)?;
        validate_http(&self.http)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_slack(slack: &SlackConfig) -> Result<(), ConfigError> {
    if let Some(bot_token) = slack.bot_token() {
        if !bot_token.starts_with("xoxb-") {
            let hint = if bot_token.starts_with("xapp-") {
                " (hint: you may have used the app-level token instead of the bot token)"
            } else {
                ""
            };
            return Err(ConfigError::Validation(format!(
                "slack.bot_token must start with `xoxb-`{hint}. Get it from https://api.slack.com/apps > Your App > OAuth & Permissions"
            )));
        }
    }

    validate_url("slack.api_base_url", &slack.api_base_url)
}

fn validate_notion(notion: &NotionConfig) -> Result<(), ConfigError> {
    validate_url("notion.api_base_url", &notion.api_base_url)?;
    validate_url("notion.page_base_url", &notion.page_base_url)?;

    if notion.api_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "notion.api_version must not be empty (for example `2022-06-28`)".to_string(),
        ));
    }

    if notion.token().is_some() && notion.database_id().is_none() {
        return Err(ConfigError::Validation(
            "notion.database_id is required when notion.token is set. Copy it from the database URL in Notion".to_string(),
        ));
    }

    Ok(())
}

fn validate_agency(agency: &AgencyConfig) -> Result<(), ConfigError> {
    if resolve_timezone(&agency.default_timezone).is_none() {
        return Err(ConfigError::Validation(format!(
            "agency.default_timezone `{}` is not a known IANA timezone",
            agency.default_timezone
        )));
    }

    if let Some(channel) = &agency.report_channel {
        if channel.trim().is_empty() {
            return Err(ConfigError::Validation(
                "agency.report_channel must not be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_http(http: &HttpConfig) -> Result<(), ConfigError> {
    if http.timeout_secs == 0 || http.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "http.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_url(key: &str, value: &str) -> Result<(), ConfigError> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigError::Validation(format!("{key} must start with http:// or https://")));
    }

    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    slack: Option<SlackPatch>,
    notion: Option<NotionPatch>,
    agency: Option<AgencyPatch>,
    http: Option<HttpPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    bot_token: Option<String>,
    api_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NotionPatch {
    token: Option<String>,
    database_id: Option<String>,
    api_base_url: Option<String>,
    page_base_url: Option<String>,
    api_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AgencyPatch {
    default_timezone: Option<String>,
    report_channel: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct HttpPatch {
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
