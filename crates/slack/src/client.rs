use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SlackApiError {
    #[error("slack request failed: {0}")]
    Transport(String),
    #[error("slack rejected the request: {code}")]
    Api { code: String },
    #[error("slack rate limited the request (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("failed to decode slack response: {0}")]
    Decode(String),
}

impl SlackApiError {
    /// Slack's machine error code, when the API returned one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code } => Some(code),
            Self::RateLimited { .. } => Some("ratelimited"),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Operator-facing explanation of the failure.
    pub fn describe(&self) -> String {
        match self.code() {
            Some("channel_not_found") => "Channel not found. Please check the channel ID.".to_string(),
            Some("not_in_channel") => {
                "Bot is not in the channel. Please add the bot to the channel.".to_string()
            }
            Some("invalid_auth" | "not_authed" | "account_inactive" | "token_revoked") => {
                "Slack rejected the bot token. Please check SLACK_BOT_TOKEN.".to_string()
            }
            Some("ratelimited") => match self {
                Self::RateLimited { retry_after_secs: Some(secs) } => {
                    format!("Slack rate limit reached. Retry after {secs} seconds.")
                }
                _ => "Slack rate limit reached. Please retry later.".to_string(),
            },
            _ => format!("Slack API Error: {self}"),
        }
    }
}

/// Body of `chat.postMessage`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostMessageRequest {
    pub channel: String,
    pub text: String,
    pub mrkdwn: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Value>,
}

impl PostMessageRequest {
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self { channel: channel.into(), text: text.into(), mrkdwn: true, thread_ts: None, blocks: None }
    }

    pub fn in_thread(mut self, thread_ts: Option<String>) -> Self {
        self.thread_ts = thread_ts.filter(|ts| !ts.trim().is_empty());
        self
    }

    pub fn with_blocks(mut self, blocks: Option<Value>) -> Self {
        self.blocks = blocks.filter(|blocks| !blocks.is_null());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMessage {
    pub ok: bool,
    pub ts: String,
    pub channel: String,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
pub trait SlackApi: Send + Sync {
    async fn post_message(&self, request: &PostMessageRequest) -> Result<PostedMessage, SlackApiError>;
}

#[derive(Clone)]
pub struct SlackWebClient {
    http: Client,
    bot_token: SecretString,
    api_base_url: String,
}

impl SlackWebClient {
    pub fn new(
        bot_token: SecretString,
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SlackApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| SlackApiError::Transport(error.to_string()))?;
        Ok(Self { http, bot_token, api_base_url: api_base_url.into().trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl SlackApi for SlackWebClient {
    async fn post_message(&self, request: &PostMessageRequest) -> Result<PostedMessage, SlackApiError> {
        let url = format!("{}/chat.postMessage", self.api_base_url);
        debug!(
            event_name = "slack.message.sending",
            channel = %request.channel,
            threaded = request.thread_ts.is_some(),
            "sending slack message"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.bot_token.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|error| {
                warn!(event_name = "slack.message.transport_failed", error = %error);
                SlackApiError::Transport(error.to_string())
            })?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok());
            warn!(event_name = "slack.message.rate_limited", ?retry_after_secs);
            return Err(SlackApiError::RateLimited { retry_after_secs });
        }

        let status = response.status();
        let text =
            response.text().await.map_err(|error| SlackApiError::Transport(error.to_string()))?;
        let body: PostMessageResponse = serde_json::from_str(&text).map_err(|error| {
            SlackApiError::Decode(format!("{error} (http status {})", status.as_u16()))
        })?;

        if !body.ok {
            let code = body.error.unwrap_or_else(|| "unknown_error".to_string());
            warn!(event_name = "slack.message.rejected", channel = %request.channel, code = %code);
            return Err(SlackApiError::Api { code });
        }

        let posted = PostedMessage {
            ok: true,
            ts: body.ts.unwrap_or_default(),
            channel: body.channel.unwrap_or_else(|| request.channel.clone()),
        };
        debug!(event_name = "slack.message.sent", channel = %posted.channel, ts = %posted.ts);
        Ok(posted)
    }
}
