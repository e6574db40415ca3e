//! Slack Integration - report notifications over the Web API
//!
//! This crate provides the Slack side of the agency:
//! - **Client** (`client`) - `SlackApi` trait and the `chat.postMessage` client behind it
//! - **Block Kit** (`blocks`) - typed message builders for report announcements
//!
//! # Flow
//!
//! ```text
//! Tool input → PostMessageRequest → SlackApi::post_message → PostedMessage
//!                    ↑                          ↓
//!        MessageBuilder blocks        SlackApiError::describe()
//! ```
//!
//! The bot token needs the `chat:write` scope and the bot must be a member
//! of the target channel.

pub mod blocks;
pub mod client;

pub use blocks::{report_published_message, MessageBuilder, MessageTemplate};
pub use client::{PostMessageRequest, PostedMessage, SlackApi, SlackApiError, SlackWebClient};
