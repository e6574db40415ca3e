//! Notion Integration - rich report pages
//!
//! This crate provides the Notion side of report publishing:
//! - **Blocks** (`blocks`) - typed Notion block descriptors and the report renderer
//! - **Client** (`client`) - `NotionApi` trait plus the HTTP client behind it
//! - **Pages** (`page`) - page drafts, publishing past the 100-block limit, page links
//!
//! # Flow
//!
//! ```text
//! ReportContent → report_blocks() → PageDraft → publish() → NotionApi::create_page
//!                                                   ↓
//!                                      page_url() ← CreatedPage.id
//! ```

pub mod blocks;
pub mod client;
pub mod page;

pub use blocks::{report_blocks, DocumentBuilder, NotionBlock, RichText};
pub use client::{CreatePageRequest, CreatedPage, DatabaseInfo, NotionApi, NotionApiError, NotionClient};
pub use page::{page_url, publish, sharing_url, PageDraft, PublishError, PublishedPage};
