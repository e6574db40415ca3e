use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::blocks::NotionBlock;
use crate::client::{CreatePageRequest, NotionApi, NotionApiError};

/// Notion accepts at most this many children per create or append call.
pub const MAX_CHILDREN_PER_REQUEST: usize = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct PageDraft {
    pub database_id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub children: Vec<NotionBlock>,
}

impl PageDraft {
    /// `title` carries the page title. `Tags` is only sent when there are tags,
    /// since databases without that property reject it.
    pub fn properties(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(
            "title".to_string(),
            json!({"title": [{"type": "text", "text": {"content": self.title}}]}),
        );
        if !self.tags.is_empty() {
            let options: Vec<Value> = self.tags.iter().map(|tag| json!({"name": tag})).collect();
            properties.insert("Tags".to_string(), json!({"multi_select": options}));
        }
        Value::Object(properties)
    }

    fn create_request(&self, children: Vec<NotionBlock>) -> CreatePageRequest {
        CreatePageRequest {
            parent: json!({"database_id": self.database_id}),
            properties: self.properties(),
            children,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedPage {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Create(NotionApiError),
    /// The page exists but holds only the blocks sent before `source`.
    #[error("page {} was created but appending its remaining blocks failed: {source}", .page.url)]
    Incomplete { page: PublishedPage, written_blocks: usize, source: NotionApiError },
}

impl PublishError {
    /// The page left behind in the database, if one was created.
    pub fn page(&self) -> Option<&PublishedPage> {
        match self {
            Self::Create(_) => None,
            Self::Incomplete { page, .. } => Some(page),
        }
    }

    pub fn api_error(&self) -> &NotionApiError {
        match self {
            Self::Create(source) | Self::Incomplete { source, .. } => source,
        }
    }
}

pub async fn publish(
    api: &dyn NotionApi,
    draft: &PageDraft,
    page_base_url: &str,
) -> Result<PublishedPage, PublishError> {
    let mut batches = draft.children.chunks(MAX_CHILDREN_PER_REQUEST);
    let first = batches.next().map(<[NotionBlock]>::to_vec).unwrap_or_default();

    let mut written_blocks = first.len();
    let created =
        api.create_page(&draft.create_request(first)).await.map_err(PublishError::Create)?;
    let page = PublishedPage { url: page_url(page_base_url, &created.id), id: created.id };

    for batch in batches {
        if let Err(source) = api.append_children(&page.id, batch).await {
            warn!(
                event_name = "notion.page.incomplete",
                page_id = %page.id,
                written_blocks,
                total_blocks = draft.children.len(),
                error = %source,
                "notion page created but not fully written"
            );
            return Err(PublishError::Incomplete { page, written_blocks, source });
        }
        written_blocks += batch.len();
    }

    info!(
        event_name = "notion.page.published",
        page_id = %page.id,
        blocks = draft.children.len(),
        "published notion page"
    );
    Ok(page)
}

/// `https://notion.so/` plus the page id with its dashes removed.
pub fn page_url(base: &str, page_id: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), page_id.replace('-', ""))
}

/// Workspace-scoped link. Falls back to the direct link when the workspace
/// is unknown.
pub fn sharing_url(base: &str, workspace_id: Option<&str>, page_id: &str) -> String {
    match workspace_id.filter(|workspace| !workspace.trim().is_empty()) {
        Some(workspace) => {
            format!("{}/{}/{}", base.trim_end_matches('/'), workspace, page_id.replace('-', ""))
        }
        None => page_url(base, page_id),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::{page_url, publish, sharing_url, PageDraft, PublishError, MAX_CHILDREN_PER_REQUEST};
    use crate::blocks::NotionBlock;
    use crate::client::{CreatePageRequest, CreatedPage, DatabaseInfo, NotionApi, NotionApiError};

    #[derive(Default)]
    struct RecordingApi {
        created: Mutex<Vec<CreatePageRequest>>,
        appended: Mutex<Vec<(String, usize)>>,
        reject_append: bool,
    }

    #[async_trait]
    impl NotionApi for RecordingApi {
        async fn create_page(
            &self,
            request: &CreatePageRequest,
        ) -> Result<CreatedPage, NotionApiError> {
            self.created.lock().expect("lock").push(request.clone());
            Ok(CreatedPage { id: "1a2b-3c4d".to_string(), url: None })
        }

        async fn append_children(
            &self,
            block_id: &str,
            children: &[NotionBlock],
        ) -> Result<(), NotionApiError> {
            if self.reject_append {
                return Err(NotionApiError::Api {
                    status: 429,
                    code: "rate_limited".to_string(),
                    message: "slow down".to_string(),
                });
            }
            self.appended.lock().expect("lock").push((block_id.to_string(), children.len()));
            Ok(())
        }

        async fn retrieve_database(&self, _: &str) -> Result<DatabaseInfo, NotionApiError> {
            Ok(DatabaseInfo { title: "Reports".to_string(), workspace_id: None })
        }
    }

    fn draft(blocks: usize, tags: Vec<String>) -> PageDraft {
        PageDraft {
            database_id: "db1".to_string(),
            title: "Q1".to_string(),
            tags,
            children: (0..blocks).map(|index| NotionBlock::paragraph(&index.to_string())).collect(),
        }
    }

    #[test]
    fn page_url_strips_dashes() {
        assert_eq!(page_url("https://notion.so", "ab-cd-ef"), "https://notion.so/abcdef");
        assert_eq!(page_url("https://notion.so/", "abcdef"), "https://notion.so/abcdef");
    }

    #[test]
    fn sharing_url_scopes_to_workspace() {
        assert_eq!(
            sharing_url("https://notion.so", Some("ws-1"), "ab-cd"),
            "https://notion.so/ws-1/abcd"
        );
        assert_eq!(sharing_url("https://notion.so", None, "ab-cd"), "https://notion.so/abcd");
    }

    #[test]
    fn tags_property_is_omitted_when_empty() {
        let without = draft(0, vec![]).properties();
        assert!(without.get("Tags").is_none());
        assert_eq!(without["title"]["title"][0]["text"]["content"], "Q1");

        let with = draft(0, vec!["sales".to_string(), "q1".to_string()]).properties();
        assert_eq!(with["Tags"], json!({"multi_select": [{"name": "sales"}, {"name": "q1"}]}));
    }

    #[tokio::test]
    async fn publish_appends_blocks_past_the_create_limit() {
        let api = RecordingApi::default();
        let draft = draft(MAX_CHILDREN_PER_REQUEST * 2 + 1, vec![]);
        let published = publish(&api, &draft, "https://notion.so").await.expect("published");

        assert_eq!(published.url, "https://notion.so/1a2b3c4d");
        let created = api.created.lock().expect("lock");
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].children.len(), MAX_CHILDREN_PER_REQUEST);
        assert_eq!(
            *api.appended.lock().expect("lock"),
            vec![("1a2b-3c4d".to_string(), MAX_CHILDREN_PER_REQUEST), ("1a2b-3c4d".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn publish_small_page_is_a_single_call() {
        let api = RecordingApi::default();
        publish(&api, &draft(3, vec![]), "https://notion.so").await.expect("published");

        assert!(api.appended.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn failed_append_still_reports_the_created_page() {
        let api = RecordingApi { reject_append: true, ..RecordingApi::default() };
        let draft = draft(MAX_CHILDREN_PER_REQUEST + 5, vec![]);

        let error = publish(&api, &draft, "https://notion.so").await.expect_err("append fails");

        assert_eq!(api.created.lock().expect("lock").len(), 1);
        match &error {
            PublishError::Incomplete { page, written_blocks, source } => {
                assert_eq!(page.id, "1a2b-3c4d");
                assert_eq!(page.url, "https://notion.so/1a2b3c4d");
                assert_eq!(*written_blocks, MAX_CHILDREN_PER_REQUEST);
                assert!(matches!(source, NotionApiError::Api { status: 429, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(error.to_string().contains("https://notion.so/1a2b3c4d"));
    }
}
