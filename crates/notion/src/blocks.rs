use retail_core::report::content::{ReportContent, SectionLine};
use serde::Serialize;

/// Notion rejects rich text runs longer than this many characters.
pub const MAX_TEXT_CHARS: usize = 2000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichText {
    Text { text: TextContent },
}

impl RichText {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text { text: TextContent { content: content.into() } }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Text { text } => &text.content,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RichTextBody {
    pub rich_text: Vec<RichText>,
}

impl RichTextBody {
    /// Splits long text into consecutive runs that each fit the API limit.
    pub fn from_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Self { rich_text: vec![RichText::text("")] };
        }

        let rich_text = chars
            .chunks(MAX_TEXT_CHARS)
            .map(|chunk| RichText::text(chunk.iter().collect::<String>()))
            .collect();
        Self { rich_text }
    }

    pub fn plain_text(&self) -> String {
        self.rich_text.iter().map(RichText::content).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum BlockBody {
    #[serde(rename = "heading_1")]
    Heading1 { heading_1: RichTextBody },
    #[serde(rename = "heading_2")]
    Heading2 { heading_2: RichTextBody },
    #[serde(rename = "paragraph")]
    Paragraph { paragraph: RichTextBody },
    #[serde(rename = "bulleted_list_item")]
    BulletedListItem { bulleted_list_item: RichTextBody },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NotionBlock {
    object: &'static str,
    #[serde(flatten)]
    pub body: BlockBody,
}

impl NotionBlock {
    fn new(body: BlockBody) -> Self {
        Self { object: "block", body }
    }

    pub fn heading_1(text: &str) -> Self {
        Self::new(BlockBody::Heading1 { heading_1: RichTextBody::from_text(text) })
    }

    pub fn heading_2(text: &str) -> Self {
        Self::new(BlockBody::Heading2 { heading_2: RichTextBody::from_text(text) })
    }

    pub fn paragraph(text: &str) -> Self {
        Self::new(BlockBody::Paragraph { paragraph: RichTextBody::from_text(text) })
    }

    pub fn bullet(text: &str) -> Self {
        Self::new(BlockBody::BulletedListItem { bulleted_list_item: RichTextBody::from_text(text) })
    }

    pub fn kind(&self) -> &'static str {
        match &self.body {
            BlockBody::Heading1 { .. } => "heading_1",
            BlockBody::Heading2 { .. } => "heading_2",
            BlockBody::Paragraph { .. } => "paragraph",
            BlockBody::BulletedListItem { .. } => "bulleted_list_item",
        }
    }

    pub fn plain_text(&self) -> String {
        match &self.body {
            BlockBody::Heading1 { heading_1: body }
            | BlockBody::Heading2 { heading_2: body }
            | BlockBody::Paragraph { paragraph: body }
            | BlockBody::BulletedListItem { bulleted_list_item: body } => body.plain_text(),
        }
    }
}

#[derive(Default)]
pub struct DocumentBuilder {
    blocks: Vec<NotionBlock>,
}

impl DocumentBuilder {
    pub fn heading_1(mut self, text: &str) -> Self {
        self.blocks.push(NotionBlock::heading_1(text));
        self
    }

    pub fn heading_2(mut self, text: &str) -> Self {
        self.blocks.push(NotionBlock::heading_2(text));
        self
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.blocks.push(NotionBlock::paragraph(text));
        self
    }

    pub fn lines(mut self, lines: Vec<SectionLine>) -> Self {
        for line in lines {
            let block = match line {
                SectionLine::Field { label, value } => {
                    NotionBlock::paragraph(&format!("{label}: {value}"))
                }
                SectionLine::Item(item) => NotionBlock::bullet(&item),
                SectionLine::Bare(value) => NotionBlock::paragraph(&value),
            };
            self.blocks.push(block);
        }
        self
    }

    pub fn build(self) -> Vec<NotionBlock> {
        self.blocks
    }
}

/// Title heading, generation stamp, then one sub-heading per section
/// followed by its entries.
pub fn report_blocks(content: &ReportContent) -> Vec<NotionBlock> {
    let mut builder = DocumentBuilder::default()
        .heading_1(&content.title)
        .paragraph(&format!("Generated: {}", content.generated_at));

    for section in &content.sections {
        builder = builder.heading_2(&section.heading()).lines(section.value.lines());
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use retail_core::clock::FixedClock;
    use retail_core::report::{OutputEncoding, ReportGenerator, ReportKind, ReportRequest};
    use serde_json::json;

    use super::{report_blocks, NotionBlock, RichTextBody, MAX_TEXT_CHARS};

    #[test]
    fn block_serializes_in_notion_shape() {
        let value = serde_json::to_value(NotionBlock::heading_1("Q1")).expect("serializable");

        assert_eq!(
            value,
            json!({
                "object": "block",
                "type": "heading_1",
                "heading_1": {"rich_text": [{"type": "text", "text": {"content": "Q1"}}]}
            })
        );
    }

    #[test]
    fn long_text_is_split_into_runs() {
        let text = "x".repeat(MAX_TEXT_CHARS * 2 + 5);
        let body = RichTextBody::from_text(&text);

        assert_eq!(body.rich_text.len(), 3);
        assert_eq!(body.plain_text(), text);
    }

    #[test]
    fn report_blocks_follow_section_rules() {
        let clock =
            FixedClock(Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).single().expect("valid instant"));
        let generator = ReportGenerator::new(Arc::new(clock));
        let content = generator.generate(&ReportRequest {
            kind: ReportKind::ExecutiveSummary,
            metrics: serde_json::from_value(json!({
                "total_sales": {"value": 150000, "highlight": "Best month"},
                "orders": 320
            }))
            .expect("metrics mapping"),
            title: "Monthly Sales".to_string(),
            encoding: OutputEncoding::StructuredDocument,
            tags: vec!["sales".to_string()],
        });

        let blocks = report_blocks(&content);
        let summary: Vec<(&str, String)> =
            blocks.iter().map(|block| (block.kind(), block.plain_text())).collect();

        assert_eq!(summary[0], ("heading_1", "Monthly Sales".to_string()));
        assert_eq!(summary[1], ("paragraph", format!("Generated: {}", content.generated_at)));
        assert_eq!(
            &summary[2..],
            &[
                ("heading_2", "Key Metrics".to_string()),
                ("paragraph", "Total Sales: 150000".to_string()),
                ("paragraph", "Orders: 320".to_string()),
                ("heading_2", "Highlights".to_string()),
                ("bulleted_list_item", "Best month".to_string()),
                ("heading_2", "Recommendations".to_string()),
            ]
        );
    }
}
