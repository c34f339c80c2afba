//! # Blocks
//!
//! A block is one content unit of a lesson page: a heading, a paragraph,
//! a table, a nested list and so on. Blocks are ordered by `order_index`,
//! which only the store module writes after creation.

use crate::content::BlockContent;
use crate::lists;
use crate::metadata::Metadata;
use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque block identifier
pub type BlockId = String;

/// Closed set of block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    Heading,
    Subheading,
    Paragraph,
    ParagraphWithHeading,
    ParagraphWithSubheading,
    Columns,
    Table,
    NumberedList,
    BulletList,
    ImageText,
    Image,
    Tabs,
}

impl BlockType {
    pub const ALL: [BlockType; 12] = [
        BlockType::Heading,
        BlockType::Subheading,
        BlockType::Paragraph,
        BlockType::ParagraphWithHeading,
        BlockType::ParagraphWithSubheading,
        BlockType::Columns,
        BlockType::Table,
        BlockType::NumberedList,
        BlockType::BulletList,
        BlockType::ImageText,
        BlockType::Image,
        BlockType::Tabs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Heading => "heading",
            BlockType::Subheading => "subheading",
            BlockType::Paragraph => "paragraph",
            BlockType::ParagraphWithHeading => "paragraph-with-heading",
            BlockType::ParagraphWithSubheading => "paragraph-with-subheading",
            BlockType::Columns => "columns",
            BlockType::Table => "table",
            BlockType::NumberedList => "numbered-list",
            BlockType::BulletList => "bullet-list",
            BlockType::ImageText => "image-text",
            BlockType::Image => "image",
            BlockType::Tabs => "tabs",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BlockType::NumberedList | BlockType::BulletList)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ModelError::UnknownBlockType(s.to_string()))
    }
}

/// Presentation attributes carried opaquely through every block operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStyle {
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,

    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_duration: Option<f64>,
}

/// One content unit of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Stable across edits; replaced only when first persisted
    pub id: BlockId,

    /// Authoritative ordering key (0..n-1 between operations)
    pub(crate) order_index: f64,

    pub style: BlockStyle,

    #[serde(default)]
    pub layout: serde_json::Value,

    pub content: BlockContent,

    #[serde(default)]
    pub metadata: Metadata,

    /// Last raw AI response, kept for display and audit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_ai_metadata: Option<serde_json::Value>,

    /// Whether the block has been durably persisted at least once
    #[serde(default)]
    pub saved_to_db: bool,
}

impl Block {
    /// Create an unsaved block with the default content for `block_type`
    pub fn new(block_type: BlockType) -> Self {
        Self::with_content(BlockContent::default_for(block_type))
    }

    /// Create an unsaved block around existing content
    pub fn with_content(content: BlockContent) -> Self {
        Self {
            id: new_block_id(),
            order_index: 0.0,
            style: BlockStyle::default(),
            layout: serde_json::Value::Null,
            content,
            metadata: Metadata::default(),
            raw_ai_metadata: None,
            saved_to_db: false,
        }
    }

    pub fn block_type(&self) -> BlockType {
        self.content.block_type()
    }

    pub fn order_index(&self) -> f64 {
        self.order_index
    }

    /// Position implied by the order index (valid between operations)
    pub fn position(&self) -> usize {
        self.order_index.max(0.0) as usize
    }

    /// All text in the block with markup removed
    pub fn plain_text(&self) -> String {
        self.content.plain_text()
    }

    pub fn has_text(&self) -> bool {
        !self.plain_text().is_empty()
    }

    /// Deep copy under a fresh id. The copy has never been persisted.
    pub fn duplicate(&self) -> Self {
        Self {
            id: new_block_id(),
            saved_to_db: false,
            ..self.clone()
        }
    }

    /// Replace the content payload; the block type may not change
    pub fn set_content(&mut self, content: BlockContent) -> Result<(), ModelError> {
        if content.block_type() != self.block_type() {
            return Err(ModelError::ContentTypeMismatch {
                expected: self.block_type().to_string(),
                found: content.block_type().to_string(),
            });
        }
        self.content = content;
        if let Some(list) = self.content.as_list_mut() {
            lists::normalize(&mut list.items);
        }
        Ok(())
    }
}

pub(crate) fn new_block_id() -> BlockId {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_type_round_trips_through_str() {
        for t in BlockType::ALL {
            assert_eq!(t.as_str().parse::<BlockType>().unwrap(), t);
        }
        assert!("quote".parse::<BlockType>().is_err());
    }

    #[test]
    fn test_block_type_serializes_kebab_case() {
        let json = serde_json::to_string(&BlockType::ParagraphWithSubheading).unwrap();
        assert_eq!(json, "\"paragraph-with-subheading\"");
    }

    #[test]
    fn test_new_block_is_unsaved_with_default_content() {
        let block = Block::new(BlockType::NumberedList);
        assert!(!block.saved_to_db);
        assert_eq!(block.block_type(), BlockType::NumberedList);
        assert!(!block.has_text());
    }

    #[test]
    fn test_duplicate_gets_new_id_and_is_unsaved() {
        let mut block = Block::new(BlockType::Paragraph);
        block.saved_to_db = true;
        block.style.animation = Some("fade-in".to_string());

        let copy = block.duplicate();
        assert_ne!(copy.id, block.id);
        assert!(!copy.saved_to_db);
        assert_eq!(copy.style, block.style);
        assert_eq!(copy.content, block.content);
    }

    #[test]
    fn test_set_content_normalizes_list_items() {
        use crate::content::{ListContent, ListItem};

        let mut block = Block::new(BlockType::BulletList);
        let deep = ListItem {
            body: "a".to_string(),
            children: Some(vec![ListItem {
                body: "b".to_string(),
                children: Some(vec![ListItem::new("c")]),
            }]),
        };
        let empty_children = ListItem {
            body: "d".to_string(),
            children: Some(vec![]),
        };
        block
            .set_content(BlockContent::BulletList(ListContent {
                items: vec![deep, empty_children],
                ..ListContent::default()
            }))
            .unwrap();

        let items = &block.content.as_list().unwrap().items;
        assert!(lists::is_well_formed(items));
        assert_eq!(items[0].children.as_ref().unwrap()[0].children, None);
        assert_eq!(items[1].children, None);
    }

    #[test]
    fn test_set_content_rejects_type_change() {
        let mut block = Block::new(BlockType::Heading);
        let result = block.set_content(BlockContent::default_for(BlockType::Table));
        assert!(matches!(result, Err(ModelError::ContentTypeMismatch { .. })));
    }
}
