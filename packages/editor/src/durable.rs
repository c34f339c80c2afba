//! # Durable Representation
//!
//! How a block is stored by the persistence service. The row carries the
//! id, page, type and rank; everything else lives in `content_json`, a
//! tagged JSON object:
//!
//! ```text
//! { blockType, content, metadata, style, animation, animationDuration, layout }
//! ```
//!
//! `content` is a plain string for heading, subheading and paragraph
//! blocks and a type-specific object for everything else.

use crate::block::{Block, BlockId, BlockStyle, BlockType};
use crate::content::{BlockContent, ImageContent, ImageTextContent, ListContent, TableContent, Tab};
use crate::lists;
use crate::metadata::Metadata;
use crate::EditorError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A block row as returned by `load_blocks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlock {
    pub id: BlockId,
    pub page_id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub order_index: f64,
    pub content_json: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_ai_metadata: Option<Value>,
}

/// Upsert request. Omitting `id` inserts and the service assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BlockId>,
    pub page_id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub order_index: f64,
    pub content_json: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurableContent {
    pub block_type: BlockType,
    pub content: Value,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub style: serde_json::Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub layout: Value,
}

#[derive(Deserialize)]
struct HeadingBody {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    body: String,
}

#[derive(Deserialize)]
struct SubheadingBody {
    #[serde(default)]
    subheading: String,
    #[serde(default)]
    body: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TwoColumns {
    #[serde(default)]
    column_one: String,
    #[serde(default)]
    column_two: String,
}

#[derive(Deserialize)]
struct TabList {
    #[serde(default)]
    tabs: Vec<Tab>,
}

impl BlockContent {
    /// The `content` member of the durable JSON
    pub fn to_durable(&self) -> Value {
        match self {
            BlockContent::Heading { heading } => Value::String(heading.clone()),
            BlockContent::Subheading { subheading } => Value::String(subheading.clone()),
            BlockContent::Paragraph { body } => Value::String(body.clone()),
            BlockContent::ParagraphWithHeading { heading, body } => {
                json!({ "heading": heading, "body": body })
            }
            BlockContent::ParagraphWithSubheading { subheading, body } => {
                json!({ "subheading": subheading, "body": body })
            }
            BlockContent::Columns {
                column_one_content,
                column_two_content,
            } => json!({ "columnOne": column_one_content, "columnTwo": column_two_content }),
            BlockContent::Table(table) => to_value(table),
            BlockContent::NumberedList(list) | BlockContent::BulletList(list) => to_value(list),
            BlockContent::ImageText(image_text) => to_value(image_text),
            BlockContent::Image(image) => to_value(image),
            BlockContent::Tabs { tabs } => json!({ "tabs": tabs }),
        }
    }

    /// Rebuild content of `block_type` from its durable `content` member
    pub fn from_durable(block_type: BlockType, content: Value) -> Result<Self, EditorError> {
        let parsed = match block_type {
            BlockType::Heading => BlockContent::Heading {
                heading: text_content(block_type, content)?,
            },
            BlockType::Subheading => BlockContent::Subheading {
                subheading: text_content(block_type, content)?,
            },
            BlockType::Paragraph => BlockContent::Paragraph {
                body: text_content(block_type, content)?,
            },
            BlockType::ParagraphWithHeading => {
                let HeadingBody { heading, body } = serde_json::from_value(content)?;
                BlockContent::ParagraphWithHeading { heading, body }
            }
            BlockType::ParagraphWithSubheading => {
                let SubheadingBody { subheading, body } = serde_json::from_value(content)?;
                BlockContent::ParagraphWithSubheading { subheading, body }
            }
            BlockType::Columns => {
                let TwoColumns {
                    column_one,
                    column_two,
                } = serde_json::from_value(content)?;
                BlockContent::Columns {
                    column_one_content: column_one,
                    column_two_content: column_two,
                }
            }
            BlockType::Table => BlockContent::Table(serde_json::from_value::<TableContent>(content)?),
            BlockType::NumberedList => BlockContent::NumberedList(list_content(content)?),
            BlockType::BulletList => BlockContent::BulletList(list_content(content)?),
            BlockType::ImageText => {
                BlockContent::ImageText(serde_json::from_value::<ImageTextContent>(content)?)
            }
            BlockType::Image => BlockContent::Image(serde_json::from_value::<ImageContent>(content)?),
            BlockType::Tabs => {
                let TabList { tabs } = serde_json::from_value(content)?;
                BlockContent::Tabs { tabs }
            }
        };
        Ok(parsed)
    }
}

fn to_value<T: Serialize>(value: &T) -> Value {
    // Plain data structs with string keys always serialize.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn text_content(block_type: BlockType, content: Value) -> Result<String, EditorError> {
    match content {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Err(EditorError::Durable(format!(
            "{} content must be a string, got {}",
            block_type, other
        ))),
    }
}

fn list_content(content: Value) -> Result<ListContent, EditorError> {
    let mut list: ListContent = serde_json::from_value(content)?;
    lists::normalize(&mut list.items);
    Ok(list)
}

impl Block {
    pub fn to_durable(&self) -> DurableContent {
        DurableContent {
            block_type: self.block_type(),
            content: self.content.to_durable(),
            metadata: self.metadata.clone(),
            style: self.style.properties.clone(),
            animation: self.style.animation.clone(),
            animation_duration: self.style.animation_duration,
            layout: self.layout.clone(),
        }
    }

    /// Upsert request for this block. Unsaved blocks omit their local id.
    pub fn to_upsert(&self, page_id: &str) -> Result<UpsertBlock, EditorError> {
        Ok(UpsertBlock {
            id: self.saved_to_db.then(|| self.id.clone()),
            page_id: page_id.to_string(),
            block_type: self.block_type(),
            order_index: self.order_index,
            content_json: serde_json::to_string(&self.to_durable())?,
        })
    }

    /// Rebuild a block from its stored row. The result is marked saved.
    pub fn from_stored(stored: StoredBlock) -> Result<Self, EditorError> {
        let durable: DurableContent = serde_json::from_str(&stored.content_json)?;
        if durable.block_type != stored.block_type {
            return Err(EditorError::Durable(format!(
                "row type {} does not match content type {}",
                stored.block_type, durable.block_type
            )));
        }

        Ok(Block {
            id: stored.id,
            order_index: stored.order_index,
            style: BlockStyle {
                properties: durable.style,
                animation: durable.animation,
                animation_duration: durable.animation_duration,
            },
            layout: durable.layout,
            content: BlockContent::from_durable(durable.block_type, durable.content)?,
            metadata: durable.metadata,
            raw_ai_metadata: stored.raw_ai_metadata,
            saved_to_db: true,
        })
    }
}
