//! # Block Content
//!
//! Type-tagged payload of a block. Each variant carries exactly the fields
//! its block type needs; rich text fields hold HTML fragments produced by
//! the rich-text editor and are treated as opaque strings here.

use crate::block::BlockType;
use crate::markers::ListStyle;
use crate::text;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockContent {
    Heading {
        heading: String,
    },
    Subheading {
        subheading: String,
    },
    Paragraph {
        body: String,
    },
    ParagraphWithHeading {
        heading: String,
        body: String,
    },
    ParagraphWithSubheading {
        subheading: String,
        body: String,
    },
    #[serde(rename_all = "camelCase")]
    Columns {
        column_one_content: String,
        column_two_content: String,
    },
    Table(TableContent),
    NumberedList(ListContent),
    BulletList(ListContent),
    ImageText(ImageTextContent),
    Image(ImageContent),
    Tabs {
        tabs: Vec<Tab>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableContent {
    pub rows: Vec<Vec<String>>,
    #[serde(default)]
    pub has_header_row: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTextContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image_position: ImagePosition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Numbered or bullet list payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContent {
    pub items: Vec<ListItem>,

    #[serde(default = "default_start_number")]
    pub start_number: u32,

    #[serde(default)]
    pub list_style: ListStyle,

    #[serde(default = "default_sub_style")]
    pub sub_style: ListStyle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_color: Option<String>,
}

fn default_start_number() -> u32 {
    1
}

fn default_sub_style() -> ListStyle {
    ListStyle::LowerAlpha
}

impl Default for ListContent {
    fn default() -> Self {
        Self {
            items: vec![ListItem::new("")],
            start_number: default_start_number(),
            list_style: ListStyle::default(),
            sub_style: default_sub_style(),
            number_color: None,
        }
    }
}

/// One entry of a list. Children are at most one level deep, and an empty
/// child list is always `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub body: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ListItem>>,
}

impl ListItem {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            children: None,
        }
    }

    /// Item with sub-items. Sub-items lose their own children (depth cap).
    pub fn with_children(body: impl Into<String>, children: Vec<ListItem>) -> Self {
        let children: Vec<ListItem> = children
            .into_iter()
            .map(|child| ListItem::new(child.body))
            .collect();
        Self {
            body: body.into(),
            children: if children.is_empty() { None } else { Some(children) },
        }
    }

    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|c| !c.is_empty())
    }

    pub fn child_count(&self) -> usize {
        self.children.as_ref().map_or(0, Vec::len)
    }
}

impl BlockContent {
    /// Default payload for a freshly inserted block
    pub fn default_for(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Heading => BlockContent::Heading {
                heading: String::new(),
            },
            BlockType::Subheading => BlockContent::Subheading {
                subheading: String::new(),
            },
            BlockType::Paragraph => BlockContent::Paragraph {
                body: String::new(),
            },
            BlockType::ParagraphWithHeading => BlockContent::ParagraphWithHeading {
                heading: String::new(),
                body: String::new(),
            },
            BlockType::ParagraphWithSubheading => BlockContent::ParagraphWithSubheading {
                subheading: String::new(),
                body: String::new(),
            },
            BlockType::Columns => BlockContent::Columns {
                column_one_content: String::new(),
                column_two_content: String::new(),
            },
            BlockType::Table => BlockContent::Table(TableContent {
                rows: vec![vec![String::new(); 2]; 2],
                has_header_row: false,
            }),
            BlockType::NumberedList => BlockContent::NumberedList(ListContent::default()),
            BlockType::BulletList => BlockContent::BulletList(ListContent::default()),
            BlockType::ImageText => BlockContent::ImageText(ImageTextContent::default()),
            BlockType::Image => BlockContent::Image(ImageContent::default()),
            BlockType::Tabs => BlockContent::Tabs {
                tabs: vec![Tab::default()],
            },
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContent::Heading { .. } => BlockType::Heading,
            BlockContent::Subheading { .. } => BlockType::Subheading,
            BlockContent::Paragraph { .. } => BlockType::Paragraph,
            BlockContent::ParagraphWithHeading { .. } => BlockType::ParagraphWithHeading,
            BlockContent::ParagraphWithSubheading { .. } => BlockType::ParagraphWithSubheading,
            BlockContent::Columns { .. } => BlockType::Columns,
            BlockContent::Table(_) => BlockType::Table,
            BlockContent::NumberedList(_) => BlockType::NumberedList,
            BlockContent::BulletList(_) => BlockType::BulletList,
            BlockContent::ImageText(_) => BlockType::ImageText,
            BlockContent::Image(_) => BlockType::Image,
            BlockContent::Tabs { .. } => BlockType::Tabs,
        }
    }

    pub fn as_list(&self) -> Option<&ListContent> {
        match self {
            BlockContent::NumberedList(list) | BlockContent::BulletList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut ListContent> {
        match self {
            BlockContent::NumberedList(list) | BlockContent::BulletList(list) => Some(list),
            _ => None,
        }
    }

    /// Text fragments in reading order
    fn fragments(&self) -> Vec<&str> {
        match self {
            BlockContent::Heading { heading } => vec![heading.as_str()],
            BlockContent::Subheading { subheading } => vec![subheading.as_str()],
            BlockContent::Paragraph { body } => vec![body.as_str()],
            BlockContent::ParagraphWithHeading { heading, body } => {
                vec![heading.as_str(), body.as_str()]
            }
            BlockContent::ParagraphWithSubheading { subheading, body } => {
                vec![subheading.as_str(), body.as_str()]
            }
            BlockContent::Columns {
                column_one_content,
                column_two_content,
            } => vec![column_one_content.as_str(), column_two_content.as_str()],
            BlockContent::Table(table) => table
                .rows
                .iter()
                .flat_map(|row| row.iter().map(String::as_str))
                .collect(),
            BlockContent::NumberedList(list) | BlockContent::BulletList(list) => {
                let mut out = Vec::new();
                for item in &list.items {
                    out.push(item.body.as_str());
                    for child in item.children.iter().flatten() {
                        out.push(child.body.as_str());
                    }
                }
                out
            }
            BlockContent::ImageText(image_text) => {
                vec![image_text.alt.as_str(), image_text.body.as_str()]
            }
            BlockContent::Image(image) => vec![image.alt.as_str(), image.caption.as_str()],
            BlockContent::Tabs { tabs } => tabs
                .iter()
                .flat_map(|tab| [tab.title.as_str(), tab.body.as_str()])
                .collect(),
        }
    }

    /// Extractable text: markup stripped, whitespace collapsed
    pub fn plain_text(&self) -> String {
        let parts: Vec<String> = self
            .fragments()
            .into_iter()
            .map(text::strip_markup)
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(" ")
    }
}
