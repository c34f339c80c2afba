//! # Block Mutations
//!
//! Author actions on a page, expressed as data.
//!
//! ## Mutation Semantics
//!
//! ### Structural (insert, move, duplicate, remove)
//! - Routed through the store module, so the sequence is renormalized
//! - Moving past either end is a no-op, not an error
//! - Duplicates are deep copies under a new id, placed after the source
//!
//! ### Content edits
//! - Atomic replacement of a block's payload, style or layout
//! - Content may not change the block type
//! - Metadata edits made here are author edits and marked `human`
//!
//! ### List edits
//! - Indent/outdent and item add/remove on list blocks only
//! - Requests the nesting rules refuse are reported as no-ops

use crate::block::{Block, BlockId, BlockStyle};
use crate::content::{BlockContent, ListContent, ListItem};
use crate::lists;
use crate::metadata::MetadataField;
use crate::store::{self, Direction};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Insert a block at index (append when `None` or out of range)
    InsertBlock { index: Option<usize>, block: Block },

    /// Swap a block with its neighbour
    MoveBlock {
        block_id: BlockId,
        direction: Direction,
    },

    /// Deep copy placed right after the source
    DuplicateBlock { block_id: BlockId },

    /// Remove an unsaved block from the local sequence. Saved blocks go
    /// through `EditSession::delete_block` so the stored row goes first.
    RemoveBlock { block_id: BlockId },

    /// Replace the content payload (same block type)
    UpdateContent {
        block_id: BlockId,
        content: BlockContent,
    },

    SetStyle {
        block_id: BlockId,
        style: BlockStyle,
    },

    SetLayout { block_id: BlockId, layout: Value },

    /// Author edit of one metadata field
    SetMetadataField {
        block_id: BlockId,
        field: MetadataField,
        value: Value,
    },

    IndentListItem { block_id: BlockId, index: usize },

    OutdentListItem {
        block_id: BlockId,
        parent_index: usize,
        child_index: usize,
    },

    InsertListItem {
        block_id: BlockId,
        index: usize,
        body: String,
    },

    AddListChild {
        block_id: BlockId,
        parent_index: usize,
        body: String,
    },

    RemoveListItem { block_id: BlockId, index: usize },

    RemoveListChild {
        block_id: BlockId,
        parent_index: usize,
        child_index: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Block is not a list: {0}")]
    NotAList(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Block {0} is saved; delete it through the session so the stored row is removed")]
    SavedBlockRemoval(String),
}

impl From<crate::ModelError> for MutationError {
    fn from(e: crate::ModelError) -> Self {
        MutationError::InvalidValue(e.to_string())
    }
}

/// What a successfully validated mutation did
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Applied,
    /// A new block was created (insert or duplicate)
    Created(BlockId),
    /// Nothing changed (boundary move, refused list edit)
    Noop { reason: String },
}

impl Mutation {
    /// Id of the block this mutation targets
    pub fn block_id(&self) -> &str {
        match self {
            Mutation::InsertBlock { block, .. } => &block.id,
            Mutation::MoveBlock { block_id, .. }
            | Mutation::DuplicateBlock { block_id }
            | Mutation::RemoveBlock { block_id }
            | Mutation::UpdateContent { block_id, .. }
            | Mutation::SetStyle { block_id, .. }
            | Mutation::SetLayout { block_id, .. }
            | Mutation::SetMetadataField { block_id, .. }
            | Mutation::IndentListItem { block_id, .. }
            | Mutation::OutdentListItem { block_id, .. }
            | Mutation::InsertListItem { block_id, .. }
            | Mutation::AddListChild { block_id, .. }
            | Mutation::RemoveListItem { block_id, .. }
            | Mutation::RemoveListChild { block_id, .. } => block_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertBlock { .. } => "insert_block",
            Mutation::MoveBlock { .. } => "move_block",
            Mutation::DuplicateBlock { .. } => "duplicate_block",
            Mutation::RemoveBlock { .. } => "remove_block",
            Mutation::UpdateContent { .. } => "update_content",
            Mutation::SetStyle { .. } => "set_style",
            Mutation::SetLayout { .. } => "set_layout",
            Mutation::SetMetadataField { .. } => "set_metadata_field",
            Mutation::IndentListItem { .. } => "indent_list_item",
            Mutation::OutdentListItem { .. } => "outdent_list_item",
            Mutation::InsertListItem { .. } => "insert_list_item",
            Mutation::AddListChild { .. } => "add_list_child",
            Mutation::RemoveListItem { .. } => "remove_list_item",
            Mutation::RemoveListChild { .. } => "remove_list_child",
        }
    }

    /// Apply to the block sequence. On error `blocks` is left untouched.
    pub fn apply(&self, blocks: &mut Vec<Block>) -> Result<MutationOutcome, MutationError> {
        self.validate(blocks)?;
        self.apply_validated(blocks)
    }

    /// Apply without the checks in [`Mutation::validate`]. Callers have
    /// either validated already or removed the stored row themselves.
    pub(crate) fn apply_validated(
        &self,
        blocks: &mut Vec<Block>,
    ) -> Result<MutationOutcome, MutationError> {
        match self {
            Mutation::InsertBlock { index, block } => {
                *blocks = store::insert_at(blocks, *index, block.clone());
                Ok(MutationOutcome::Created(block.id.clone()))
            }

            Mutation::MoveBlock {
                block_id,
                direction,
            } => {
                let before = store::position_of(blocks, block_id);
                *blocks = store::move_adjacent(blocks, block_id, *direction)?;
                if store::position_of(blocks, block_id) == before {
                    Ok(MutationOutcome::Noop {
                        reason: format!("block already at the {:?} boundary", direction),
                    })
                } else {
                    Ok(MutationOutcome::Applied)
                }
            }

            Mutation::DuplicateBlock { block_id } => {
                let (result, copy_id) = store::duplicate(blocks, block_id)?;
                *blocks = result;
                Ok(MutationOutcome::Created(copy_id))
            }

            Mutation::RemoveBlock { block_id } => {
                *blocks = store::delete(blocks, block_id)?;
                Ok(MutationOutcome::Applied)
            }

            Mutation::UpdateContent { block_id, content } => {
                find_mut(blocks, block_id)?.set_content(content.clone())?;
                Ok(MutationOutcome::Applied)
            }

            Mutation::SetStyle { block_id, style } => {
                find_mut(blocks, block_id)?.style = style.clone();
                Ok(MutationOutcome::Applied)
            }

            Mutation::SetLayout { block_id, layout } => {
                find_mut(blocks, block_id)?.layout = layout.clone();
                Ok(MutationOutcome::Applied)
            }

            Mutation::SetMetadataField {
                block_id,
                field,
                value,
            } => {
                find_mut(blocks, block_id)?
                    .metadata
                    .set_by_author(*field, value)?;
                Ok(MutationOutcome::Applied)
            }

            Mutation::IndentListItem { block_id, index } => {
                edit_list(blocks, block_id, |list| lists::indent(&mut list.items, *index))
            }

            Mutation::OutdentListItem {
                block_id,
                parent_index,
                child_index,
            } => edit_list(blocks, block_id, |list| {
                lists::outdent(&mut list.items, *parent_index, *child_index)
            }),

            Mutation::InsertListItem {
                block_id,
                index,
                body,
            } => edit_list(blocks, block_id, |list| {
                lists::insert_item(&mut list.items, *index, ListItem::new(body.clone()))
            }),

            Mutation::AddListChild {
                block_id,
                parent_index,
                body,
            } => edit_list(blocks, block_id, |list| {
                lists::add_child(&mut list.items, *parent_index, ListItem::new(body.clone()))
            }),

            Mutation::RemoveListItem { block_id, index } => {
                edit_list(blocks, block_id, |list| lists::remove_item(&mut list.items, *index))
            }

            Mutation::RemoveListChild {
                block_id,
                parent_index,
                child_index,
            } => edit_list(blocks, block_id, |list| {
                lists::remove_child(&mut list.items, *parent_index, *child_index)
            }),
        }
    }

    /// Validate without applying
    pub fn validate(&self, blocks: &[Block]) -> Result<(), MutationError> {
        match self {
            Mutation::InsertBlock { block, .. } => {
                if store::position_of(blocks, &block.id).is_some() {
                    return Err(MutationError::InvalidValue(format!(
                        "block id already present: {}",
                        block.id
                    )));
                }
                Ok(())
            }

            Mutation::RemoveBlock { block_id } => {
                if find(blocks, block_id)?.saved_to_db {
                    return Err(MutationError::SavedBlockRemoval(block_id.clone()));
                }
                Ok(())
            }

            Mutation::IndentListItem { block_id, .. }
            | Mutation::OutdentListItem { block_id, .. }
            | Mutation::InsertListItem { block_id, .. }
            | Mutation::AddListChild { block_id, .. }
            | Mutation::RemoveListItem { block_id, .. }
            | Mutation::RemoveListChild { block_id, .. } => {
                let block = find(blocks, block_id)?;
                if block.block_type().is_list() {
                    Ok(())
                } else {
                    Err(MutationError::NotAList(block_id.clone()))
                }
            }

            _ => find(blocks, self.block_id()).map(|_| ()),
        }
    }
}

fn find<'a>(blocks: &'a [Block], block_id: &str) -> Result<&'a Block, MutationError> {
    blocks
        .iter()
        .find(|b| b.id == block_id)
        .ok_or_else(|| MutationError::BlockNotFound(block_id.to_string()))
}

fn find_mut<'a>(blocks: &'a mut [Block], block_id: &str) -> Result<&'a mut Block, MutationError> {
    blocks
        .iter_mut()
        .find(|b| b.id == block_id)
        .ok_or_else(|| MutationError::BlockNotFound(block_id.to_string()))
}

fn edit_list(
    blocks: &mut [Block],
    block_id: &str,
    edit: impl FnOnce(&mut ListContent) -> bool,
) -> Result<MutationOutcome, MutationError> {
    let block = find_mut(blocks, block_id)?;
    let list = block
        .content
        .as_list_mut()
        .ok_or_else(|| MutationError::NotAList(block_id.to_string()))?;

    if edit(list) {
        Ok(MutationOutcome::Applied)
    } else {
        Ok(MutationOutcome::Noop {
            reason: "list edit refused by nesting rules".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;
    use serde_json::json;

    fn list_block() -> Block {
        let mut block = Block::new(BlockType::NumberedList);
        block.id = "list".to_string();
        block
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::MoveBlock {
            block_id: "b-1".to_string(),
            direction: Direction::Down,
        };

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_validation_rejects_unknown_block() {
        let blocks = vec![list_block()];
        let mutation = Mutation::RemoveBlock {
            block_id: "".to_string(),
        };
        assert!(mutation.validate(&blocks).is_err());
    }

    #[test]
    fn test_remove_saved_block_rejected() {
        let mut block = list_block();
        block.saved_to_db = true;
        let mut blocks = vec![block];
        let result = Mutation::RemoveBlock {
            block_id: "list".to_string(),
        }
        .apply(&mut blocks);
        assert_eq!(
            result,
            Err(MutationError::SavedBlockRemoval("list".to_string()))
        );
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_update_content_keeps_list_well_formed() {
        let mut blocks = vec![list_block()];
        let content = BlockContent::NumberedList(ListContent {
            items: vec![
                ListItem {
                    body: "a".to_string(),
                    children: Some(vec![ListItem {
                        body: "b".to_string(),
                        children: Some(vec![ListItem::new("c")]),
                    }]),
                },
                ListItem {
                    body: "d".to_string(),
                    children: Some(vec![]),
                },
            ],
            ..ListContent::default()
        });
        Mutation::UpdateContent {
            block_id: "list".to_string(),
            content,
        }
        .apply(&mut blocks)
        .unwrap();
        assert!(lists::is_well_formed(&blocks[0].content.as_list().unwrap().items));
    }

    #[test]
    fn test_list_edit_on_paragraph_rejected() {
        let mut blocks = store::insert_at(&[], None, Block::new(BlockType::Paragraph));
        let id = blocks[0].id.clone();
        let result = Mutation::IndentListItem {
            block_id: id.clone(),
            index: 1,
        }
        .apply(&mut blocks);
        assert_eq!(result, Err(MutationError::NotAList(id)));
    }

    #[test]
    fn test_indent_first_item_reports_noop() {
        let mut blocks = vec![list_block()];
        let outcome = Mutation::IndentListItem {
            block_id: "list".to_string(),
            index: 0,
        }
        .apply(&mut blocks)
        .unwrap();
        assert!(matches!(outcome, MutationOutcome::Noop { .. }));
    }

    #[test]
    fn test_list_edits_through_mutations() {
        let mut blocks = vec![list_block()];
        Mutation::InsertListItem {
            block_id: "list".to_string(),
            index: 1,
            body: "second".to_string(),
        }
        .apply(&mut blocks)
        .unwrap();
        Mutation::IndentListItem {
            block_id: "list".to_string(),
            index: 1,
        }
        .apply(&mut blocks)
        .unwrap();

        let list = blocks[0].content.as_list().unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].child_count(), 1);
    }

    #[test]
    fn test_metadata_edit_marks_human() {
        let mut blocks = vec![list_block()];
        Mutation::SetMetadataField {
            block_id: "list".to_string(),
            field: MetadataField::Notes,
            value: json!("check pacing"),
        }
        .apply(&mut blocks)
        .unwrap();
        assert_eq!(
            blocks[0].metadata.field_source(MetadataField::Notes),
            Some(crate::metadata::MetadataSource::Human)
        );
    }

    #[test]
    fn test_insert_duplicate_id_rejected() {
        let mut blocks = vec![list_block()];
        let result = Mutation::InsertBlock {
            index: None,
            block: list_block(),
        }
        .apply(&mut blocks);
        assert!(matches!(result, Err(MutationError::InvalidValue(_))));
        assert_eq!(blocks.len(), 1);
    }
}
