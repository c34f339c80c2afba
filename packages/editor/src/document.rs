//! # Document Handle
//!
//! A Document is the ordered block sequence of one lesson page plus a
//! version counter. It is the only owner of the sequence; every change goes
//! through [`Document::apply`], which validates the mutation, renormalizes
//! ordering and bumps the version.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Edit → Save
//!   ↓      ↓      ↓
//! rows  Mutations rows
//! ```

use crate::block::{Block, BlockId};
use crate::durable::StoredBlock;
use crate::persistence::PersistenceAdapter;
use crate::{store, EditorError, Mutation, MutationOutcome};
use tracing::{debug, info, instrument};

/// Editable lesson page
#[derive(Debug, Clone)]
pub struct Document {
    /// Page the blocks belong to
    pub page_id: String,

    /// Current version number (increments on each applied mutation)
    pub version: u64,

    blocks: Vec<Block>,

    /// Blocks changed since the last save
    dirty: Vec<BlockId>,
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// New version number
    pub version: u64,

    pub outcome: MutationOutcome,
}

impl Document {
    /// Empty page (memory only until saved)
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            version: 0,
            blocks: Vec::new(),
            dirty: Vec::new(),
        }
    }

    /// Build from blocks in any rank order
    pub fn from_blocks(page_id: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            page_id: page_id.into(),
            version: 0,
            blocks: store::from_ranked(blocks),
            dirty: Vec::new(),
        }
    }

    /// Build from stored rows
    pub fn from_stored(
        page_id: impl Into<String>,
        rows: Vec<StoredBlock>,
    ) -> Result<Self, EditorError> {
        let blocks = rows
            .into_iter()
            .map(Block::from_stored)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_blocks(page_id, blocks))
    }

    /// Load a page through the persistence adapter
    #[instrument(level = "info", skip(adapter))]
    pub async fn load(page_id: &str, adapter: &dyn PersistenceAdapter) -> Result<Self, EditorError> {
        let rows = adapter
            .load_blocks(page_id)
            .await
            .map_err(|e| EditorError::Persistence(format!("{:#}", e)))?;
        info!(blocks = rows.len(), "Loaded page");
        Self::from_stored(page_id, rows)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    /// Mutable access for non-structural edits (metadata workflow writes).
    /// Ordering fields are not reachable from outside the crate.
    pub fn block_mut(&mut self, block_id: &str) -> Option<&mut Block> {
        let block = self.blocks.iter_mut().find(|b| b.id == block_id)?;
        if !self.dirty.iter().any(|id| id == block_id) {
            self.dirty.push(block_id.to_string());
        }
        Some(block)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Apply a mutation
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        mutation.validate(&self.blocks)?;
        self.commit(mutation)
    }

    /// Drop a block whose stored row is already gone
    pub(crate) fn remove_deleted(&mut self, block_id: &str) -> Result<MutationResult, EditorError> {
        self.commit(Mutation::RemoveBlock {
            block_id: block_id.to_string(),
        })
    }

    fn commit(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let before = self.blocks.clone();
        let outcome = mutation.apply_validated(&mut self.blocks)?;

        if matches!(outcome, MutationOutcome::Noop { .. }) {
            debug!(mutation = mutation.name(), "Mutation was a no-op");
        } else {
            self.version += 1;
            self.mark_changed(&before);
            debug!(
                mutation = mutation.name(),
                block_id = mutation.block_id(),
                version = self.version,
                "Applied mutation"
            );
        }

        Ok(MutationResult {
            version: self.version,
            outcome,
        })
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn dirty_blocks(&self) -> &[BlockId] {
        &self.dirty
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Swap a locally generated id for the one persistence assigned
    pub(crate) fn reconcile_id(&mut self, local_id: &str, durable_id: &str) {
        if let Some(block) = self.blocks.iter_mut().find(|b| b.id == local_id) {
            block.id = durable_id.to_string();
            block.saved_to_db = true;
        }
        for id in self.dirty.iter_mut().filter(|id| id.as_str() == local_id) {
            *id = durable_id.to_string();
        }
    }

    pub(crate) fn mark_saved(&mut self, block_id: &str) {
        if let Some(block) = self.blocks.iter_mut().find(|b| b.id == block_id) {
            block.saved_to_db = true;
        }
    }

    /// Record every block that differs from `before` (new, moved or edited)
    fn mark_changed(&mut self, before: &[Block]) {
        for block in &self.blocks {
            let unchanged = before.iter().any(|b| b == block);
            if !unchanged && !self.dirty.iter().any(|id| *id == block.id) {
                self.dirty.push(block.id.clone());
            }
        }
        self.dirty
            .retain(|id| self.blocks.iter().any(|b| b.id == *id));
    }
}
