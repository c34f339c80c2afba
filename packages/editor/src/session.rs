//! # Edit Session
//!
//! One author's editing state for a page: the document plus the panel and
//! hover state the editor UI shows. Session state lives here rather than in
//! globals so two pages can be open side by side.
//!
//! The session is also where structural edits meet persistence: deleting a
//! saved block only happens after the persistence service confirms it, and
//! saving reconciles ids the service assigns to new blocks.

use crate::block::{Block, BlockId};
use crate::persistence::PersistenceAdapter;
use crate::{Document, EditorError, Mutation, MutationError, MutationResult};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Side panel attached to a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Style,
    Layout,
    Metadata,
}

/// Single edit session for one page
#[derive(Debug)]
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    /// Document being edited
    pub document: Document,

    selected_block: Option<BlockId>,
    hovered_block: Option<BlockId>,
    open_panel: Option<(BlockId, Panel)>,
}

/// Summary of a save pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveReport {
    pub inserted: usize,
    pub updated: usize,
    /// (local id, durable id) pairs for newly inserted blocks
    pub reassigned: Vec<(BlockId, BlockId)>,
}

impl EditSession {
    /// Create new edit session
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self {
            id: id.into(),
            document,
            selected_block: None,
            hovered_block: None,
            open_panel: None,
        }
    }

    /// Apply a local mutation
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        self.document.apply(mutation)
    }

    pub fn select(&mut self, block_id: Option<BlockId>) {
        self.selected_block = block_id;
    }

    pub fn selected_block(&self) -> Option<&str> {
        self.selected_block.as_deref()
    }

    pub fn hover(&mut self, block_id: Option<BlockId>) {
        self.hovered_block = block_id;
    }

    pub fn hovered_block(&self) -> Option<&str> {
        self.hovered_block.as_deref()
    }

    /// Open a panel for a block. Only one panel is open per session.
    pub fn open_panel(&mut self, block_id: BlockId, panel: Panel) {
        self.open_panel = Some((block_id, panel));
    }

    pub fn close_panel(&mut self) {
        self.open_panel = None;
    }

    pub fn open_panel_for(&self, block_id: &str) -> Option<Panel> {
        self.open_panel
            .as_ref()
            .filter(|(id, _)| id == block_id)
            .map(|(_, panel)| *panel)
    }

    /// Delete a block. Saved blocks are deleted durably first; if that
    /// fails the document is left exactly as it was.
    #[instrument(level = "info", skip(self, adapter), fields(session = %self.id))]
    pub async fn delete_block(
        &mut self,
        block_id: &str,
        adapter: &dyn PersistenceAdapter,
    ) -> Result<MutationResult, EditorError> {
        let saved = self
            .document
            .block(block_id)
            .map(|block| block.saved_to_db)
            .ok_or_else(|| MutationError::BlockNotFound(block_id.to_string()))?;
        if saved {
            adapter.delete_block(block_id).await.map_err(|e| {
                warn!(block_id, error = %e, "Durable delete failed; keeping block");
                EditorError::Persistence(format!("{:#}", e))
            })?;
        }

        let result = self.document.remove_deleted(block_id)?;
        self.forget(block_id);
        Ok(result)
    }

    /// Upsert every changed block, reconcile new ids and mark blocks saved.
    ///
    /// Blocks are written one at a time; a failure stops the pass and
    /// leaves the remaining blocks dirty for the next attempt.
    #[instrument(level = "info", skip(self, adapter), fields(session = %self.id))]
    pub async fn save(&mut self, adapter: &dyn PersistenceAdapter) -> Result<SaveReport, EditorError> {
        let mut report = SaveReport::default();
        let pending: Vec<Block> = self
            .document
            .blocks()
            .iter()
            .filter(|b| !b.saved_to_db || self.document.dirty_blocks().contains(&b.id))
            .cloned()
            .collect();

        for block in pending {
            let request = block.to_upsert(&self.document.page_id)?;
            let durable_id = adapter
                .upsert_block(&request)
                .await
                .map_err(|e| EditorError::Persistence(format!("{:#}", e)))?;

            if block.saved_to_db {
                report.updated += 1;
                self.document.mark_saved(&block.id);
            } else {
                report.inserted += 1;
                self.document.reconcile_id(&block.id, &durable_id);
                self.rename(&block.id, &durable_id);
                report.reassigned.push((block.id.clone(), durable_id));
            }
        }

        self.document.clear_dirty();
        info!(
            inserted = report.inserted,
            updated = report.updated,
            "Saved page"
        );
        Ok(report)
    }

    /// Drop session state that points at a removed block
    fn forget(&mut self, block_id: &str) {
        if self.selected_block.as_deref() == Some(block_id) {
            self.selected_block = None;
        }
        if self.hovered_block.as_deref() == Some(block_id) {
            self.hovered_block = None;
        }
        if self.open_panel.as_ref().is_some_and(|(id, _)| id == block_id) {
            self.open_panel = None;
        }
    }

    fn rename(&mut self, old: &str, new: &str) {
        for slot in [&mut self.selected_block, &mut self.hovered_block] {
            if slot.as_deref() == Some(old) {
                *slot = Some(new.to_string());
            }
        }
        if let Some((id, _)) = self.open_panel.as_mut() {
            if id == old {
                *id = new.to_string();
            }
        }
    }
}
