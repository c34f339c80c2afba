//! # Persistence Boundary
//!
//! The durable store for blocks is an external service. The editor only
//! relies on the three calls below; `MemoryPersistence` implements them in
//! process for tests and offline use.

use crate::block::BlockId;
use crate::durable::{StoredBlock, UpsertBlock};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Blocks of a page ordered by `order_index` ascending
    async fn load_blocks(&self, page_id: &str) -> Result<Vec<StoredBlock>>;

    /// Insert (no id) or update a block; returns the durable id
    async fn upsert_block(&self, block: &UpsertBlock) -> Result<BlockId>;

    async fn delete_block(&self, id: &str) -> Result<()>;
}

/// In-memory persistence for tests
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    rows: Mutex<HashMap<BlockId, StoredBlock>>,
    fail_deletes: Mutex<bool>,
    next_id: Mutex<u64>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `delete_block` fail
    pub fn fail_deletes(&self, fail: bool) {
        *self.fail_deletes.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    /// Seed a stored row directly
    pub fn insert_row(&self, row: StoredBlock) {
        self.lock_rows().insert(row.id.clone(), row);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock_rows().contains_key(id)
    }

    pub fn row(&self, id: &str) -> Option<StoredBlock> {
        self.lock_rows().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock_rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_rows(&self) -> std::sync::MutexGuard<'_, HashMap<BlockId, StoredBlock>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn new_id(&self) -> BlockId {
        let mut next = self.next_id.lock().unwrap_or_else(|e| e.into_inner());
        *next += 1;
        format!("db-{}", *next)
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryPersistence {
    async fn load_blocks(&self, page_id: &str) -> Result<Vec<StoredBlock>> {
        let mut blocks: Vec<StoredBlock> = self
            .lock_rows()
            .values()
            .filter(|row| row.page_id == page_id)
            .cloned()
            .collect();
        blocks.sort_by(|a, b| a.order_index.total_cmp(&b.order_index));
        Ok(blocks)
    }

    async fn upsert_block(&self, block: &UpsertBlock) -> Result<BlockId> {
        let id = match &block.id {
            Some(id) => {
                if !self.contains(id) {
                    return Err(anyhow!("block {} does not exist", id));
                }
                id.clone()
            }
            None => self.new_id(),
        };

        let mut rows = self.lock_rows();
        let raw_ai_metadata = rows.get(&id).and_then(|row| row.raw_ai_metadata.clone());
        rows.insert(
            id.clone(),
            StoredBlock {
                id: id.clone(),
                page_id: block.page_id.clone(),
                block_type: block.block_type,
                order_index: block.order_index,
                content_json: block.content_json.clone(),
                raw_ai_metadata,
            },
        );
        Ok(id)
    }

    async fn delete_block(&self, id: &str) -> Result<()> {
        if *self.fail_deletes.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(anyhow!("delete rejected for block {}", id));
        }
        self.lock_rows()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("block {} does not exist", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;

    fn upsert(id: Option<&str>, order_index: f64) -> UpsertBlock {
        UpsertBlock {
            id: id.map(str::to_string),
            page_id: "page".to_string(),
            block_type: BlockType::Paragraph,
            order_index,
            content_json: r#"{"blockType":"paragraph","content":"x"}"#.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = MemoryPersistence::new();
        let id = store.upsert_block(&upsert(None, 0.0)).await.unwrap();
        assert!(store.contains(&id));
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails() {
        let store = MemoryPersistence::new();
        assert!(store.upsert_block(&upsert(Some("nope"), 0.0)).await.is_err());
    }

    #[tokio::test]
    async fn test_load_orders_by_rank() {
        let store = MemoryPersistence::new();
        let second = store.upsert_block(&upsert(None, 1.0)).await.unwrap();
        let first = store.upsert_block(&upsert(None, 0.0)).await.unwrap();

        let loaded = store.load_blocks("page").await.unwrap();
        let ids: Vec<_> = loaded.iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids, vec![first, second]);
        assert!(store.load_blocks("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_switch() {
        let store = MemoryPersistence::new();
        let id = store.upsert_block(&upsert(None, 0.0)).await.unwrap();
        store.fail_deletes(true);
        assert!(store.delete_block(&id).await.is_err());
        assert!(store.contains(&id));
        store.fail_deletes(false);
        store.delete_block(&id).await.unwrap();
        assert!(store.is_empty());
    }
}
