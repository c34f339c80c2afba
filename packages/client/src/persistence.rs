//! Block persistence over HTTP
//!
//! Routes, relative to the API base url:
//!
//! ```text
//! GET    pages/{page_id}/blocks   -> [StoredBlock] | { blocks: [StoredBlock] }
//! POST   blocks                   -> { id }
//! DELETE blocks/{id}
//! ```

use crate::http::Client;
use anyhow::Context;
use async_trait::async_trait;
use lectern_editor::{BlockId, PersistenceAdapter, StoredBlock, UpsertBlock};
use serde::Deserialize;
use tracing::{debug, instrument};

#[derive(Deserialize)]
#[serde(untagged)]
enum BlockList {
    Bare(Vec<StoredBlock>),
    Wrapped { blocks: Vec<StoredBlock> },
}

impl BlockList {
    fn into_blocks(self) -> Vec<StoredBlock> {
        match self {
            BlockList::Bare(blocks) | BlockList::Wrapped { blocks } => blocks,
        }
    }
}

#[derive(Deserialize)]
struct UpsertResponse {
    id: BlockId,
}

#[derive(Debug, Clone)]
pub struct HttpPersistence {
    client: Client,
}

impl HttpPersistence {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PersistenceAdapter for HttpPersistence {
    #[instrument(level = "info", skip(self))]
    async fn load_blocks(&self, page_id: &str) -> anyhow::Result<Vec<StoredBlock>> {
        let list: BlockList = self
            .client
            .get(&format!("pages/{}/blocks", page_id))
            .await
            .with_context(|| format!("loading blocks of page {}", page_id))?;
        let mut blocks = list.into_blocks();
        blocks.sort_by(|a, b| a.order_index.total_cmp(&b.order_index));
        debug!(count = blocks.len(), "Loaded block rows");
        Ok(blocks)
    }

    #[instrument(level = "info", skip(self, block), fields(id = ?block.id, order_index = block.order_index))]
    async fn upsert_block(&self, block: &UpsertBlock) -> anyhow::Result<BlockId> {
        let response: UpsertResponse = self
            .client
            .post("blocks", block)
            .await
            .context("saving block")?;
        Ok(response.id)
    }

    #[instrument(level = "info", skip(self))]
    async fn delete_block(&self, id: &str) -> anyhow::Result<()> {
        self.client
            .delete(&format!("blocks/{}", id))
            .await
            .with_context(|| format!("deleting block {}", id))
    }
}
