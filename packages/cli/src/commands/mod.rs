pub mod ai;
pub mod blocks;
pub mod init;
pub mod lists;
mod render;

pub use ai::{clear, generate, review, ClearArgs, GenerateArgs, ReviewArgs};
pub use blocks::{
    delete, duplicate, insert, list_blocks, move_block, BlocksArgs, DeleteArgs, DuplicateArgs,
    InsertArgs, MoveArgs,
};
pub use init::{init, InitArgs};
pub use lists::{indent, item, outdent, IndentArgs, ItemCommand, OutdentArgs};

use crate::config::Config;
use anyhow::{anyhow, Result};
use lectern_client::{Client, HttpMetadataService, HttpPersistence};
use lectern_editor::{Document, EditSession, SaveReport};

/// Services and settings shared by the page commands
pub struct Context {
    pub config: Config,
    pub persistence: HttpPersistence,
    pub service: HttpMetadataService,
}

impl Context {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::new(&config.api_url, config.timeout())?;
        Ok(Self {
            persistence: HttpPersistence::new(client.clone()),
            service: HttpMetadataService::new(client),
            config,
        })
    }

    /// Load the configured page into a fresh session
    pub async fn open_session(&self) -> Result<EditSession> {
        let page_id = self.config.page()?;
        let document = Document::load(page_id, &self.persistence).await?;
        Ok(EditSession::new(
            format!("cli-{}", std::process::id()),
            document,
        ))
    }

    pub async fn save(&self, session: &mut EditSession) -> Result<SaveReport> {
        Ok(session.save(&self.persistence).await?)
    }
}

/// Resolve a block reference: an id, or a 0-based position
pub fn resolve_block(document: &Document, reference: &str) -> Result<String> {
    if document.block(reference).is_some() {
        return Ok(reference.to_string());
    }
    reference
        .parse::<usize>()
        .ok()
        .and_then(|position| document.blocks().get(position))
        .map(|block| block.id.clone())
        .ok_or_else(|| anyhow!("No block {} on page {}", reference, document.page_id))
}
