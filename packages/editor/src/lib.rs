//! # Lectern Editor
//!
//! Core block model and editing engine for Lectern lesson pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ persistence: load/upsert/delete block rows  │
//! └─────────────────────────────────────────────┘
//!                     ↕
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + EditSession              │
//! │  - Typed blocks with tagged content         │
//! │  - Insert/move/duplicate/delete (store)     │
//! │  - Two-level list indent/outdent (lists)    │
//! │  - List markers (markers)                   │
//! └─────────────────────────────────────────────┘
//!                     ↕
//! ┌─────────────────────────────────────────────┐
//! │ metadata: AI review workflow per block      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Array order is truth**: `order_index` is always `0..n` between operations
//! 2. **No partial mutation**: a failed operation leaves the sequence as it was
//! 3. **Durable before local**: deleting a saved block waits for persistence
//! 4. **Blocks are independent**: each block is saved on its own
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lectern_editor::{Block, BlockType, Document, EditSession, Mutation};
//!
//! let doc = Document::load("page-1", &adapter).await?;
//! let mut session = EditSession::new("client-1", doc);
//!
//! session.apply(Mutation::InsertBlock {
//!     index: Some(0),
//!     block: Block::new(BlockType::Heading),
//! })?;
//!
//! session.save(&adapter).await?;
//! ```

mod block;
mod content;
mod document;
mod durable;
mod errors;
pub mod lists;
mod markers;
mod metadata;
mod mutations;
mod persistence;
mod session;
pub mod store;
pub mod text;

pub use block::{Block, BlockId, BlockStyle, BlockType};
pub use content::{
    BlockContent, ImageContent, ImagePosition, ImageTextContent, ListContent, ListItem, Tab,
    TableContent,
};
pub use document::{Document, MutationResult};
pub use durable::{DurableContent, StoredBlock, UpsertBlock};
pub use errors::{EditorError, ModelError};
pub use markers::{list_marker, to_roman, ItemMarkers, ListStyle, BULLET, SUB_BULLET};
pub use metadata::{difficulty_value, Metadata, MetadataField, MetadataSource, MAX_DIFFICULTY};
pub use mutations::{Mutation, MutationError, MutationOutcome};
pub use persistence::{MemoryPersistence, PersistenceAdapter};
pub use session::{EditSession, Panel, SaveReport};
pub use store::Direction;
