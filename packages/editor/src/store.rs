//! # Block Store
//!
//! Structural operations over the ordered block sequence of one page.
//!
//! Every public operation takes the current sequence and returns a new one
//! whose `order_index` values are exactly `0..n` in array order. The input
//! is never modified, so a failed operation leaves the caller's sequence
//! untouched.
//!
//! Placement "between" two blocks uses a fractional rank (`i - 0.5`,
//! `i + 0.5`) followed by a stable sort and a renormalize pass. Fractional
//! ranks never leave this module.

use crate::block::{Block, BlockId};
use crate::mutations::MutationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Reassign `order_index = position` for every block. Idempotent.
pub fn renormalize(mut blocks: Vec<Block>) -> Vec<Block> {
    for (position, block) in blocks.iter_mut().enumerate() {
        block.order_index = position as f64;
    }
    blocks
}

/// True when `order_index` is the contiguous sequence `0..n`
pub fn is_normalized(blocks: &[Block]) -> bool {
    blocks
        .iter()
        .enumerate()
        .all(|(position, block)| block.order_index == position as f64)
}

/// Order loaded blocks by their stored rank, then renormalize
pub fn from_ranked(mut blocks: Vec<Block>) -> Vec<Block> {
    blocks.sort_by(|a, b| a.order_index.total_cmp(&b.order_index));
    renormalize(blocks)
}

/// Insert `block` at `index`, or append when `index` is `None` or past the end
pub fn insert_at(blocks: &[Block], index: Option<usize>, block: Block) -> Vec<Block> {
    let len = blocks.len();
    let position = match index {
        Some(i) if i <= len => i,
        _ => len,
    };
    debug!(block_id = %block.id, position, "Inserting block");
    insert_ranked(blocks.to_vec(), block, position as f64 - 0.5)
}

/// Swap a block with its neighbour. At the boundary this is a no-op.
pub fn move_adjacent(
    blocks: &[Block],
    block_id: &str,
    direction: Direction,
) -> Result<Vec<Block>, MutationError> {
    let position = find(blocks, block_id)?;
    let target = match direction {
        Direction::Up if position > 0 => position - 1,
        Direction::Down if position + 1 < blocks.len() => position + 1,
        _ => {
            debug!(block_id, ?direction, "Block already at boundary");
            return Ok(blocks.to_vec());
        }
    };

    let mut result = blocks.to_vec();
    result.swap(position, target);
    debug!(block_id, from = position, to = target, "Moved block");
    Ok(renormalize(result))
}

/// Deep copy of a block under a new id, placed right after the source.
/// Returns the new sequence and the id of the copy.
pub fn duplicate(blocks: &[Block], block_id: &str) -> Result<(Vec<Block>, BlockId), MutationError> {
    let position = find(blocks, block_id)?;
    let copy = blocks[position].duplicate();
    let copy_id = copy.id.clone();
    debug!(source = block_id, copy = %copy_id, "Duplicating block");
    let result = insert_ranked(blocks.to_vec(), copy, position as f64 + 0.5);
    Ok((result, copy_id))
}

/// Remove a block and renormalize the rest
pub fn delete(blocks: &[Block], block_id: &str) -> Result<Vec<Block>, MutationError> {
    let position = find(blocks, block_id)?;
    let mut result = blocks.to_vec();
    result.remove(position);
    debug!(block_id, position, remaining = result.len(), "Deleted block");
    Ok(renormalize(result))
}

pub fn position_of(blocks: &[Block], block_id: &str) -> Option<usize> {
    blocks.iter().position(|b| b.id == block_id)
}

fn find(blocks: &[Block], block_id: &str) -> Result<usize, MutationError> {
    position_of(blocks, block_id).ok_or_else(|| MutationError::BlockNotFound(block_id.to_string()))
}

/// Place `block` at a fractional rank among freshly renormalized blocks,
/// then compact back to integers.
fn insert_ranked(blocks: Vec<Block>, mut block: Block, rank: f64) -> Vec<Block> {
    let mut blocks = renormalize(blocks);
    block.order_index = rank;
    blocks.push(block);
    blocks.sort_by(|a, b| a.order_index.total_cmp(&b.order_index));
    renormalize(blocks)
}
