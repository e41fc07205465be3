//! Reading-order resolution
//!
//! A deterministic total order over block identifiers: stable sort by
//! (page, column, top-y, left-x), ties broken by original insertion order.
//! This is a deliberate simplification of a true layout graph; [`order_key`]
//! is the explicit extension point a graph-based order would replace, leaving
//! the "ordered sequence of block id" contract untouched.

use lector_core::{Block, Policy};

/// The sort key tuple. f32 coordinates are bit-converted through a
/// total-order mapping so the sort itself is total and deterministic.
pub fn order_key(block: &Block) -> (usize, usize, u32, u32) {
    (
        block.page,
        block.column,
        f32_sort_key(block.bbox.top()),
        f32_sort_key(block.bbox.left()),
    )
}

/// Monotone map from f32 to u32 preserving numeric order (finite values).
fn f32_sort_key(v: f32) -> u32 {
    let bits = v.to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}

/// Build the reading order for a block set.
///
/// Blocks whose policy is `Skip` at build time are excluded from the order but
/// remain in the block set.
pub fn build_reading_order(blocks: &[Block]) -> Vec<String> {
    let mut indices: Vec<usize> = (0..blocks.len()).collect();
    indices.sort_by_key(|&i| order_key(&blocks[i]));

    let order: Vec<String> = indices
        .into_iter()
        .map(|i| &blocks[i])
        .filter(|b| b.policy != Policy::Skip)
        .map(|b| b.id.clone())
        .collect();

    tracing::info!(count = order.len(), "Resolved reading order");
    order
}
