/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Byte-prefixes that specify where the engine's state is stored in the host-provided key-value
//! store.
//!
//! The engine owns a single variable:
//!
//! |Variable|Type|Description|
//! |---|---|---|
//! |Fetched Blocks|height ∥ [`BlockId`](crate::types::basic::BlockId) -> parent id ∥ raw bytes|Every block that has been fetched from the network but not yet executed. The height is encoded big-endian so that lexicographic key order equals ascending height order.|

use crate::types::basic::{BlockHeight, BlockId};

pub(crate) const FETCHED_BLOCKS: [u8; 1] = [0];

pub(crate) fn combine(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut combination = Vec::with_capacity(a.len() + b.len());
    combination.extend_from_slice(a);
    combination.extend_from_slice(b);
    combination
}

/// Key of the fetched-block entry for `block` at `height`.
pub(crate) fn fetched_block_key(height: BlockHeight, block: &BlockId) -> Vec<u8> {
    combine(
        &combine(&FETCHED_BLOCKS, &height.to_be_bytes()),
        &block.bytes(),
    )
}

/// Value of a fetched-block entry: the parent id followed by the block's raw bytes.
pub(crate) fn fetched_block_value(parent: &BlockId, bytes: &[u8]) -> Vec<u8> {
    combine(&parent.bytes(), bytes)
}
