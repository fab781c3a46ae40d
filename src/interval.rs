/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The persisted, sparse map from block height to fetched-but-not-yet-executed block data.
//!
//! While the bootstrapper downloads ancestry it accumulates blocks faster than it executes them,
//! and a node may be restarted in the middle of a download. The interval tree is what makes the
//! already-fetched work durable: every fetched block is inserted here under an atomic write batch,
//! and on [`start`](crate::bootstrap::Bootstrapper::start) the tree is rebuilt from the store.
//!
//! The in-memory side is a height-ordered index holding only the identities (block id and parent
//! id) of each fetched block; the raw bytes stay in the store until execution. Because the parent
//! id is part of the persisted value, recovering the set of block ids that still need fetching
//! after a restart requires no VM involvement: it is the set of parents of every "lower bound" of
//! the stored height intervals.

use std::collections::{BTreeMap, HashSet};

use crate::storage::kv_store::{KVGet, KVGetError, Key, WriteBatch};
use crate::storage::paths;
use crate::types::basic::{BlockHeight, BlockId};
use crate::types::block::Block;

/// Identities of a fetched block, kept in memory while its bytes live in the store.
#[derive(Clone, Copy)]
struct Fetched {
    block: BlockId,
    parent: BlockId,
}

pub(crate) struct IntervalTree {
    index: BTreeMap<u64, Fetched>,
}

impl IntervalTree {
    /// A tree with no entries, used before [`start`](crate::bootstrap::Bootstrapper::start)
    /// rebuilds the real one from the store.
    pub(crate) fn empty() -> IntervalTree {
        IntervalTree {
            index: BTreeMap::new(),
        }
    }

    /// Rebuild the tree from the fetched-block entries persisted in `db`.
    pub(crate) fn new<K: KVGet>(db: &K) -> Result<IntervalTree, KVGetError> {
        let mut index = BTreeMap::new();
        for (key, value) in db.ascending(&paths::FETCHED_BLOCKS) {
            if !key.starts_with(&paths::FETCHED_BLOCKS) {
                break;
            }
            let (height, block) = decode_key(&key)?;
            let (parent, _) = decode_value(height, &value)?;
            index.insert(height.int(), Fetched { block, parent });
        }
        Ok(IntervalTree { index })
    }

    /// The number of fetched-but-unexecuted blocks.
    pub(crate) fn len(&self) -> u64 {
        self.index.len() as u64
    }

    pub(crate) fn contains(&self, height: BlockHeight) -> bool {
        self.index.contains_key(&height.int())
    }

    /// Insert `block` into the tree, buffering the persistent insertion in `batch`.
    pub(crate) fn add<W: WriteBatch>(&mut self, batch: &mut W, block: &Block) {
        batch.set(
            &paths::fetched_block_key(block.height, &block.id),
            &paths::fetched_block_value(&block.parent, &block.bytes),
        );
        self.index.insert(
            block.height.int(),
            Fetched {
                block: block.id,
                parent: block.parent,
            },
        );
    }

    /// Remove the entry at `height`, buffering the persistent deletion in `batch`.
    pub(crate) fn remove<W: WriteBatch>(&mut self, batch: &mut W, height: BlockHeight) {
        if let Some(fetched) = self.index.remove(&height.int()) {
            batch.delete(&paths::fetched_block_key(height, &fetched.block));
        }
    }

    /// Read the raw bytes of the block stored at `height` back from `db`.
    pub(crate) fn block_bytes<K: KVGet>(
        &self,
        db: &K,
        height: BlockHeight,
    ) -> Result<Vec<u8>, KVGetError> {
        let fetched = self
            .index
            .get(&height.int())
            .ok_or(KVGetError::ValueExpectedButNotFound {
                key: Key::FetchedBlock {
                    height: height.int(),
                },
            })?;
        let value = db
            .get(&paths::fetched_block_key(height, &fetched.block))
            .ok_or(KVGetError::ValueExpectedButNotFound {
                key: Key::FetchedBlock {
                    height: height.int(),
                },
            })?;
        let (_, bytes) = decode_value(height, &value)?;
        Ok(bytes)
    }

    /// Iterate over `(height, block id)` pairs at or above `start`, in ascending height order.
    pub(crate) fn ascending_from(
        &self,
        start: BlockHeight,
    ) -> impl Iterator<Item = (BlockHeight, BlockId)> + '_ {
        self.index
            .range(start.int()..)
            .map(|(height, fetched)| (BlockHeight::new(*height), fetched.block))
    }

    /// The block ids that are known to be needed but not yet fetched: the parent of every interval
    /// lower bound strictly above `last_accepted + 1`.
    ///
    /// A height `h` is an interval lower bound when the tree holds `h` but not `h - 1`. An entry
    /// directly above `last_accepted` needs no parent fetch, since its parent is the last accepted
    /// block itself.
    pub(crate) fn missing_block_ids(&self, last_accepted: BlockHeight) -> HashSet<BlockId> {
        let mut missing = HashSet::new();
        for (height, fetched) in &self.index {
            if *height <= last_accepted.int() + 1 {
                continue;
            }
            if !self.index.contains_key(&(height - 1)) {
                missing.insert(fetched.parent);
            }
        }
        missing
    }
}

fn decode_key(key: &[u8]) -> Result<(BlockHeight, BlockId), KVGetError> {
    // prefix (1 byte) ∥ big-endian height (8 bytes) ∥ block id (32 bytes)
    if key.len() != 41 {
        return Err(KVGetError::MalformedValue {
            key: Key::FetchedBlock { height: 0 },
        });
    }
    let height = u64::from_be_bytes(key[1..9].try_into().unwrap());
    let block = BlockId::new(key[9..41].try_into().unwrap());
    Ok((BlockHeight::new(height), block))
}

fn decode_value(height: BlockHeight, value: &[u8]) -> Result<(BlockId, Vec<u8>), KVGetError> {
    // parent id (32 bytes) ∥ raw block bytes
    if value.len() < 32 {
        return Err(KVGetError::MalformedValue {
            key: Key::FetchedBlock {
                height: height.int(),
            },
        });
    }
    let (parent, bytes) = value.split_at(32);
    Ok((
        BlockId::new(parent.try_into().unwrap()),
        bytes.to_vec(),
    ))
}
