/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definition for the 'block' type as the bootstrapper sees it.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::types::basic::{BlockHeight, BlockId};

/// A block as returned by the host VM's parser.
///
/// The bootstrapper only ever looks at a block's identity, its parent link, and its height; the
/// `bytes` field carries the VM's own encoding of the full block, which the bootstrapper persists
/// and later hands back to the VM for execution without interpreting it.
#[derive(Clone, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
pub struct Block {
    pub id: BlockId,
    pub parent: BlockId,
    pub height: BlockHeight,
    pub bytes: Vec<u8>,
}

impl Block {
    pub fn new(id: BlockId, parent: BlockId, height: BlockHeight, bytes: Vec<u8>) -> Block {
        Block {
            id,
            parent,
            height,
            bytes,
        }
    }
}
