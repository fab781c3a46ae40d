/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Trait for the pluggable virtual machine that owns block parsing, validation, and acceptance.
//!
//! The bootstrapper treats the VM as opaque: it does not understand block payloads, fees, or
//! transactions. It drives the VM through exactly the surface below — resolve the last accepted
//! block, check for locally-known blocks, parse downloaded bytes, and finally verify-then-accept
//! each ancestor in height order.
//!
//! Hosts that share one VM between the bootstrapper, the network layer, and the consensus engine
//! should implement this trait on a cloneable guard type (for example a handle wrapping
//! `Arc<Mutex<_>>`); the per-chain mutual-exclusion discipline described in
//! [`bootstrap`](crate::bootstrap) keeps the calls serialized.

use std::fmt::{self, Display, Formatter};

use ed25519_dalek::VerifyingKey;

use crate::types::basic::{BlockId, PeerVersion};
use crate::types::block::Block;

/// The lifecycle state a [`VirtualMachine`] is in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VmState {
    /// The chain is still syncing ancestry; blocks handed to the VM come from the bootstrapper.
    Bootstrapping,
    /// The chain is caught up; blocks come from consensus.
    NormalOp,
}

/// Trait for the pluggable virtual machine.
pub trait VirtualMachine {
    /// The id of the last block this VM accepted.
    fn last_accepted(&self) -> Result<BlockId, VmError>;

    /// Look `id` up in the VM's local state. `Ok(None)` means the VM does not know the block; any
    /// `Err` is treated by the bootstrapper as a fatal invariant violation.
    fn get_block(&self, id: &BlockId) -> Result<Option<Block>, VmError>;

    /// Parse one block from its raw bytes.
    fn parse_block(&self, bytes: &[u8]) -> Result<Block, VmError>;

    /// Parse a batch of blocks. The default implementation parses them one by one; VMs with a
    /// cheaper batched path should override it.
    fn parse_blocks(&self, blocks: &[Vec<u8>]) -> Result<Vec<Block>, VmError> {
        blocks.iter().map(|bytes| self.parse_block(bytes)).collect()
    }

    /// Move the VM into `state`.
    fn set_state(&mut self, state: VmState) -> Result<(), VmError>;

    /// Check that `block` is valid on top of the VM's current state.
    fn verify_block(&mut self, block: &Block) -> Result<(), VmError>;

    /// Mark `block` as accepted. After this returns, `last_accepted` must report `block.id`.
    fn accept_block(&mut self, block: &Block) -> Result<(), VmError>;

    /// A peer connected. Lifecycle pass-through.
    fn connected(&mut self, peer: &VerifyingKey, version: &PeerVersion) -> Result<(), VmError>;

    /// A peer disconnected. Lifecycle pass-through.
    fn disconnected(&mut self, peer: &VerifyingKey) -> Result<(), VmError>;

    fn health_check(&self) -> Result<(), VmError>;

    fn shutdown(&mut self) -> Result<(), VmError>;
}

/// Error returned by a [`VirtualMachine`] implementation.
///
/// The bootstrapper classifies these by call site, not by content: a parse failure on downloaded
/// bytes is recovered by refetching from another peer, while a failure from any other VM call is
/// fatal and aborts chain startup.
#[derive(Debug)]
pub struct VmError(String);

impl VmError {
    pub fn new(msg: impl Into<String>) -> VmError {
        VmError(msg.into())
    }
}

impl Display for VmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
