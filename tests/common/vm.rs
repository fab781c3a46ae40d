//! A deterministic virtual machine over a linear chain of counter blocks, for driving the
//! bootstrapper in tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use borsh::{BorshDeserialize, BorshSerialize};
use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

use bootstrap_rs::types::basic::{BlockHeight, BlockId, PeerVersion};
use bootstrap_rs::types::block::Block;
use bootstrap_rs::vm::{VirtualMachine, VmError, VmState};

/// The encoding a `TestVm` block travels the wire in. A block's id is the SHA-256 digest of its
/// encoded bytes.
#[derive(BorshSerialize, BorshDeserialize)]
struct WireBlock {
    parent: [u8; 32],
    height: u64,
    payload: u64,
}

/// Build a linear chain of `len + 1` blocks: the genesis block at height 0, then `len` children.
pub fn make_chain(len: u64) -> Vec<Block> {
    let mut chain = Vec::with_capacity(len as usize + 1);
    let mut parent = [0u8; 32];
    for height in 0..=len {
        let wire = WireBlock {
            parent,
            height,
            payload: height.wrapping_mul(31),
        };
        let bytes = wire.try_to_vec().unwrap();
        let id: [u8; 32] = Sha256::digest(&bytes).into();
        chain.push(Block::new(
            BlockId::new(id),
            BlockId::new(parent),
            BlockHeight::new(height),
            bytes,
        ));
        parent = id;
    }
    chain
}

struct TestVmInner {
    state: VmState,
    /// Accepted blocks in acceptance order; the last one is the last accepted.
    accepted: Vec<Block>,
    known: HashMap<BlockId, Block>,
}

/// A cloneable handle to a shared test VM, starting out with only a genesis block accepted.
#[derive(Clone)]
pub struct TestVm(Arc<Mutex<TestVmInner>>);

impl TestVm {
    /// Create a `TestVm` that has accepted `accepted` (in order; the first entry must be the
    /// genesis block).
    pub fn new(accepted: Vec<Block>) -> TestVm {
        let known = accepted
            .iter()
            .map(|block| (block.id, block.clone()))
            .collect();
        TestVm(Arc::new(Mutex::new(TestVmInner {
            state: VmState::Bootstrapping,
            accepted,
            known,
        })))
    }

    pub fn state(&self) -> VmState {
        self.0.lock().unwrap().state
    }

    /// The heights of all accepted blocks, in acceptance order.
    pub fn accepted_heights(&self) -> Vec<u64> {
        self.0
            .lock()
            .unwrap()
            .accepted
            .iter()
            .map(|block| block.height.int())
            .collect()
    }

    pub fn last_accepted_height(&self) -> u64 {
        self.0
            .lock()
            .unwrap()
            .accepted
            .last()
            .map(|block| block.height.int())
            .unwrap_or(0)
    }
}

impl VirtualMachine for TestVm {
    fn last_accepted(&self) -> Result<BlockId, VmError> {
        let inner = self.0.lock().unwrap();
        inner
            .accepted
            .last()
            .map(|block| block.id)
            .ok_or_else(|| VmError::new("test vm has no accepted blocks"))
    }

    fn get_block(&self, id: &BlockId) -> Result<Option<Block>, VmError> {
        Ok(self.0.lock().unwrap().known.get(id).cloned())
    }

    fn parse_block(&self, bytes: &[u8]) -> Result<Block, VmError> {
        let wire = WireBlock::deserialize(&mut &bytes[..])
            .map_err(|err| VmError::new(format!("undecodable block bytes: {}", err)))?;
        let id: [u8; 32] = Sha256::digest(bytes).into();
        Ok(Block::new(
            BlockId::new(id),
            BlockId::new(wire.parent),
            BlockHeight::new(wire.height),
            bytes.to_vec(),
        ))
    }

    fn set_state(&mut self, state: VmState) -> Result<(), VmError> {
        self.0.lock().unwrap().state = state;
        Ok(())
    }

    fn verify_block(&mut self, block: &Block) -> Result<(), VmError> {
        let inner = self.0.lock().unwrap();
        let last_accepted = inner
            .accepted
            .last()
            .ok_or_else(|| VmError::new("test vm has no accepted blocks"))?;
        if block.parent != last_accepted.id {
            return Err(VmError::new(format!(
                "block at height {} does not extend the last accepted block at height {}",
                block.height, last_accepted.height
            )));
        }
        Ok(())
    }

    fn accept_block(&mut self, block: &Block) -> Result<(), VmError> {
        let mut inner = self.0.lock().unwrap();
        inner.known.insert(block.id, block.clone());
        inner.accepted.push(block.clone());
        Ok(())
    }

    fn connected(&mut self, _: &VerifyingKey, _: &PeerVersion) -> Result<(), VmError> {
        Ok(())
    }

    fn disconnected(&mut self, _: &VerifyingKey) -> Result<(), VmError> {
        Ok(())
    }

    fn health_check(&self) -> Result<(), VmError> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), VmError> {
        Ok(())
    }
}
