/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The fetch pool and the registry of outstanding ancestors requests.

use std::collections::HashMap;

use ed25519_dalek::VerifyingKey;
use indexmap::IndexSet;

use crate::types::basic::{BlockId, RequestId};

/// The set of peers that ancestry requests may currently be issued to.
///
/// Insertion order is preserved, and [`peek`](FetchSet::peek) always returns the oldest member:
/// a peer that just answered and was re-added goes to the back of the line.
pub(crate) struct FetchSet {
    peers: IndexSet<VerifyingKey>,
}

impl FetchSet {
    pub(crate) fn new() -> FetchSet {
        FetchSet {
            peers: IndexSet::new(),
        }
    }

    /// The next candidate peer, without removing it.
    pub(crate) fn peek(&self) -> Option<VerifyingKey> {
        self.peers.first().copied()
    }

    pub(crate) fn insert(&mut self, peer: VerifyingKey) {
        self.peers.insert(peer);
    }

    pub(crate) fn remove(&mut self, peer: &VerifyingKey) {
        self.peers.shift_remove(peer);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Replace the pool's contents with `peers`.
    pub(crate) fn refill(&mut self, peers: impl IntoIterator<Item = VerifyingKey>) {
        self.peers = peers.into_iter().collect();
    }
}

/// A one-to-one correspondence between outstanding `(peer, request id)` pairs and the block id
/// each request expects in its response.
///
/// Implemented as two hash maps kept in lock step. Inserting a pair evicts any entry that shares
/// either side, so both directions stay functions.
pub(crate) struct RequestRegistry {
    by_request: HashMap<(VerifyingKey, RequestId), BlockId>,
    by_block: HashMap<BlockId, (VerifyingKey, RequestId)>,
}

impl RequestRegistry {
    pub(crate) fn new() -> RequestRegistry {
        RequestRegistry {
            by_request: HashMap::new(),
            by_block: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, peer: VerifyingKey, request_id: RequestId, block: BlockId) {
        if let Some(evicted_block) = self.by_request.remove(&(peer, request_id)) {
            self.by_block.remove(&evicted_block);
        }
        if let Some(evicted_request) = self.by_block.remove(&block) {
            self.by_request.remove(&evicted_request);
        }
        self.by_request.insert((peer, request_id), block);
        self.by_block.insert(block, (peer, request_id));
    }

    /// Consume the entry for `(peer, request_id)`, returning the block id the request expected.
    pub(crate) fn remove_request(
        &mut self,
        peer: &VerifyingKey,
        request_id: RequestId,
    ) -> Option<BlockId> {
        let block = self.by_request.remove(&(*peer, request_id))?;
        self.by_block.remove(&block);
        Some(block)
    }

    /// Whether some live request already expects `block`. Used to drop duplicate fetches.
    pub(crate) fn expects_block(&self, block: &BlockId) -> bool {
        self.by_block.contains_key(block)
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;

    use super::*;

    fn keys(n: usize) -> Vec<VerifyingKey> {
        let mut csprg = OsRng {};
        (0..n)
            .map(|_| SigningKey::generate(&mut csprg).verifying_key())
            .collect()
    }

    fn block_id(tag: u8) -> BlockId {
        let mut bytes = [0u8; 32];
        bytes[0] = tag;
        BlockId::new(bytes)
    }

    #[test]
    fn peek_is_fifo_and_readding_moves_a_peer_to_the_back() {
        let peers = keys(3);
        let mut pool = FetchSet::new();
        pool.refill(peers.clone());

        assert_eq!(pool.peek(), Some(peers[0]));
        pool.remove(&peers[0]);
        assert_eq!(pool.peek(), Some(peers[1]));

        // The first peer responds and is re-added: it now queues behind the others.
        pool.insert(peers[0]);
        assert_eq!(pool.peek(), Some(peers[1]));
    }

    #[test]
    fn registry_keeps_both_directions_in_step() {
        let peers = keys(2);
        let mut registry = RequestRegistry::new();

        registry.insert(peers[0], RequestId::new(1), block_id(1));
        assert!(registry.expects_block(&block_id(1)));

        let expected = registry.remove_request(&peers[0], RequestId::new(1));
        assert_eq!(expected, Some(block_id(1)));
        assert!(!registry.expects_block(&block_id(1)));
        assert_eq!(registry.remove_request(&peers[0], RequestId::new(1)), None);
    }

    #[test]
    fn inserting_a_block_a_second_time_evicts_the_stale_request() {
        let peers = keys(2);
        let mut registry = RequestRegistry::new();

        registry.insert(peers[0], RequestId::new(1), block_id(1));
        registry.insert(peers[1], RequestId::new(2), block_id(1));

        // The old pairing is gone; only the new one resolves.
        assert_eq!(registry.remove_request(&peers[0], RequestId::new(1)), None);
        assert_eq!(
            registry.remove_request(&peers[1], RequestId::new(2)),
            Some(block_id(1))
        );
    }

    #[test]
    fn a_peer_never_has_two_live_requests_for_the_same_request_id() {
        let peers = keys(1);
        let mut registry = RequestRegistry::new();

        registry.insert(peers[0], RequestId::new(7), block_id(1));
        registry.insert(peers[0], RequestId::new(7), block_id(2));

        assert!(!registry.expects_block(&block_id(1)));
        assert_eq!(
            registry.remove_request(&peers[0], RequestId::new(7)),
            Some(block_id(2))
        );
    }
}
