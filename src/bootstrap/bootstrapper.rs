/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Implements the [`Bootstrapper`], the coordinator that sequences the bootstrap protocol:
//! wait-for-stake, the frontier and acceptance polls, the ancestor fetch pipeline, deterministic
//! execution, and the restart-or-finish decision.

use std::cmp::max;
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant, SystemTime};

use ed25519_dalek::VerifyingKey;

use crate::config::BootstrapConfig;
use crate::events::*;
use crate::interval::IntervalTree;
use crate::networking::messages::{GetAccepted, GetAcceptedFrontier, GetAncestors};
use crate::networking::network::Network;
use crate::networking::sending::SenderHandle;
use crate::storage::kv_store::{KVGetError, KVStore, KVStoreError, WriteBatch};
use crate::tracker::{StartupTracker, SubnetTracker, TimeoutScheduler, ValidatorRegistry};
use crate::types::basic::{BlockHeight, BlockId, PeerVersion, Power, RequestId};
use crate::types::block::Block;
use crate::types::validator_set::SampleError;
use crate::vm::{VirtualMachine, VmError, VmState};

use super::fetch::{FetchSet, RequestRegistry};
use super::poll::{Majority, Minority, Noop, Poll};
use super::CancellationToken;

pub struct Bootstrapper<N: Network, K: KVStore, V: VirtualMachine> {
    config: BootstrapConfig,
    sender: SenderHandle<N>,
    db: K,
    vm: V,
    validators: Box<dyn ValidatorRegistry + Send>,
    startup: Box<dyn StartupTracker + Send>,
    subnet: Box<dyn SubnetTracker + Send>,
    timer: Box<dyn TimeoutScheduler + Send>,

    // Tracks the last request id that was used in a request. Replies carrying any other id are
    // stale and are dropped.
    request_id: RequestId,

    started: bool,
    restarted: bool,

    minority: Box<dyn Poll>,
    majority: Box<dyn Poll>,

    // Greatest height seen among the blocks processed this run.
    tip_height: BlockHeight,
    // Height of the last accepted block when bootstrapping started. Captured once; every ETA and
    // progress figure derives from it.
    starting_height: BlockHeight,
    // Number of blocks already in the interval tree when the fetch phase began.
    initially_fetched: u64,
    // Time at which the fetch phase began.
    start_time: Instant,

    outstanding_requests: RequestRegistry,

    // The peers that the next ancestors request may be issued to. A peer is removed when a
    // request is sent to it, and re-added when it answers with a non-empty response or its
    // request times out. A peer that answers with an empty response is not re-added.
    fetch_from: FetchSet,

    // Number of blocks executed in the previous round; `None` until a round has completed, which
    // makes the halving test pass unconditionally after the first round that executed anything.
    executed_state_transitions: Option<u64>,
    awaiting_timeout: bool,

    tree: IntervalTree,
    missing_block_ids: HashSet<BlockId>,

    vm_state: VmState,
    halt: CancellationToken,

    bootstrapped: Option<Box<dyn FnOnce() + Send>>,
    on_finished: Option<Box<dyn FnOnce(RequestId) + Send>>,
    event_publisher: Option<Sender<Event>>,
}

impl<N: Network, K: KVStore, V: VirtualMachine> Bootstrapper<N, K, V> {
    pub fn new(
        config: BootstrapConfig,
        network: N,
        db: K,
        vm: V,
        validators: Box<dyn ValidatorRegistry + Send>,
        startup: Box<dyn StartupTracker + Send>,
        subnet: Box<dyn SubnetTracker + Send>,
        timer: Box<dyn TimeoutScheduler + Send>,
        bootstrapped: Option<Box<dyn FnOnce() + Send>>,
        on_finished: Box<dyn FnOnce(RequestId) + Send>,
        event_publisher: Option<Sender<Event>>,
    ) -> Bootstrapper<N, K, V> {
        Bootstrapper {
            config,
            sender: SenderHandle::new(network),
            db,
            vm,
            validators,
            startup,
            subnet,
            timer,
            request_id: RequestId::new(0),
            started: false,
            restarted: false,
            minority: Box::new(Noop),
            majority: Box::new(Noop),
            tip_height: BlockHeight::new(0),
            starting_height: BlockHeight::new(0),
            initially_fetched: 0,
            start_time: Instant::now(),
            outstanding_requests: RequestRegistry::new(),
            fetch_from: FetchSet::new(),
            executed_state_transitions: None,
            awaiting_timeout: false,
            tree: IntervalTree::empty(),
            missing_block_ids: HashSet::new(),
            vm_state: VmState::Bootstrapping,
            halt: CancellationToken::new(),
            bootstrapped,
            on_finished: Some(on_finished),
            event_publisher,
        }
    }

    /// The token that stops the execute loop at the next block boundary when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.halt.clone()
    }

    /// Enter bootstrapping: move the VM into the bootstrapping state, capture the starting
    /// height, restore the interval tree and the missing-id set from the store, and begin a round
    /// as soon as the startup tracker allows.
    pub fn start(&mut self, start_request_id: RequestId) -> Result<(), BootstrapError> {
        self.vm.set_state(VmState::Bootstrapping)?;
        self.vm_state = VmState::Bootstrapping;

        self.starting_height = self.last_accepted_height()?;
        self.request_id = start_request_id;

        self.tree = IntervalTree::new(&self.db)?;
        self.missing_block_ids = self.tree.missing_block_ids(self.starting_height);

        Event::StartBootstrap(StartBootstrapEvent {
            timestamp: SystemTime::now(),
            starting_height: self.starting_height.int(),
        })
        .publish(&self.event_publisher);

        self.try_start_bootstrapping()
    }

    /// A peer connected. Forwarded to the VM and the startup tracker; the peer joins the fetch
    /// pool if it is a registered validator.
    pub fn connected(
        &mut self,
        peer: VerifyingKey,
        version: PeerVersion,
    ) -> Result<(), BootstrapError> {
        self.vm.connected(&peer, &version)?;
        self.startup.connected(&peer, &version);

        if self.validators.validator_set().contains(&peer) {
            self.fetch_from.insert(peer);
        }

        self.try_start_bootstrapping()
    }

    /// A peer disconnected. Forwarded to the VM and the startup tracker; the peer leaves the
    /// fetch pool.
    pub fn disconnected(&mut self, peer: VerifyingKey) -> Result<(), BootstrapError> {
        self.vm.disconnected(&peer)?;
        self.startup.disconnected(&peer);

        self.mark_unavailable(&peer);
        Ok(())
    }

    /// A sampled peer reported its accepted frontier.
    pub fn accepted_frontier(
        &mut self,
        peer: VerifyingKey,
        request_id: RequestId,
        container: BlockId,
    ) -> Result<(), BootstrapError> {
        if request_id != self.request_id {
            log::debug!(
                "dropping out-of-sync AcceptedFrontier, expected request id {}, got {}",
                self.request_id,
                request_id
            );
            return Ok(());
        }

        self.minority.record_opinion(peer, vec![container]);
        self.send_messages_or_finish()
    }

    /// A sampled peer failed to report its accepted frontier in time. A negative minority vote.
    pub fn get_accepted_frontier_failed(
        &mut self,
        peer: VerifyingKey,
        request_id: RequestId,
    ) -> Result<(), BootstrapError> {
        if request_id != self.request_id {
            log::debug!(
                "dropping out-of-sync GetAcceptedFrontierFailed, expected request id {}, got {}",
                self.request_id,
                request_id
            );
            return Ok(());
        }

        self.minority.record_opinion(peer, Vec::new());
        self.send_messages_or_finish()
    }

    /// A validator reported which frontier candidates it has accepted.
    pub fn accepted(
        &mut self,
        peer: VerifyingKey,
        request_id: RequestId,
        containers: Vec<BlockId>,
    ) -> Result<(), BootstrapError> {
        if request_id != self.request_id {
            log::debug!(
                "dropping out-of-sync Accepted, expected request id {}, got {}",
                self.request_id,
                request_id
            );
            return Ok(());
        }

        self.majority.record_opinion(peer, containers);
        self.send_messages_or_finish()
    }

    /// A validator failed to answer the acceptance poll in time. A negative majority vote.
    pub fn get_accepted_failed(
        &mut self,
        peer: VerifyingKey,
        request_id: RequestId,
    ) -> Result<(), BootstrapError> {
        if request_id != self.request_id {
            log::debug!(
                "dropping out-of-sync GetAcceptedFailed, expected request id {}, got {}",
                self.request_id,
                request_id
            );
            return Ok(());
        }

        self.majority.record_opinion(peer, Vec::new());
        self.send_messages_or_finish()
    }

    /// A peer answered an ancestors request with raw block bytes, child-first. The first block
    /// must be the one that was requested; any other leading block discards the whole response
    /// and the fetch is re-issued.
    pub fn ancestors(
        &mut self,
        peer: VerifyingKey,
        request_id: RequestId,
        blocks: Vec<Vec<u8>>,
    ) -> Result<(), BootstrapError> {
        let wanted = match self.outstanding_requests.remove_request(&peer, request_id) {
            Some(wanted) => wanted,
            None => {
                log::debug!("dropping unexpected Ancestors with request id {}", request_id);
                return Ok(());
            }
        };

        if blocks.is_empty() {
            log::debug!("peer answered an ancestors request with no blocks");
            // An empty answer is a sign the peer cannot help, so it is not re-added to the pool.
            self.mark_unavailable(&peer);
            return self.fetch(wanted);
        }

        self.fetch_from.insert(peer);

        let mut blocks = blocks;
        if blocks.len() > self.config.ancestors_max_containers_received {
            let dropped = blocks.len() - self.config.ancestors_max_containers_received;
            blocks.truncate(self.config.ancestors_max_containers_received);
            log::debug!("ignoring {} blocks past the ancestors response limit", dropped);
        }

        let parsed = match self.vm.parse_blocks(&blocks) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::debug!("failed to parse blocks in an ancestors response: {}", err);
                return self.fetch(wanted);
            }
        };

        let mut parsed = parsed.into_iter();
        let requested = match parsed.next() {
            Some(requested) => requested,
            None => return self.fetch(wanted),
        };
        if requested.id != wanted {
            log::debug!("first block of an ancestors response is not the requested block");
            return self.fetch(wanted);
        }

        let ancestors: HashMap<BlockId, Block> = parsed.map(|block| (block.id, block)).collect();
        self.process(requested, &ancestors)?;

        self.try_start_executing()
    }

    /// An ancestors request timed out. The peer stays usable, and the fetch is re-issued.
    pub fn get_ancestors_failed(
        &mut self,
        peer: VerifyingKey,
        request_id: RequestId,
    ) -> Result<(), BootstrapError> {
        let block = match self.outstanding_requests.remove_request(&peer, request_id) {
            Some(block) => block,
            None => {
                log::debug!(
                    "dropping unexpected GetAncestorsFailed with request id {}",
                    request_id
                );
                return Ok(());
            }
        };

        self.fetch_from.insert(peer);
        self.fetch(block)
    }

    /// The restart-delay timer fired.
    pub fn timeout(&mut self) -> Result<(), BootstrapError> {
        if !self.awaiting_timeout {
            return Err(BootstrapError::UnexpectedTimeout);
        }
        self.awaiting_timeout = false;

        if !self.subnet.is_bootstrapped() {
            return self.restart_bootstrapping();
        }
        self.finish()
    }

    /// Atomically delete everything the engine has persisted.
    pub fn clear(&mut self) -> Result<(), BootstrapError> {
        self.db.clear()?;
        Ok(())
    }

    pub fn health_check(&self) -> Result<(), BootstrapError> {
        self.vm.health_check()?;
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<(), BootstrapError> {
        log::info!("shutting down bootstrapper");
        self.vm.shutdown()?;
        Ok(())
    }

    /// The bootstrapper has nothing to gossip.
    pub fn gossip(&mut self) -> Result<(), BootstrapError> {
        Ok(())
    }

    /// Start bootstrapping the first time this is called while the startup tracker reports that
    /// the protocol should start.
    fn try_start_bootstrapping(&mut self) -> Result<(), BootstrapError> {
        if self.started || !self.startup.should_start() {
            return Ok(());
        }

        self.started = true;
        self.start_bootstrapping()
    }

    fn start_bootstrapping(&mut self) -> Result<(), BootstrapError> {
        let validator_set = self.validators.validator_set();
        let sampled = validator_set.sample_weighted(self.config.sample_k)?;

        Event::StartRound(StartRoundEvent {
            timestamp: SystemTime::now(),
            sampled: sampled.clone(),
            num_validators: validator_set.len(),
        })
        .publish(&self.event_publisher);

        let weights: HashMap<VerifyingKey, Power> =
            validator_set.validators_and_powers().into_iter().collect();

        self.minority = Box::new(Minority::new(
            sampled,
            self.config.max_outstanding_broadcast_requests,
        ));
        self.majority = Box::new(Majority::new(
            weights,
            self.config.max_outstanding_broadcast_requests,
        ));

        // With no validators to poll, the majority poll is born finalized and the fetch phase
        // begins immediately with whatever the store already holds.
        let (accepted, finalized) = self.majority.result();
        if finalized {
            log::info!("bootstrapping skipped: no validators to poll");
            return self.start_syncing(accepted);
        }

        self.request_id.increment();
        self.send_messages_or_finish()
    }

    // Mutually recursive with `start_bootstrapping`. The recursion terminates because re-entry
    // always exits through sending fresh frontier requests.
    fn send_messages_or_finish(&mut self) -> Result<(), BootstrapError> {
        let peers = self.minority.get_peers();
        if !peers.is_empty() {
            for peer in peers {
                self.sender.send(
                    peer,
                    GetAcceptedFrontier {
                        chain_id: self.config.chain_id,
                        request_id: self.request_id,
                    },
                );
            }
            return Ok(());
        }

        let (candidates, finalized) = self.minority.result();
        if !finalized {
            // The frontier is not final yet; wait for the outstanding requests.
            return Ok(());
        }

        let peers = self.majority.get_peers();
        if !peers.is_empty() {
            for peer in peers {
                self.sender.send(
                    peer,
                    GetAccepted {
                        chain_id: self.config.chain_id,
                        request_id: self.request_id,
                        containers: candidates.clone(),
                    },
                );
            }
            return Ok(());
        }

        let (accepted, finalized) = self.majority.result();
        if !finalized {
            // The accepted set is not final yet; wait for the outstanding requests.
            return Ok(());
        }

        if accepted.is_empty() {
            Event::NoAcceptedBlocks(NoAcceptedBlocksEvent {
                timestamp: SystemTime::now(),
                num_validators: self.validators.validator_set().len(),
            })
            .publish(&self.event_publisher);
            return self.start_bootstrapping();
        }

        self.start_syncing(accepted)
    }

    /// Seed the missing-id set with the confirmed accepted frontier and fetch everything the VM
    /// does not already hold.
    fn start_syncing(&mut self, accepted: Vec<BlockId>) -> Result<(), BootstrapError> {
        self.fetch_from.refill(self.startup.preferred_peers());

        self.missing_block_ids.extend(accepted.iter().copied());

        Event::StartFetch(StartFetchEvent {
            timestamp: SystemTime::now(),
            accepted: accepted.clone(),
            num_missing: self.missing_block_ids.len(),
            restarted: self.restarted,
        })
        .publish(&self.event_publisher);

        let mut to_process = Vec::with_capacity(self.missing_block_ids.len());
        for block_id in self.missing_block_ids.clone() {
            match self.vm.get_block(&block_id)? {
                Some(block) => to_process.push(block),
                None => self.fetch(block_id)?,
            }
        }

        self.initially_fetched = self.tree.len();
        self.start_time = Instant::now();

        for block in to_process {
            self.process(block, &HashMap::new())?;
        }

        self.try_start_executing()
    }

    /// Request `block` and its ancestors from one peer in the fetch pool.
    fn fetch(&mut self, block: BlockId) -> Result<(), BootstrapError> {
        if self.outstanding_requests.expects_block(&block) {
            return Ok(());
        }

        let peer = self
            .fetch_from
            .peek()
            .ok_or(BootstrapError::NoPeersToFetchFrom { block })?;

        // One outstanding request per peer.
        self.mark_unavailable(&peer);

        self.request_id.increment();
        self.outstanding_requests.insert(peer, self.request_id, block);
        self.sender.send(
            peer,
            GetAncestors {
                chain_id: self.config.chain_id,
                request_id: self.request_id,
                container: block,
            },
        );
        Ok(())
    }

    /// Remove `peer` from the fetch pool. If the pool drains, it is refilled from the startup
    /// tracker's currently preferred peers so fetching can continue.
    fn mark_unavailable(&mut self, peer: &VerifyingKey) {
        self.fetch_from.remove(peer);

        if self.fetch_from.is_empty() {
            self.fetch_from.refill(self.startup.preferred_peers());
        }
    }

    /// Persist `block` and the chain of its ancestors, walking parent links through `ancestors`
    /// (sibling blocks from the same response) until reaching the last accepted height, the
    /// previously fetched frontier, or a parent that has to be requested from the network.
    fn process(
        &mut self,
        block: Block,
        ancestors: &HashMap<BlockId, Block>,
    ) -> Result<(), BootstrapError> {
        let last_accepted_height = self.last_accepted_height()?;

        let num_previously_fetched = self.tree.len();
        let response_tip_height = block.height;

        let mut batch = K::WriteBatch::new();
        let mut cursor = block;
        let new_missing_id = loop {
            self.missing_block_ids.remove(&cursor.id);

            if cursor.height.int() <= last_accepted_height.int() {
                break None;
            }
            if self.tree.contains(cursor.height) {
                // Reached the frontier fetched by a previous request.
                break None;
            }

            self.tree.add(&mut batch, &cursor);

            let parent_id = cursor.parent;
            match ancestors.get(&parent_id) {
                Some(parent) => cursor = parent.clone(),
                None => break Some(parent_id),
            }
        };

        let num_fetched = self.tree.len();
        self.tip_height = max(self.tip_height, response_tip_height);

        let frequency = self.config.status_update_frequency;
        if num_previously_fetched / frequency != num_fetched / frequency {
            let total_to_fetch = self
                .tip_height
                .int()
                .saturating_sub(self.starting_height.int());
            Event::FetchProgress(FetchProgressEvent {
                timestamp: SystemTime::now(),
                fetched: num_fetched,
                total: total_to_fetch,
                eta: estimate_eta(
                    self.start_time,
                    num_fetched - self.initially_fetched,
                    total_to_fetch.saturating_sub(self.initially_fetched),
                ),
                restarted: self.restarted,
            })
            .publish(&self.event_publisher);
        }

        self.db.write(batch)?;

        let missing = match new_missing_id {
            Some(missing) => missing,
            None => return Ok(()),
        };
        self.missing_block_ids.insert(missing);
        self.fetch(missing)
    }

    /// Execute all pending blocks if there are no more blocks being fetched, then either restart
    /// bootstrapping or transition into normal operation.
    fn try_start_executing(&mut self) -> Result<(), BootstrapError> {
        if !self.missing_block_ids.is_empty() {
            return Ok(());
        }

        if self.vm_state == VmState::NormalOp || self.awaiting_timeout {
            return Ok(());
        }

        let last_accepted_height = self.last_accepted_height()?;

        let num_to_execute = self.tree.len();
        Event::StartExecute(StartExecuteEvent {
            timestamp: SystemTime::now(),
            num_to_execute,
            restarted: self.restarted,
        })
        .publish(&self.event_publisher);

        self.execute(last_accepted_height)?;
        if self.halt.is_cancelled() {
            return Ok(());
        }

        let previously_executed = self.executed_state_transitions;
        self.executed_state_transitions = Some(num_to_execute);

        // Requiring each round to execute fewer than half as many blocks as the one before it
        // guarantees geometric decay of per-round work, so the protocol terminates even while the
        // network keeps producing blocks.
        if num_to_execute > 0
            && previously_executed.map_or(true, |previous| num_to_execute < previous / 2)
        {
            Event::RestartBootstrap(RestartBootstrapEvent {
                timestamp: SystemTime::now(),
                executed: num_to_execute,
                previously_executed,
            })
            .publish(&self.event_publisher);
            return self.restart_bootstrapping();
        }

        if let Some(bootstrapped) = self.bootstrapped.take() {
            bootstrapped();
        }

        self.subnet.mark_bootstrapped(self.config.chain_id);

        if !self.subnet.is_bootstrapped() {
            Event::AwaitSubnet(AwaitSubnetEvent {
                timestamp: SystemTime::now(),
                delay: self.config.bootstrapping_delay,
            })
            .publish(&self.event_publisher);
            self.timer.register_timeout(self.config.bootstrapping_delay);
            self.awaiting_timeout = true;
            return Ok(());
        }

        self.finish()
    }

    /// Parse, verify, and accept every fetched block in ascending height order, removing each
    /// from the interval tree as it is executed. Entries at or below the last accepted height are
    /// leftovers from an earlier run and are deleted without executing.
    fn execute(&mut self, last_accepted_height: BlockHeight) -> Result<(), BootstrapError> {
        let entries: Vec<(BlockHeight, BlockId)> =
            self.tree.ascending_from(BlockHeight::new(0)).collect();
        let total = entries
            .iter()
            .filter(|(height, _)| height.int() > last_accepted_height.int())
            .count() as u64;

        let execute_start = Instant::now();
        let mut executed: u64 = 0;
        for (height, _) in entries {
            if self.halt.is_cancelled() {
                return Ok(());
            }

            let mut batch = K::WriteBatch::new();
            if height.int() > last_accepted_height.int() {
                let bytes = self.tree.block_bytes(&self.db, height)?;
                let block = self.vm.parse_block(&bytes)?;
                self.vm.verify_block(&block)?;
                self.vm.accept_block(&block)?;
                executed += 1;
            }
            self.tree.remove(&mut batch, height);
            self.db.write(batch)?;

            if executed > 0 && executed % self.config.status_update_frequency == 0 {
                Event::ExecuteProgress(ExecuteProgressEvent {
                    timestamp: SystemTime::now(),
                    executed,
                    total,
                    eta: estimate_eta(execute_start, executed, total),
                    restarted: self.restarted,
                })
                .publish(&self.event_publisher);
            }
        }
        Ok(())
    }

    /// Re-run the whole protocol: fresh request registry, fresh peers, fresh polls.
    fn restart_bootstrapping(&mut self) -> Result<(), BootstrapError> {
        log::debug!("checking for new frontiers");

        self.restarted = true;
        self.outstanding_requests = RequestRegistry::new();
        self.start_bootstrapping()
    }

    /// Graduate to normal operation.
    fn finish(&mut self) -> Result<(), BootstrapError> {
        self.vm.set_state(VmState::NormalOp)?;
        self.vm_state = VmState::NormalOp;

        Event::FinishBootstrap(FinishBootstrapEvent {
            timestamp: SystemTime::now(),
            request_id: self.request_id,
        })
        .publish(&self.event_publisher);

        if let Some(on_finished) = self.on_finished.take() {
            on_finished(self.request_id);
        }
        Ok(())
    }

    fn last_accepted_height(&self) -> Result<BlockHeight, BootstrapError> {
        let last_accepted_id = self.vm.last_accepted()?;
        let last_accepted = self
            .vm
            .get_block(&last_accepted_id)?
            .ok_or(BootstrapError::MissingLastAcceptedBlock {
                block: last_accepted_id,
            })?;
        Ok(last_accepted.height)
    }
}

/// How much longer a task that has completed `progress` out of `total` steps since `start` is
/// expected to take at the current rate.
fn estimate_eta(start: Instant, progress: u64, total: u64) -> Duration {
    if progress == 0 || total <= progress {
        return Duration::ZERO;
    }
    let elapsed = start.elapsed();
    let estimated_total = elapsed.mul_f64(total as f64 / progress as f64);
    estimated_total.saturating_sub(elapsed)
}

/// Errors that escape the bootstrapper's entry points.
///
/// Peer-originated failures (timeouts, malformed or unhelpful responses) never surface here: they
/// are recovered internally by re-issuing fetches. What remains is fatal, and the host should
/// abort chain startup when it sees one.
#[derive(Debug)]
pub enum BootstrapError {
    /// A stake-weighted sample could not be drawn to seed the frontier poll.
    Sampling(SampleError),
    /// The VM failed outside of the recoverable parse path.
    Vm(VmError),
    /// A write batch could not be committed, or the store could not be cleared.
    Store(KVStoreError),
    /// Persisted engine state could not be read back.
    StoreRead(KVGetError),
    /// The VM reported a last-accepted id and then failed to produce the block for it.
    MissingLastAcceptedBlock { block: BlockId },
    /// The fetch pool and the preferred-peers fallback are both empty while blocks are missing.
    NoPeersToFetchFrom { block: BlockId },
    /// The restart-delay timer fired while the engine was not awaiting it.
    UnexpectedTimeout,
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Sampling(err) => write!(f, "failed to sample frontier peers: {}", err),
            BootstrapError::Vm(err) => write!(f, "vm failure: {}", err),
            BootstrapError::Store(err) => write!(f, "store failure: {}", err),
            BootstrapError::StoreRead(err) => write!(f, "store read failure: {}", err),
            BootstrapError::MissingLastAcceptedBlock { block } => {
                write!(f, "vm does not hold its own last accepted block {:?}", block)
            }
            BootstrapError::NoPeersToFetchFrom { block } => {
                write!(f, "dropping request for {:?}: no peers to fetch from", block)
            }
            BootstrapError::UnexpectedTimeout => write!(f, "unexpected timeout fired"),
        }
    }
}

impl From<SampleError> for BootstrapError {
    fn from(err: SampleError) -> Self {
        BootstrapError::Sampling(err)
    }
}

impl From<VmError> for BootstrapError {
    fn from(err: VmError) -> Self {
        BootstrapError::Vm(err)
    }
}

impl From<KVStoreError> for BootstrapError {
    fn from(err: KVStoreError) -> Self {
        BootstrapError::Store(err)
    }
}

impl From<KVGetError> for BootstrapError {
    fn from(err: KVGetError) -> Self {
        BootstrapError::StoreRead(err)
    }
}
