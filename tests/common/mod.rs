//! Shared scaffolding for the integration tests: a mock network, an in-memory store, a
//! deterministic test VM, mock trackers, and a harness that plays the role of the host and of
//! every validator peer.

pub mod mem_db;
pub mod network;
pub mod trackers;
pub mod vm;

use std::{
    iter,
    sync::{
        mpsc::{self, Receiver},
        Arc, Mutex,
    },
};

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand_core::OsRng;

use bootstrap_rs::config::BootstrapConfig;
use bootstrap_rs::events::Event;
use bootstrap_rs::networking::messages::Message;
use bootstrap_rs::networking::network::Network;
use bootstrap_rs::types::basic::{BlockId, ChainId, Power, RequestId};
use bootstrap_rs::types::block::Block;
use bootstrap_rs::types::validator_set::ValidatorSet;
use bootstrap_rs::Bootstrapper;

use self::mem_db::MemDB;
use self::network::{mock_network, NetworkStub};
use self::trackers::{FixedRegistry, TestStartupTracker, TestSubnetTracker, TestTimer};
use self::vm::{make_chain, TestVm};

pub const TEST_CHAIN_ID: ChainId = ChainId::new(7);

/// A bootstrapping node under test, together with the validator peers the harness impersonates.
pub struct TestNet {
    pub validator_keys: Vec<VerifyingKey>,
    validator_stubs: Vec<NetworkStub>,
    inboxes: Vec<Vec<Message>>,

    pub chain: Vec<Block>,
    pub vm: TestVm,
    pub db: MemDB,
    pub startup: TestStartupTracker,
    pub subnet: TestSubnetTracker,
    pub timer: TestTimer,
    pub finished: Arc<Mutex<Option<RequestId>>>,
    pub bootstrapped_fired: Arc<Mutex<u32>>,
    pub events: Receiver<Event>,

    pub engine: Bootstrapper<NetworkStub, MemDB, TestVm>,
}

/// Build a network of `num_validators` stake-1 validators around a fresh node.
///
/// The harness pre-builds a linear chain of `chain_len` blocks past genesis; the node's VM starts
/// out having accepted the chain up to (and including) height `accepted_up_to`.
pub fn setup(
    num_validators: usize,
    chain_len: u64,
    accepted_up_to: u64,
    subnet_done: bool,
) -> TestNet {
    let mut csprg = OsRng {};
    let node_key = SigningKey::generate(&mut csprg).verifying_key();
    let validator_keys: Vec<VerifyingKey> = (0..num_validators)
        .map(|_| SigningKey::generate(&mut csprg).verifying_key())
        .collect();

    let mut stubs = mock_network(iter::once(node_key).chain(validator_keys.iter().copied()));
    let node_stub = stubs.remove(0);

    let chain = make_chain(chain_len);
    let vm = TestVm::new(chain[..=accepted_up_to as usize].to_vec());
    let db = MemDB::new();

    let mut validator_set = ValidatorSet::new();
    for key in &validator_keys {
        validator_set.put(key, Power::new(1));
    }

    let startup = TestStartupTracker::new(true, validator_keys.clone());
    let subnet = TestSubnetTracker::new(subnet_done);
    let timer = TestTimer::new();

    let finished = Arc::new(Mutex::new(None));
    let bootstrapped_fired = Arc::new(Mutex::new(0u32));
    let (event_publisher, events) = mpsc::channel();

    let mut config = BootstrapConfig::new(TEST_CHAIN_ID);
    config.sample_k = num_validators.max(1);

    let engine = Bootstrapper::new(
        config,
        node_stub,
        db.clone(),
        vm.clone(),
        Box::new(FixedRegistry::new(validator_set)),
        Box::new(startup.clone()),
        Box::new(subnet.clone()),
        Box::new(timer.clone()),
        Some(Box::new({
            let fired = bootstrapped_fired.clone();
            move || {
                *fired.lock().unwrap() += 1;
            }
        })),
        Box::new({
            let finished = finished.clone();
            move |request_id| {
                *finished.lock().unwrap() = Some(request_id);
            }
        }),
        Some(event_publisher),
    );

    TestNet {
        inboxes: vec![Vec::new(); validator_keys.len()],
        validator_keys,
        validator_stubs: stubs,
        chain,
        vm,
        db,
        startup,
        subnet,
        timer,
        finished,
        bootstrapped_fired,
        events,
        engine,
    }
}

impl TestNet {
    /// Move every message the node has sent so far into the per-validator inboxes.
    fn pump(&mut self) {
        for (i, stub) in self.validator_stubs.iter_mut().enumerate() {
            while let Some((_, message)) = stub.recv() {
                self.inboxes[i].push(message);
            }
        }
    }

    /// Every validator answers the current frontier poll with `tip`.
    pub fn answer_frontier(&mut self, tip: BlockId) {
        self.pump();
        for i in 0..self.validator_keys.len() {
            let request_id = take_all_matching(&mut self.inboxes[i], |message| match message {
                Message::GetAcceptedFrontier(msg) => Some(msg.request_id),
                _ => None,
            })
            .pop()
            .expect("every validator should have received a GetAcceptedFrontier");
            self.engine
                .accepted_frontier(self.validator_keys[i], request_id, tip)
                .unwrap();
        }
    }

    /// Every validator that was asked answers the current acceptance poll with `votes`.
    ///
    /// Replies that arrive after the poll finalized early are delivered anyway; the engine is
    /// expected to drop them as stale.
    pub fn answer_accepted(&mut self, votes: &[BlockId]) {
        self.pump();
        for i in 0..self.validator_keys.len() {
            let request_id = take_all_matching(&mut self.inboxes[i], |message| match message {
                Message::GetAccepted(msg) => Some(msg.request_id),
                _ => None,
            })
            .pop()
            .expect("every validator should have received a GetAccepted");
            self.engine
                .accepted(self.validator_keys[i], request_id, votes.to_vec())
                .unwrap();
            self.pump();
        }
    }

    /// The next pending ancestors request: which validator it went to, its request id, and the
    /// requested block.
    pub fn expect_get_ancestors(&mut self) -> (usize, RequestId, BlockId) {
        self.pump();
        for i in 0..self.validator_keys.len() {
            if let Some((request_id, container)) =
                take_all_matching(&mut self.inboxes[i], |message| match message {
                    Message::GetAncestors(msg) => Some((msg.request_id, msg.container)),
                    _ => None,
                })
                .pop()
            {
                return (i, request_id, container);
            }
        }
        panic!("no validator received a GetAncestors");
    }

    /// Assert that no validator has an unanswered ancestors request.
    pub fn assert_no_get_ancestors(&mut self) {
        self.pump();
        for inbox in &self.inboxes {
            assert!(!inbox
                .iter()
                .any(|message| matches!(message, Message::GetAncestors(_))));
        }
    }

    /// Have validator `validator` answer ancestors request `request_id` with the chain segment
    /// from `from` down to (and including) height `lowest`, child-first.
    pub fn serve_ancestors(
        &mut self,
        validator: usize,
        request_id: RequestId,
        from: BlockId,
        lowest: u64,
    ) {
        let top = self
            .chain
            .iter()
            .position(|block| block.id == from)
            .expect("the requested block should be on the harness chain");
        let blocks: Vec<Vec<u8>> = (lowest as usize..=top)
            .rev()
            .map(|height| self.chain[height].bytes.clone())
            .collect();
        self.engine
            .ancestors(self.validator_keys[validator], request_id, blocks)
            .unwrap();
    }

    /// Drain every event published so far.
    pub fn drain_events(&self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Remove every message matching `extract` from `inbox`, returning the extracted values in order.
fn take_all_matching<T>(
    inbox: &mut Vec<Message>,
    extract: impl Fn(&Message) -> Option<T>,
) -> Vec<T> {
    let mut taken = Vec::new();
    inbox.retain(|message| match extract(message) {
        Some(value) => {
            taken.push(value);
            false
        }
        None => true,
    });
    taken
}
