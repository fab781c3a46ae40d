//! Mock implementations of the bootstrapper's host-side collaborators.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use bootstrap_rs::tracker::{StartupTracker, SubnetTracker, TimeoutScheduler, ValidatorRegistry};
use bootstrap_rs::types::basic::{ChainId, PeerVersion};
use bootstrap_rs::types::validator_set::ValidatorSet;
use ed25519_dalek::VerifyingKey;

struct TestStartupTrackerInner {
    should_start: bool,
    preferred: Vec<VerifyingKey>,
    connected: HashSet<VerifyingKey>,
}

/// A startup tracker whose verdicts the test sets directly.
#[derive(Clone)]
pub struct TestStartupTracker(Arc<Mutex<TestStartupTrackerInner>>);

impl TestStartupTracker {
    pub fn new(should_start: bool, preferred: Vec<VerifyingKey>) -> TestStartupTracker {
        TestStartupTracker(Arc::new(Mutex::new(TestStartupTrackerInner {
            should_start,
            preferred,
            connected: HashSet::new(),
        })))
    }

    pub fn set_should_start(&self, should_start: bool) {
        self.0.lock().unwrap().should_start = should_start;
    }
}

impl StartupTracker for TestStartupTracker {
    fn connected(&mut self, peer: &VerifyingKey, _: &PeerVersion) {
        self.0.lock().unwrap().connected.insert(*peer);
    }

    fn disconnected(&mut self, peer: &VerifyingKey) {
        self.0.lock().unwrap().connected.remove(peer);
    }

    fn should_start(&self) -> bool {
        self.0.lock().unwrap().should_start
    }

    fn preferred_peers(&self) -> HashSet<VerifyingKey> {
        self.0.lock().unwrap().preferred.iter().copied().collect()
    }
}

struct TestSubnetTrackerInner {
    done: bool,
    marked: Vec<ChainId>,
}

/// A subnet tracker whose "everyone is done" verdict the test flips by hand.
#[derive(Clone)]
pub struct TestSubnetTracker(Arc<Mutex<TestSubnetTrackerInner>>);

impl TestSubnetTracker {
    pub fn new(done: bool) -> TestSubnetTracker {
        TestSubnetTracker(Arc::new(Mutex::new(TestSubnetTrackerInner {
            done,
            marked: Vec::new(),
        })))
    }

    pub fn set_done(&self, done: bool) {
        self.0.lock().unwrap().done = done;
    }

    pub fn marked(&self) -> Vec<ChainId> {
        self.0.lock().unwrap().marked.clone()
    }
}

impl SubnetTracker for TestSubnetTracker {
    fn mark_bootstrapped(&mut self, chain: ChainId) {
        self.0.lock().unwrap().marked.push(chain);
    }

    fn is_bootstrapped(&self) -> bool {
        self.0.lock().unwrap().done
    }
}

/// A timer that only records what was asked of it.
#[derive(Clone)]
pub struct TestTimer(Arc<Mutex<Vec<Duration>>>);

impl TestTimer {
    pub fn new() -> TestTimer {
        TestTimer(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn registered(&self) -> Vec<Duration> {
        self.0.lock().unwrap().clone()
    }
}

impl TimeoutScheduler for TestTimer {
    fn register_timeout(&mut self, after: Duration) {
        self.0.lock().unwrap().push(after);
    }
}

/// A validator registry holding a fixed validator set.
#[derive(Clone)]
pub struct FixedRegistry(Arc<Mutex<ValidatorSet>>);

impl FixedRegistry {
    pub fn new(validator_set: ValidatorSet) -> FixedRegistry {
        FixedRegistry(Arc::new(Mutex::new(validator_set)))
    }
}

impl ValidatorRegistry for FixedRegistry {
    fn validator_set(&self) -> ValidatorSet {
        self.0.lock().unwrap().clone()
    }
}
