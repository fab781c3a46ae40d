/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Traits for the host-side collaborators that the bootstrapper consults but does not own:
//! startup gating, subnet-wide progress, one-shot timers, and the validator registry.

use std::collections::HashSet;
use std::time::Duration;

use ed25519_dalek::VerifyingKey;

use crate::types::basic::{ChainId, PeerVersion};
use crate::types::validator_set::ValidatorSet;

/// Tracks whether enough stake is connected for bootstrapping to begin, and which connected peers
/// are currently good candidates to fetch from.
pub trait StartupTracker {
    /// A peer connected. Lifecycle pass-through.
    fn connected(&mut self, peer: &VerifyingKey, version: &PeerVersion);

    /// A peer disconnected. Lifecycle pass-through.
    fn disconnected(&mut self, peer: &VerifyingKey);

    /// Whether the bootstrap protocol should start. The threshold is the tracker's business; the
    /// bootstrapper just asks.
    fn should_start(&self) -> bool;

    /// The currently connected validator peers ranked suitable for fetching ancestors. The
    /// bootstrapper treats this as an opaque set producer and uses it to (re)fill its fetch pool.
    fn preferred_peers(&self) -> HashSet<VerifyingKey>;
}

/// Tracks which chains in this node's subnet have finished bootstrapping.
///
/// A chain that has caught up must keep re-syncing until every chain in the subnet has, so that
/// all of them enter normal operation against a recent tip.
pub trait SubnetTracker {
    /// Record that `chain` has finished a bootstrap round and considers itself caught up.
    fn mark_bootstrapped(&mut self, chain: ChainId);

    /// Whether every chain in the subnet is done bootstrapping.
    fn is_bootstrapped(&self) -> bool;
}

/// One-shot timer used to delay re-polling while other chains in the subnet are still syncing.
///
/// When the registered duration elapses, the host must call
/// [`Bootstrapper::timeout`](crate::bootstrap::Bootstrapper::timeout).
pub trait TimeoutScheduler {
    fn register_timeout(&mut self, after: Duration);
}

/// Read access to the registry of validators for the chain being bootstrapped.
///
/// The bootstrapper reads the set afresh at the start of every round, so registry updates between
/// rounds are picked up naturally.
pub trait ValidatorRegistry {
    fn validator_set(&self) -> ValidatorSet;
}
