/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The reusable stake-weighted quorum primitive that the bootstrapper runs twice per round.
//!
//! A [`Poll`] tracks a set of source peers, an outstanding-request budget, and a policy that maps
//! received opinions to a terminal result. Two policies exist:
//!
//! 1. [`Minority`]: seeds the frontier. Finalizes once every selected source has answered or
//!    failed; its accepted set is the union of everything reported. Cheap collection of plausible
//!    tip candidates.
//! 2. [`Majority`]: confirms acceptance. Tallies votes by stake against a simple-majority
//!    threshold; a block id enters the accepted set the moment its weight crosses the threshold,
//!    and the poll finalizes as soon as no remaining vote could change the set.
//!
//! Poll instances are re-created at the start of every round; [`Noop`] stands in before the first
//! round begins.

use std::collections::{HashMap, HashSet};

use ed25519_dalek::VerifyingKey;

use crate::types::basic::{BlockId, Power, TotalPower};

pub(crate) trait Poll: Send {
    /// The next subset of source peers to query, bounded by the remaining outstanding budget.
    /// Empty when every source has been queried or is in flight.
    fn get_peers(&mut self) -> Vec<VerifyingKey>;

    /// Register `peer`'s vote. An empty `containers` is a negative vote, and is still consumed.
    /// Opinions from peers that are not in flight are ignored, so each source counts at most once.
    fn record_opinion(&mut self, peer: VerifyingKey, containers: Vec<BlockId>);

    /// The accepted set so far, and whether the poll has finalized.
    fn result(&self) -> (Vec<BlockId>, bool);
}

/// The poll that is in place before a round starts: no sources, never finalizes.
pub(crate) struct Noop;

impl Poll for Noop {
    fn get_peers(&mut self) -> Vec<VerifyingKey> {
        Vec::new()
    }

    fn record_opinion(&mut self, _: VerifyingKey, _: Vec<BlockId>) {}

    fn result(&self) -> (Vec<BlockId>, bool) {
        (Vec::new(), false)
    }
}

/// Bookkeeping shared by both policies: which sources have not been queried yet, which are in
/// flight, and how many requests may be outstanding at once.
struct Outstanding {
    pending: Vec<VerifyingKey>,
    in_flight: HashSet<VerifyingKey>,
    max_outstanding: usize,
}

impl Outstanding {
    fn new(pending: Vec<VerifyingKey>, max_outstanding: usize) -> Outstanding {
        Outstanding {
            pending,
            in_flight: HashSet::new(),
            max_outstanding,
        }
    }

    fn get_peers(&mut self) -> Vec<VerifyingKey> {
        let budget = self.max_outstanding.saturating_sub(self.in_flight.len());
        let take = budget.min(self.pending.len());
        let peers: Vec<VerifyingKey> = self.pending.drain(..take).collect();
        self.in_flight.extend(peers.iter().copied());
        peers
    }

    fn record_response(&mut self, peer: &VerifyingKey) -> bool {
        self.in_flight.remove(peer)
    }

    fn finished(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }
}

/// The frontier-seeding policy.
pub(crate) struct Minority {
    outstanding: Outstanding,
    received: HashSet<BlockId>,
}

impl Minority {
    pub(crate) fn new(sampled: Vec<VerifyingKey>, max_outstanding: usize) -> Minority {
        Minority {
            outstanding: Outstanding::new(sampled, max_outstanding),
            received: HashSet::new(),
        }
    }
}

impl Poll for Minority {
    fn get_peers(&mut self) -> Vec<VerifyingKey> {
        self.outstanding.get_peers()
    }

    fn record_opinion(&mut self, peer: VerifyingKey, containers: Vec<BlockId>) {
        if !self.outstanding.record_response(&peer) {
            return;
        }
        self.received.extend(containers);
    }

    fn result(&self) -> (Vec<BlockId>, bool) {
        (
            self.received.iter().copied().collect(),
            self.outstanding.finished(),
        )
    }
}

/// The acceptance-confirmation policy.
pub(crate) struct Majority {
    outstanding: Outstanding,
    weights: HashMap<VerifyingKey, Power>,
    votes: HashMap<BlockId, TotalPower>,
    accepted: Vec<BlockId>,
    threshold: TotalPower,
    /// Total power of the sources that have not voted yet.
    remaining: u128,
}

impl Majority {
    pub(crate) fn new(weights: HashMap<VerifyingKey, Power>, max_outstanding: usize) -> Majority {
        let total: u128 = weights.values().map(|power| power.int() as u128).sum();
        let sources = weights.keys().copied().collect();
        Majority {
            outstanding: Outstanding::new(sources, max_outstanding),
            weights,
            votes: HashMap::new(),
            accepted: Vec::new(),
            threshold: TotalPower::new(total / 2 + 1),
            remaining: total,
        }
    }

    /// Whether any vote still outstanding could add a block id to the accepted set. Votes only
    /// ever add weight, so the accepted set grows monotonically and this is the only way the
    /// result can change.
    fn could_still_change(&self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        // A block id we have not seen yet could be crossed over by the full remaining weight.
        if self.remaining >= self.threshold.int() {
            return true;
        }
        self.votes.iter().any(|(id, weight)| {
            !self.accepted.contains(id) && weight.int() + self.remaining >= self.threshold.int()
        })
    }
}

impl Poll for Majority {
    fn get_peers(&mut self) -> Vec<VerifyingKey> {
        self.outstanding.get_peers()
    }

    fn record_opinion(&mut self, peer: VerifyingKey, containers: Vec<BlockId>) {
        if !self.outstanding.record_response(&peer) {
            return;
        }
        let power = match self.weights.get(&peer) {
            Some(power) => *power,
            None => return,
        };
        self.remaining -= power.int() as u128;

        let distinct: HashSet<BlockId> = containers.into_iter().collect();
        for id in distinct {
            let tally = self.votes.entry(id).or_insert(TotalPower::new(0));
            *tally += power;
            if *tally >= self.threshold && !self.accepted.contains(&id) {
                self.accepted.push(id);
            }
        }
    }

    fn result(&self) -> (Vec<BlockId>, bool) {
        (self.accepted.clone(), !self.could_still_change())
    }
}
