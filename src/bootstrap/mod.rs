/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The protocol that brings a freshly started node's local chain into agreement with the rest of
//! the network before it participates in consensus.
//!
//! The bootstrapper repeatedly performs the following sequence:
//!
//! 1. Wait until the startup tracker reports that a sufficient amount of stake is connected.
//! 2. Sample a small number of peers, weighted by stake, to learn candidate last-accepted block
//!    ids (the "accepted frontier").
//! 3. Verify against the full validator set that a candidate from step 2 is accepted by a
//!    stake-weighted majority.
//! 4. Sync the full ancestry of the accepted blocks, persisting every fetched block.
//! 5. Execute all the fetched blocks that haven't already been executed.
//! 6. Restart the protocol until the number of blocks executed during a round stops halving.
//!
//! Because of step 6 the protocol is generally performed multiple times; each restart catches the
//! tip that moved while the previous round was executing.
//!
//! The engine is single-threaded by contract: the host must call every entry point of
//! [`Bootstrapper`] under the chain's mutual-exclusion discipline (one message handler at a time
//! per chain), which is what makes all of the engine's internal state race-free without locks.

mod bootstrapper;
pub use bootstrapper::{Bootstrapper, BootstrapError};

pub(crate) mod fetch;

pub(crate) mod poll;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cooperative cancellation flag.
///
/// The bootstrapper checks it between block executions, so a host that is shutting down can stop
/// a long execute pass at the next block boundary.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
