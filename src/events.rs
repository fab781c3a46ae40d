/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Notifications that are emitted when significant things happen in the bootstrapper.
//!
//! ## Event enum
//!
//! Significant occurrences include starting a polling round, beginning to fetch ancestors, making
//! fetch or execution progress, restarting the protocol, and finishing.
//!
//! Each of these corresponds to a variant of the [event enum](Event). Each variant tuple in turn
//! contains an inner struct type storing information that summarizes the particular kind of
//! event, always including a timestamp corresponding to the time when the event occurred.
//!
//! ## Registering event handlers
//!
//! Hosts can register event handler closures, which are called by the
//! [event bus](crate::event_bus::start_event_bus) thread when the handler's particular event
//! variant happens. Default handlers that log out events are defined in
//! [logging](crate::logging).
//!
//! ## Timing
//!
//! Events are always emitted **after** the corresponding occurrence is "completed". For example,
//! [`RestartBootstrapEvent`] is only emitted once the previous round's work has been fully
//! executed and the decision to re-poll has been made.

use std::sync::mpsc::Sender;
use std::time::{Duration, SystemTime};

use ed25519_dalek::VerifyingKey;

use crate::types::basic::{BlockId, RequestId};

/// Enumerates all events defined for the bootstrapper.
pub enum Event {
    // Lifecycle events.
    StartBootstrap(StartBootstrapEvent),
    FinishBootstrap(FinishBootstrapEvent),

    // Polling events.
    StartRound(StartRoundEvent),
    NoAcceptedBlocks(NoAcceptedBlocksEvent),

    // Fetch and execution events.
    StartFetch(StartFetchEvent),
    FetchProgress(FetchProgressEvent),
    StartExecute(StartExecuteEvent),
    ExecuteProgress(ExecuteProgressEvent),

    // Convergence events.
    RestartBootstrap(RestartBootstrapEvent),
    AwaitSubnet(AwaitSubnetEvent),
}

impl Event {
    /// Publishes a given instance of the [`Event`] enum on the event publisher channel (if the
    /// channel is defined).
    pub fn publish(self, event_publisher: &Option<Sender<Event>>) {
        if let Some(event_publisher) = event_publisher {
            let _ = event_publisher.send(self);
        }
    }
}

/// The engine entered the bootstrapping state and captured its starting height.
pub struct StartBootstrapEvent {
    pub timestamp: SystemTime,
    pub starting_height: u64,
}

/// The engine handed control to the host: the chain is caught up and the subnet is done.
pub struct FinishBootstrapEvent {
    pub timestamp: SystemTime,
    pub request_id: RequestId,
}

/// A polling round began: frontier peers were sampled from the validator set.
pub struct StartRoundEvent {
    pub timestamp: SystemTime,
    pub sampled: Vec<VerifyingKey>,
    pub num_validators: usize,
}

/// The majority poll finalized with an empty accepted set, so the round is being re-run.
pub struct NoAcceptedBlocksEvent {
    pub timestamp: SystemTime,
    pub num_validators: usize,
}

/// The accepted frontier was confirmed and the ancestor fetch phase began.
pub struct StartFetchEvent {
    pub timestamp: SystemTime,
    pub accepted: Vec<BlockId>,
    pub num_missing: usize,
    pub restarted: bool,
}

/// A batch of ancestors was processed. Emitted every
/// [`status_update_frequency`](crate::config::BootstrapConfig::status_update_frequency) fetched
/// blocks.
pub struct FetchProgressEvent {
    pub timestamp: SystemTime,
    pub fetched: u64,
    pub total: u64,
    pub eta: Duration,
    pub restarted: bool,
}

/// Fetching completed and execution of the downloaded ancestry began.
pub struct StartExecuteEvent {
    pub timestamp: SystemTime,
    pub num_to_execute: u64,
    pub restarted: bool,
}

/// A batch of blocks was executed. Emitted every
/// [`status_update_frequency`](crate::config::BootstrapConfig::status_update_frequency) executed
/// blocks.
pub struct ExecuteProgressEvent {
    pub timestamp: SystemTime,
    pub executed: u64,
    pub total: u64,
    pub eta: Duration,
    pub restarted: bool,
}

/// The round executed fewer than half as many blocks as the previous round, so the whole protocol
/// is being restarted to catch the tip that moved during the sync.
pub struct RestartBootstrapEvent {
    pub timestamp: SystemTime,
    pub executed: u64,
    pub previously_executed: Option<u64>,
}

/// This chain is caught up but other chains in the subnet are not; re-polling is delayed.
pub struct AwaitSubnetEvent {
    pub timestamp: SystemTime,
    pub delay: Duration,
}
