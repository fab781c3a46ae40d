/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Immutable parameters that define the behaviour of the bootstrapper. These should not change
//! after the engine is constructed.

use std::time::Duration;

use crate::types::basic::ChainId;

#[derive(Clone)]
pub struct BootstrapConfig {
    /// ID of the chain being bootstrapped. Stamped on every outbound message.
    pub chain_id: ChainId,

    /// Number of peers sampled (weighted by stake) to seed the accepted frontier.
    pub sample_k: usize,

    /// Cap on how many poll requests may be outstanding at once while fanning out.
    pub max_outstanding_broadcast_requests: usize,

    /// This node will only consider the first `ancestors_max_containers_received` blocks in an
    /// ancestors response it receives.
    pub ancestors_max_containers_received: usize,

    /// How long to wait before re-polling when other chains in the subnet are still syncing.
    pub bootstrapping_delay: Duration,

    /// How many blocks should be fetched or executed between progress log lines. Must be
    /// non-zero.
    pub status_update_frequency: u64,
}

impl BootstrapConfig {
    /// A configuration with the conventional production values for everything but the chain id:
    /// 20 frontier peers, 50 outstanding requests, 2000-block ancestor responses, a 10 second
    /// re-poll delay, and a progress line every 5000 blocks.
    pub fn new(chain_id: ChainId) -> BootstrapConfig {
        BootstrapConfig {
            chain_id,
            sample_k: 20,
            max_outstanding_broadcast_requests: 50,
            ancestors_max_containers_received: 2000,
            bootstrapping_delay: Duration::from_secs(10),
            status_update_frequency: 5000,
        }
    }
}
