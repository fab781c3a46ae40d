/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out events.
//!
//! The bootstrapper logs using the [log](https://docs.rs/log/latest/log/) crate. To get these
//! messages printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values
//! are always:
//! 1. The name of the [event](crate::events) in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. Block ids and peer keys are
//! printed as the first seven characters of their Base64 encoding.
//!
//! ## Log levels
//!
//! Fetch and execution progress lines are emitted at `info` while the first protocol round is
//! running and at `debug` once the protocol has restarted, since restarts repeat the same phases
//! with ever smaller amounts of work.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use std::time::SystemTime;

use crate::events::*;

// Names of each event in PascalCase for printing:
pub const START_BOOTSTRAP: &str = "StartBootstrap";
pub const FINISH_BOOTSTRAP: &str = "FinishBootstrap";

pub const START_ROUND: &str = "StartRound";
pub const NO_ACCEPTED_BLOCKS: &str = "NoAcceptedBlocks";

pub const START_FETCH: &str = "StartFetch";
pub const FETCH_PROGRESS: &str = "FetchProgress";
pub const START_EXECUTE: &str = "StartExecute";
pub const EXECUTE_PROGRESS: &str = "ExecuteProgress";

pub const RESTART_BOOTSTRAP: &str = "RestartBootstrap";
pub const AWAIT_SUBNET: &str = "AwaitSubnet";

/// Implemented by event types. Used to get a closure that logs the event.
pub trait Logger {
    /// Returns a pointer to the default logging handler for a given event type.
    fn get_logger() -> Box<dyn Fn(&Self) + Send>;
}

impl Logger for StartBootstrapEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |start_bootstrap_event: &StartBootstrapEvent| {
            log::info!(
                "{}, {}, {}",
                START_BOOTSTRAP,
                secs_since_unix_epoch(start_bootstrap_event.timestamp),
                start_bootstrap_event.starting_height
            )
        };
        Box::new(logger)
    }
}

impl Logger for FinishBootstrapEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |finish_bootstrap_event: &FinishBootstrapEvent| {
            log::info!(
                "{}, {}, {}",
                FINISH_BOOTSTRAP,
                secs_since_unix_epoch(finish_bootstrap_event.timestamp),
                finish_bootstrap_event.request_id
            )
        };
        Box::new(logger)
    }
}

impl Logger for StartRoundEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |start_round_event: &StartRoundEvent| {
            let sampled: Vec<String> = start_round_event
                .sampled
                .iter()
                .map(|peer| first_seven_base64_chars(&peer.to_bytes()))
                .collect();
            log::info!(
                "{}, {}, {}, [{}]",
                START_ROUND,
                secs_since_unix_epoch(start_round_event.timestamp),
                start_round_event.num_validators,
                sampled.join(" ")
            )
        };
        Box::new(logger)
    }
}

impl Logger for NoAcceptedBlocksEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |no_accepted_blocks_event: &NoAcceptedBlocksEvent| {
            log::info!(
                "{}, {}, {}",
                NO_ACCEPTED_BLOCKS,
                secs_since_unix_epoch(no_accepted_blocks_event.timestamp),
                no_accepted_blocks_event.num_validators
            )
        };
        Box::new(logger)
    }
}

impl Logger for StartFetchEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |start_fetch_event: &StartFetchEvent| {
            let accepted: Vec<String> = start_fetch_event
                .accepted
                .iter()
                .map(|block| first_seven_base64_chars(&block.bytes()))
                .collect();
            if !start_fetch_event.restarted {
                log::info!(
                    "{}, {}, [{}], {}",
                    START_FETCH,
                    secs_since_unix_epoch(start_fetch_event.timestamp),
                    accepted.join(" "),
                    start_fetch_event.num_missing
                )
            } else {
                log::debug!(
                    "{}, {}, [{}], {}",
                    START_FETCH,
                    secs_since_unix_epoch(start_fetch_event.timestamp),
                    accepted.join(" "),
                    start_fetch_event.num_missing
                )
            }
        };
        Box::new(logger)
    }
}

impl Logger for FetchProgressEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |fetch_progress_event: &FetchProgressEvent| {
            if !fetch_progress_event.restarted {
                log::info!(
                    "{}, {}, {}, {}, {:?}",
                    FETCH_PROGRESS,
                    secs_since_unix_epoch(fetch_progress_event.timestamp),
                    fetch_progress_event.fetched,
                    fetch_progress_event.total,
                    fetch_progress_event.eta
                )
            } else {
                log::debug!(
                    "{}, {}, {}, {}, {:?}",
                    FETCH_PROGRESS,
                    secs_since_unix_epoch(fetch_progress_event.timestamp),
                    fetch_progress_event.fetched,
                    fetch_progress_event.total,
                    fetch_progress_event.eta
                )
            }
        };
        Box::new(logger)
    }
}

impl Logger for StartExecuteEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |start_execute_event: &StartExecuteEvent| {
            if !start_execute_event.restarted {
                log::info!(
                    "{}, {}, {}",
                    START_EXECUTE,
                    secs_since_unix_epoch(start_execute_event.timestamp),
                    start_execute_event.num_to_execute
                )
            } else {
                log::debug!(
                    "{}, {}, {}",
                    START_EXECUTE,
                    secs_since_unix_epoch(start_execute_event.timestamp),
                    start_execute_event.num_to_execute
                )
            }
        };
        Box::new(logger)
    }
}

impl Logger for ExecuteProgressEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |execute_progress_event: &ExecuteProgressEvent| {
            if !execute_progress_event.restarted {
                log::info!(
                    "{}, {}, {}, {}, {:?}",
                    EXECUTE_PROGRESS,
                    secs_since_unix_epoch(execute_progress_event.timestamp),
                    execute_progress_event.executed,
                    execute_progress_event.total,
                    execute_progress_event.eta
                )
            } else {
                log::debug!(
                    "{}, {}, {}, {}, {:?}",
                    EXECUTE_PROGRESS,
                    secs_since_unix_epoch(execute_progress_event.timestamp),
                    execute_progress_event.executed,
                    execute_progress_event.total,
                    execute_progress_event.eta
                )
            }
        };
        Box::new(logger)
    }
}

impl Logger for RestartBootstrapEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |restart_bootstrap_event: &RestartBootstrapEvent| {
            log::info!(
                "{}, {}, {}, {}",
                RESTART_BOOTSTRAP,
                secs_since_unix_epoch(restart_bootstrap_event.timestamp),
                restart_bootstrap_event.executed,
                match restart_bootstrap_event.previously_executed {
                    Some(previous) => previous.to_string(),
                    None => String::from("inf"),
                }
            )
        };
        Box::new(logger)
    }
}

impl Logger for AwaitSubnetEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |await_subnet_event: &AwaitSubnetEvent| {
            log::info!(
                "{}, {}, {:?}",
                AWAIT_SUBNET,
                secs_since_unix_epoch(await_subnet_event.timestamp),
                await_subnet_event.delay
            )
        };
        Box::new(logger)
    }
}

fn first_seven_base64_chars(bytes: &[u8]) -> String {
    let encoded = STANDARD_NO_PAD.encode(bytes);
    if encoded.len() > 7 {
        encoded[0..7].to_string()
    } else {
        encoded
    }
}

fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("Event occured before the Unix Epoch.")
        .as_secs()
}
