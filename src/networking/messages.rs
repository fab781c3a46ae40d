/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions for structured messages that are sent between peers as part of the bootstrap
//! protocol.
//!
//! ## Messages
//!
//! The protocol defines three request/response pairs:
//!
//! 1. [`GetAcceptedFrontier`]/[`AcceptedFrontier`]: ask a sampled peer for the single block id at
//!    the tip of its accepted chain.
//! 2. [`GetAccepted`]/[`Accepted`]: ask a validator which of a set of candidate block ids it
//!    considers accepted.
//! 3. [`GetAncestors`]/[`Ancestors`]: ask a peer for a block and as many of its ancestors as fit
//!    in one response, as raw bytes, ordered child-first.
//!
//! Request timeouts are not messages: the host's timeout manager reports them to the engine
//! directly through the `*_failed` entry points.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::types::basic::{BlockId, ChainId, RequestId};

/// Messages exchanged between peers while bootstrapping.
#[derive(Clone, BorshSerialize, BorshDeserialize)]
pub enum Message {
    GetAcceptedFrontier(GetAcceptedFrontier),
    AcceptedFrontier(AcceptedFrontier),
    GetAccepted(GetAccepted),
    Accepted(Accepted),
    GetAncestors(GetAncestors),
    Ancestors(Ancestors),
}

impl Message {
    pub fn chain_id(&self) -> ChainId {
        match self {
            Message::GetAcceptedFrontier(msg) => msg.chain_id,
            Message::AcceptedFrontier(msg) => msg.chain_id,
            Message::GetAccepted(msg) => msg.chain_id,
            Message::Accepted(msg) => msg.chain_id,
            Message::GetAncestors(msg) => msg.chain_id,
            Message::Ancestors(msg) => msg.chain_id,
        }
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            Message::GetAcceptedFrontier(msg) => msg.request_id,
            Message::AcceptedFrontier(msg) => msg.request_id,
            Message::GetAccepted(msg) => msg.request_id,
            Message::Accepted(msg) => msg.request_id,
            Message::GetAncestors(msg) => msg.request_id,
            Message::Ancestors(msg) => msg.request_id,
        }
    }
}

/// Request for the receiver's current accepted frontier: the id of the last block it accepted.
#[derive(Clone, BorshSerialize, BorshDeserialize)]
pub struct GetAcceptedFrontier {
    pub chain_id: ChainId,
    pub request_id: RequestId,
}

/// A peer's answer to [`GetAcceptedFrontier`]: a single block id.
#[derive(Clone, BorshSerialize, BorshDeserialize)]
pub struct AcceptedFrontier {
    pub chain_id: ChainId,
    pub request_id: RequestId,
    pub container: BlockId,
}

/// Request for the subset of `containers` that the receiver considers accepted.
#[derive(Clone, BorshSerialize, BorshDeserialize)]
pub struct GetAccepted {
    pub chain_id: ChainId,
    pub request_id: RequestId,
    pub containers: Vec<BlockId>,
}

/// A validator's answer to [`GetAccepted`]: the candidate ids it has accepted.
#[derive(Clone, BorshSerialize, BorshDeserialize)]
pub struct Accepted {
    pub chain_id: ChainId,
    pub request_id: RequestId,
    pub containers: Vec<BlockId>,
}

/// Request for `container` and its ancestors.
#[derive(Clone, BorshSerialize, BorshDeserialize)]
pub struct GetAncestors {
    pub chain_id: ChainId,
    pub request_id: RequestId,
    pub container: BlockId,
}

/// A peer's answer to [`GetAncestors`]: raw block bytes ordered child-first. The first entry must
/// be the requested block; a response that leads with anything else is discarded whole.
#[derive(Clone, BorshSerialize, BorshDeserialize)]
pub struct Ancestors {
    pub chain_id: ChainId,
    pub request_id: RequestId,
    pub blocks: Vec<Vec<u8>>,
}

impl From<GetAcceptedFrontier> for Message {
    fn from(msg: GetAcceptedFrontier) -> Self {
        Message::GetAcceptedFrontier(msg)
    }
}

impl From<AcceptedFrontier> for Message {
    fn from(msg: AcceptedFrontier) -> Self {
        Message::AcceptedFrontier(msg)
    }
}

impl From<GetAccepted> for Message {
    fn from(msg: GetAccepted) -> Self {
        Message::GetAccepted(msg)
    }
}

impl From<Accepted> for Message {
    fn from(msg: Accepted) -> Self {
        Message::Accepted(msg)
    }
}

impl From<GetAncestors> for Message {
    fn from(msg: GetAncestors) -> Self {
        Message::GetAncestors(msg)
    }
}

impl From<Ancestors> for Message {
    fn from(msg: Ancestors) -> Self {
        Message::Ancestors(msg)
    }
}
