/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Types that exist only to store bytes or numbers, and do not have any major "active" behavior.

use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::AddAssign,
};

use borsh::{BorshDeserialize, BorshSerialize};

/// Number that uniquely identifies a blockchain.
///
/// Every peer answering polls and serving ancestors for the same chain should be configured with the
/// same `ChainId`, which in turn should be unique between different chains.
#[derive(Clone, Copy, PartialEq, Eq, Debug, BorshDeserialize, BorshSerialize)]
pub struct ChainId(u64);

impl ChainId {
    /// Create a new `ChainId` with an `int` value.
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    /// Get the `u64` value of this `ChainId`.
    pub const fn int(&self) -> u64 {
        self.0
    }
}

/// Height of a block in the chain.
///
/// Starts at 0 for the genesis block and increases by 1 for every subsequent block connected by
/// parent links.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, BorshDeserialize, BorshSerialize)]
pub struct BlockHeight(u64);

impl BlockHeight {
    /// Create a new `BlockHeight` with an `int` inner value.
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    /// Get the inner `u64` value of this `BlockHeight`.
    pub const fn int(&self) -> u64 {
        self.0
    }

    /// Get the big-endian representation of the inner `u64` value of this `BlockHeight`.
    ///
    /// Big-endian so that the lexicographic order of encoded heights equals their numeric order,
    /// which is what makes the persisted interval entries iterable in ascending height order.
    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl Display for BlockHeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Number that a node uses to match a response from a peer to the request that solicited it.
///
/// The bootstrapper keeps a single live `RequestId` and bumps it for every poll phase and every
/// ancestors fetch; responses carrying any other id are stale and are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub struct RequestId(u32);

impl RequestId {
    /// Create a new `RequestId` with an `int` inner value.
    pub const fn new(int: u32) -> Self {
        Self(int)
    }

    /// Get the inner `u32` value of this `RequestId`.
    pub const fn int(&self) -> u32 {
        self.0
    }

    /// Advance to the next `RequestId`, wrapping on overflow.
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The stake weight that a single validator has in the polls run by the bootstrapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct Power(u64);

impl Power {
    /// Create a new `Power` wrapping `int`.
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    /// Get the inner `u64` value of this `Power`.
    pub const fn int(&self) -> u64 {
        self.0
    }
}

/// Sum of the [`Power`]s of a set of validators.
///
/// The inner type that this newtype wraps around is `u128`, which is bigger than the inner `u64`
/// that `Power` wraps around. This is so that summing up large `Power`s does not cause
/// `TotalPower`'s inner value to overflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, BorshDeserialize, BorshSerialize)]
pub struct TotalPower(u128);

impl TotalPower {
    /// Create a new `TotalPower` wrapping `int`.
    pub const fn new(int: u128) -> Self {
        Self(int)
    }

    /// Get the inner `u128` value of this `TotalPower`.
    pub const fn int(&self) -> u128 {
        self.0
    }
}

impl AddAssign<Power> for TotalPower {
    fn add_assign(&mut self, rhs: Power) {
        self.0.add_assign(rhs.0 as u128)
    }
}

/// The 32-byte digest that identifies a block.
///
/// `BlockId`s are produced by the host VM when it parses block bytes; the bootstrapper treats them
/// as opaque.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BorshDeserialize, BorshSerialize)]
pub struct BlockId([u8; 32]);

impl BlockId {
    /// Create a new `BlockId` wrapping `bytes`.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the inner byte array of this `BlockId`.
    pub const fn bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Debug for BlockId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The application version a peer reported on connection.
///
/// The bootstrapper does not interpret versions; it passes them through to the VM and the startup
/// tracker, which may use them to decide whether enough of the network is compatible to start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct PeerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PeerVersion {
    /// Create a new `PeerVersion` with the given components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Display for PeerVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}
