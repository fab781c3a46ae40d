/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Types that store information about the validators whose stake backs the bootstrap polls.

use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    slice,
};

use rand::Rng;

use super::basic::{Power, TotalPower};

pub use ed25519_dalek::VerifyingKey;

/// Stores the identities of validators and their stake powers.
///
/// ## Ordering of validators
///
/// `ValidatorSet` internally maintains the list of validators in ascending order of their
/// `VerifyingKey`s, and avails the methods [`validators`](ValidatorSet::validators) and
/// [`validators_and_powers`](ValidatorSet::validators_and_powers) that users can use to get them in
/// this order.
///
/// ## Limits to total power
///
/// Users must make sure that the total power of the validator set does not exceed `u128::MAX/2`.
#[derive(Clone, PartialEq, Debug)]
pub struct ValidatorSet {
    // The verifying keys of validators are included here in ascending order.
    validators: Vec<VerifyingKey>,
    powers: HashMap<VerifyingKey, Power>,
}

impl Default for ValidatorSet {
    fn default() -> Self {
        ValidatorSet::new()
    }
}

impl ValidatorSet {
    /// Create an empty validator set.
    pub fn new() -> ValidatorSet {
        Self {
            validators: Vec::new(),
            powers: HashMap::new(),
        }
    }

    /// Put a `validator` with the specified `power` into the validator set, placing them in a
    /// position that preserves the ordering of validators.
    ///
    /// If `validator` already exists in the validator set, this function updates its power instead.
    pub fn put(&mut self, validator: &VerifyingKey, power: Power) {
        if !self.contains(validator) {
            let validator_bytes = validator.to_bytes();
            let insert_pos = self
                .validators
                .binary_search_by(|v| v.to_bytes().cmp(&validator_bytes))
                .unwrap_err();
            self.validators.insert(insert_pos, *validator);
        }

        self.powers.insert(*validator, power);
    }

    /// Remove `validator` from the validator set, if it actually is in the validator set.
    pub fn remove(&mut self, validator: &VerifyingKey) -> Option<(VerifyingKey, Power)> {
        let validator_bytes = validator.to_bytes();
        if let Ok(pos) = self
            .validators
            .binary_search_by(|v| v.to_bytes().cmp(&validator_bytes))
        {
            self.validators.remove(pos);
            self.powers.remove_entry(validator)
        } else {
            None
        }
    }

    /// Get the power of the specified `validator` inside the validator set.
    pub fn power(&self, validator: &VerifyingKey) -> Option<&Power> {
        self.powers.get(validator)
    }

    /// Get the sum of the powers of all of the validators inside the validator set.
    pub fn total_power(&self) -> TotalPower {
        let mut total_power = TotalPower::new(0);
        for power in self.powers.values() {
            total_power += *power
        }
        total_power
    }

    /// Check whether the validator set contains `validator`.
    pub fn contains(&self, validator: &VerifyingKey) -> bool {
        self.powers.contains_key(validator)
    }

    /// Get an iterator through validators' verifying keys which walks through them in ascending
    /// order.
    pub fn validators(&self) -> slice::Iter<VerifyingKey> {
        self.validators.iter()
    }

    /// Get a vector containing each validator and its power, in ascending order of the validators'
    /// verifying keys.
    pub fn validators_and_powers(&self) -> Vec<(VerifyingKey, Power)> {
        self.validators()
            .map(|v| (*v, *self.power(v).unwrap()))
            .collect()
    }

    /// Get the number of validators currently in the validator set.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check whether the validator set is empty (i.e., `self.len() == 0`).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draw up to `k` distinct validators, weighted by stake, without replacement.
    ///
    /// At most `min(k, self.len())` validators are returned. An empty validator set yields an empty
    /// sample. The only failure mode is a non-empty validator set whose total power is zero, in
    /// which case no stake-weighted draw is possible.
    pub fn sample_weighted(&self, k: usize) -> Result<Vec<VerifyingKey>, SampleError> {
        let mut candidates: Vec<(VerifyingKey, u128)> = self
            .validators_and_powers()
            .into_iter()
            .filter(|(_, power)| power.int() > 0)
            .map(|(validator, power)| (validator, power.int() as u128))
            .collect();

        if candidates.is_empty() {
            if self.is_empty() {
                return Ok(Vec::new());
            }
            return Err(SampleError::InsufficientWeight);
        }

        let mut remaining_power: u128 = candidates.iter().map(|(_, power)| power).sum();
        let mut rng = rand::thread_rng();
        let mut sampled = Vec::with_capacity(k.min(candidates.len()));

        while sampled.len() < k && !candidates.is_empty() {
            let mut point = rng.gen_range(0..remaining_power);
            let position = candidates
                .iter()
                .position(|(_, power)| {
                    if point < *power {
                        true
                    } else {
                        point -= *power;
                        false
                    }
                })
                .expect("sample point falls within the remaining power by construction");

            let (validator, power) = candidates.swap_remove(position);
            remaining_power -= power;
            sampled.push(validator);
        }

        Ok(sampled)
    }
}

/// Error when trying to draw a stake-weighted sample from a [`ValidatorSet`].
#[derive(Debug)]
pub enum SampleError {
    /// The validator set is non-empty but its total power is zero.
    InsufficientWeight,
}

impl Display for SampleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::InsufficientWeight => {
                write!(f, "cannot sample a validator set with zero total power")
            }
        }
    }
}
