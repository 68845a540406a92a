// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Stored distribution records and their canonical load/save helpers.

use crate::core::distribution::error::Result;
use crate::core::economics::coins::DecCoins;
use crate::core::state::store::{KvRead, KvWrite};
use crate::core::types::{decode_canonical_limited, encode_canonical};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Hard cap on a single encoded record.
pub const MAX_RECORD_BYTES: usize = 1 << 20;

/// Open accumulation for a validator's ongoing period.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorCurrentRewards {
    /// Rewards accrued to delegators during `period`.
    pub rewards: DecCoins,
    /// The open period.
    pub period: u64,
}

/// Closed period snapshot. The period number lives in the key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorHistoricalRewards {
    /// Reward per unit of stake from validator creation through the end of the period.
    pub cumulative_reward_ratio: DecCoins,
    /// Starting infos, slash events and the current period that still point here.
    pub reference_count: u16,
}

/// Retroactive stake reduction anchored to a closed period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSlashEvent {
    /// Period closed by the slash.
    pub validator_period: u64,
    /// Block height of the slash.
    pub height: i64,
    /// Fraction of stake removed, in `[0, 1]`.
    pub fraction: Decimal,
}

/// Commission accrued to a validator operator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorAccumulatedCommission {
    /// Accumulated commission.
    pub commission: DecCoins,
}

/// Funds allocated to a validator and not yet paid out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorOutstandingRewards {
    /// Outstanding rewards.
    pub rewards: DecCoins,
}

/// Reward baseline of one delegation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatorStartingInfo {
    /// Last period closed before the delegation started.
    pub previous_period: u64,
    /// Stake at the start, in tokens.
    pub stake: Decimal,
    /// Height at which the baseline was taken.
    pub height: i64,
}

/// Community pool singleton.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePool {
    /// Community pool balance.
    pub community_pool: DecCoins,
}

/// Community-bound funds held while an external pool module owns the community pool.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPoolEscrow {
    /// Funds waiting to be handed to the external pool.
    pub pending: DecCoins,
}

pub(crate) fn load<T: DeserializeOwned, S: KvRead + ?Sized>(
    store: &S,
    key: &[u8],
) -> Result<Option<T>> {
    match store.get(key)? {
        Some(bytes) => Ok(Some(decode_canonical_limited(&bytes, MAX_RECORD_BYTES)?)),
        None => Ok(None),
    }
}

pub(crate) fn save<T: Serialize, S: KvWrite + ?Sized>(
    store: &mut S,
    key: &[u8],
    value: &T,
) -> Result<()> {
    let bytes = encode_canonical(value)?;
    store.set(key, bytes)?;
    Ok(())
}
