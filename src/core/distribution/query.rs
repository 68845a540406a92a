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

//! Read-only query surface.
//!
//! Reward previews close the validator's period on a throw-away [`CacheStore`]
//! over the query snapshot, so the snapshot itself is never written.

use crate::core::distribution::error::{DistrError, Result};
use crate::core::distribution::keys;
use crate::core::distribution::params::Params;
use crate::core::distribution::records::{ValidatorSlashEvent, MAX_RECORD_BYTES};
use crate::core::distribution::Keeper;
use crate::core::economics::coins::DecCoins;
use crate::core::economics::staking::{DelegationInfo, StakingKeeper, ValidatorInfo};
use crate::core::state::store::{walk_prefix, CacheStore, KvRead};
use crate::core::types::{decode_canonical_limited, Address, CodecError};
use std::ops::ControlFlow;

/// Page size used when a request leaves `limit` at zero.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// Pagination request. `key` and `offset` are mutually exclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Resume key returned as `next_key` by a previous page.
    pub key: Option<Vec<u8>>,
    /// Number of matching items to skip.
    pub offset: u64,
    /// Maximum items returned; zero means [`DEFAULT_PAGE_LIMIT`].
    pub limit: u64,
    /// Count every matching item (offset mode only).
    pub count_total: bool,
}

/// Pagination response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageResponse {
    /// Key of the first matching item after this page.
    pub next_key: Option<Vec<u8>>,
    /// Total matching items, when requested.
    pub total: Option<u64>,
}

/// Distribution summary of a validator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorDistributionInfo {
    /// Operator address (also its self-delegation account).
    pub operator: Address,
    /// Pending rewards of the self-delegation.
    pub self_bond_rewards: DecCoins,
    /// Accumulated commission.
    pub commission: DecCoins,
}

/// Pending rewards of one delegation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegationDelegatorReward {
    /// Validator delegated to.
    pub validator: Address,
    /// Pending reward.
    pub reward: DecCoins,
}

/// Pending rewards across all of a delegator's delegations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DelegationTotalRewards {
    /// Per-validator rewards.
    pub rewards: Vec<DelegationDelegatorReward>,
    /// Sum of all rewards.
    pub total: DecCoins,
}

/// Walk `prefix`, keeping items `accept` maps to `Some`, and cut one page out of them.
///
/// Rejected items never stop the walk and do not count toward offset, limit or total.
/// `accept` receives the key relative to `prefix`.
pub fn filtered_paginate<S, T, F>(
    store: &S,
    prefix: &[u8],
    page: &PageRequest,
    mut accept: F,
) -> Result<(Vec<T>, PageResponse)>
where
    S: KvRead + ?Sized,
    F: FnMut(&[u8], &[u8]) -> Result<Option<T>>,
{
    if page.key.is_some() && page.offset > 0 {
        return Err(DistrError::InvalidArgument(
            "either offset or key is expected, got both".into(),
        ));
    }
    let limit = if page.limit == 0 {
        DEFAULT_PAGE_LIMIT
    } else {
        page.limit
    };
    let count_total = page.count_total && page.key.is_none();
    let start = page.key.as_ref().map(|k| {
        let mut s = prefix.to_vec();
        s.extend_from_slice(k);
        s
    });

    let mut items = Vec::new();
    let mut matched: u64 = 0;
    let mut next_key = None;
    walk_prefix(store, prefix, start.as_deref(), |key, value| -> Result<ControlFlow<()>> {
        let relative = &key[prefix.len()..];
        let Some(item) = accept(relative, value)? else {
            return Ok(ControlFlow::Continue(()));
        };
        matched += 1;
        if matched <= page.offset {
            return Ok(ControlFlow::Continue(()));
        }
        if (items.len() as u64) < limit {
            items.push(item);
            return Ok(ControlFlow::Continue(()));
        }
        if next_key.is_none() {
            next_key = Some(relative.to_vec());
        }
        if count_total {
            Ok(ControlFlow::Continue(()))
        } else {
            Ok(ControlFlow::Break(()))
        }
    })?;

    Ok((
        items,
        PageResponse {
            next_key,
            total: count_total.then_some(matched),
        },
    ))
}

/// Query handler over a read-only snapshot.
pub struct Querier<'a, S: KvRead + ?Sized, K: StakingKeeper + ?Sized> {
    keeper: &'a Keeper,
    store: &'a S,
    staking: &'a K,
    height: i64,
}

impl<'a, S: KvRead + ?Sized, K: StakingKeeper + ?Sized> Querier<'a, S, K> {
    /// Bind a query handler to a snapshot taken at `height`.
    pub fn new(keeper: &'a Keeper, store: &'a S, staking: &'a K, height: i64) -> Self {
        Self {
            keeper,
            store,
            staking,
            height,
        }
    }

    fn parse(field: &str, s: &str) -> Result<Address> {
        Address::from_hex(s).map_err(|e| DistrError::bad_address(field, e))
    }

    fn existing_validator(&self, val: &Address) -> Result<ValidatorInfo> {
        self.staking
            .validator(val)?
            .ok_or_else(|| DistrError::NoValidatorExists(val.clone()))
    }

    fn preview_rewards(
        &self,
        cache: &mut CacheStore<'a, S>,
        val: &ValidatorInfo,
        del: &DelegationInfo,
    ) -> Result<DecCoins> {
        let ending = self.keeper.increment_validator_period(cache, val)?;
        self.keeper
            .calculate_delegation_rewards(cache, self.height, val, del, ending)
    }

    /// Current parameters.
    pub fn params(&self) -> Result<Params> {
        self.keeper.params(self.store)
    }

    /// Self-delegation rewards and commission of a validator.
    pub fn validator_distribution_info(&self, validator: &str) -> Result<ValidatorDistributionInfo> {
        let op = Self::parse("validator", validator)?;
        let val = self.existing_validator(&op)?;
        let del = self.staking.delegation(&op, &op)?.ok_or_else(|| {
            DistrError::NoDelegationExists {
                delegator: op.clone(),
                validator: op.clone(),
            }
        })?;
        let mut cache = CacheStore::new(self.store);
        let self_bond_rewards = self.preview_rewards(&mut cache, &val, &del)?;
        let commission = self.keeper.accumulated_commission(self.store, &op)?.commission;
        Ok(ValidatorDistributionInfo {
            operator: op,
            self_bond_rewards,
            commission,
        })
    }

    /// Rewards allocated to a validator and not yet paid out.
    pub fn validator_outstanding_rewards(&self, validator: &str) -> Result<DecCoins> {
        let op = Self::parse("validator", validator)?;
        self.existing_validator(&op)?;
        Ok(self.keeper.outstanding_rewards(self.store, &op)?.rewards)
    }

    /// Accumulated commission of a validator.
    pub fn validator_commission(&self, validator: &str) -> Result<DecCoins> {
        let op = Self::parse("validator", validator)?;
        self.existing_validator(&op)?;
        Ok(self.keeper.accumulated_commission(self.store, &op)?.commission)
    }

    /// Slash events with `starting_period <= validator_period <= ending_period`, one page.
    pub fn validator_slashes(
        &self,
        validator: &str,
        starting_period: u64,
        ending_period: u64,
        page: &PageRequest,
    ) -> Result<(Vec<ValidatorSlashEvent>, PageResponse)> {
        if starting_period > ending_period {
            return Err(DistrError::InvalidArgument(format!(
                "starting period {starting_period} is greater than ending period {ending_period}"
            )));
        }
        let op = Self::parse("validator", validator)?;
        filtered_paginate(
            self.store,
            &keys::slash_event_prefix(&op),
            page,
            |relative, value| {
                let (period, _) = keys::slash_event_position(relative)
                    .ok_or(DistrError::Codec(CodecError::Deserialize))?;
                if period < starting_period || period > ending_period {
                    return Ok(None);
                }
                Ok(Some(decode_canonical_limited(value, MAX_RECORD_BYTES)?))
            },
        )
    }

    /// Pending rewards of one delegation, without changing state.
    pub fn delegation_rewards(&self, delegator: &str, validator: &str) -> Result<DecCoins> {
        let del_addr = Self::parse("delegator", delegator)?;
        let op = Self::parse("validator", validator)?;
        let val = self.existing_validator(&op)?;
        let del = self.staking.delegation(&del_addr, &op)?.ok_or_else(|| {
            DistrError::NoDelegationExists {
                delegator: del_addr.clone(),
                validator: op.clone(),
            }
        })?;
        let mut cache = CacheStore::new(self.store);
        self.preview_rewards(&mut cache, &val, &del)
    }

    /// Pending rewards across every delegation of a delegator.
    pub fn delegation_total_rewards(&self, delegator: &str) -> Result<DelegationTotalRewards> {
        let del_addr = Self::parse("delegator", delegator)?;
        let mut cache = CacheStore::new(self.store);
        let mut out = DelegationTotalRewards::default();
        for del in self.staking.delegations(&del_addr) {
            let del = del?;
            let val = self.existing_validator(&del.validator)?;
            let reward = self.preview_rewards(&mut cache, &val, &del)?;
            out.total = out.total.checked_add(&reward)?;
            out.rewards.push(DelegationDelegatorReward {
                validator: del.validator,
                reward,
            });
        }
        Ok(out)
    }

    /// Validators a delegator is bonded to.
    pub fn delegator_validators(&self, delegator: &str) -> Result<Vec<Address>> {
        let del_addr = Self::parse("delegator", delegator)?;
        self.staking
            .delegations(&del_addr)
            .map(|d| d.map(|d| d.validator))
            .collect()
    }

    /// Where a delegator's rewards are paid.
    pub fn delegator_withdraw_address(&self, delegator: &str) -> Result<Address> {
        let del_addr = Self::parse("delegator", delegator)?;
        self.keeper.withdraw_address(self.store, &del_addr)
    }

    /// Community pool balance. Fails when the pool is owned externally.
    pub fn community_pool(&self) -> Result<DecCoins> {
        self.keeper.community_pool(self.store)
    }
}
