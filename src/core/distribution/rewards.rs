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

//! Delegation reward calculation and withdrawal.
//!
//! reward = sum over slash-delimited intervals of `(ratio[end] - ratio[start]) * stake`,
//! where `stake` shrinks by `(1 - fraction)` at each slash event crossed.

use crate::core::distribution::error::{DistrError, Result};
use crate::core::distribution::keys;
use crate::core::distribution::records::{load, save, DelegatorStartingInfo};
use crate::core::distribution::{Keeper, Payout};
use crate::core::economics::coins::{mul_truncate, DecCoins};
use crate::core::economics::staking::{DelegationInfo, StakingKeeper, ValidatorInfo};
use crate::core::state::store::{KvRead, KvWrite};
use crate::core::types::Address;
use rust_decimal::Decimal;
use tracing::{info, warn};

impl Keeper {
    /// Reward baseline of a delegation, if any.
    pub fn delegator_starting_info<S: KvRead + ?Sized>(
        &self,
        store: &S,
        val: &Address,
        del: &Address,
    ) -> Result<Option<DelegatorStartingInfo>> {
        load(store, &keys::delegator_starting_info_key(val, del))
    }

    /// Record a fresh baseline for a delegation and pin the period it starts after.
    pub fn initialize_delegation<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        height: i64,
        val: &ValidatorInfo,
        del: &DelegationInfo,
    ) -> Result<()> {
        Self::check_address("validator", &val.operator)?;
        Self::check_address("delegator", &del.delegator)?;
        let current = self.current_rewards(store, &val.operator)?;
        let previous_period = current.period.checked_sub(1).ok_or_else(|| {
            DistrError::MissingHistoricalRewards {
                validator: val.operator.clone(),
                period: 0,
            }
        })?;
        let stake = val.tokens_from_shares_truncated(del.shares, self.precision())?;
        self.increment_reference_count(store, &val.operator, previous_period)?;
        save(
            store,
            &keys::delegator_starting_info_key(&val.operator, &del.delegator),
            &DelegatorStartingInfo {
                previous_period,
                stake,
                height,
            },
        )
    }

    /// `(ratio[end] - ratio[start]) * stake`, truncated.
    fn rewards_between<S: KvRead + ?Sized>(
        &self,
        store: &S,
        val: &Address,
        starting_period: u64,
        ending_period: u64,
        stake: Decimal,
    ) -> Result<DecCoins> {
        if starting_period > ending_period {
            return Err(DistrError::InvalidArgument(format!(
                "starting period {starting_period} is after ending period {ending_period}"
            )));
        }
        if stake < Decimal::ZERO {
            return Err(DistrError::InvalidArgument(format!(
                "stake must be non-negative, got {stake}"
            )));
        }
        let ratio_at = |period: u64| -> Result<DecCoins> {
            self.historical_rewards(store, val, period)?
                .map(|h| h.cumulative_reward_ratio)
                .ok_or_else(|| DistrError::MissingHistoricalRewards {
                    validator: val.clone(),
                    period,
                })
        };
        let starting = ratio_at(starting_period)?;
        let ending = ratio_at(ending_period)?;
        let difference =
            ending
                .checked_sub(&starting)
                .map_err(|_| DistrError::NegativeRewardRatio {
                    validator: val.clone(),
                    start: starting_period,
                    end: ending_period,
                })?;
        Ok(difference.mul_dec_truncate(stake, self.precision())?)
    }

    /// Reward earned by a delegation up to `ending_period`, clamped to outstanding rewards.
    ///
    /// Reads only; callers normally close the current period first and pass the closed
    /// period as `ending_period`.
    pub fn calculate_delegation_rewards<S: KvRead + ?Sized>(
        &self,
        store: &S,
        height: i64,
        val: &ValidatorInfo,
        del: &DelegationInfo,
        ending_period: u64,
    ) -> Result<DecCoins> {
        let op = &val.operator;
        let info = self
            .delegator_starting_info(store, op, &del.delegator)?
            .ok_or_else(|| DistrError::EmptyDelegationDistInfo {
                delegator: del.delegator.clone(),
                validator: op.clone(),
            })?;

        // Started in this block: nothing can have accrued yet.
        if info.height == height {
            return Ok(DecCoins::new());
        }
        if info.previous_period > ending_period {
            return Err(DistrError::InvalidArgument(format!(
                "delegation starts after period {} but ending period is {}",
                info.previous_period, ending_period
            )));
        }
        if info.previous_period == ending_period {
            return Ok(DecCoins::new());
        }

        let mut rewards = DecCoins::new();
        let mut starting_period = info.previous_period;
        let mut stake = info.stake;

        let events = self.slash_events(store, op, starting_period.saturating_add(1), ending_period);
        for event in events {
            let event = event?;
            let part =
                self.rewards_between(store, op, starting_period, event.validator_period, stake)?;
            rewards = rewards.checked_add(&part)?;
            stake = mul_truncate(stake, Decimal::ONE - event.fraction, self.precision())?;
            starting_period = event.validator_period;
        }

        // Truncation may leave the computed stake a few ulps above the live stake.
        let current_stake = val.tokens_from_shares_truncated(del.shares, self.precision())?;
        if stake > current_stake {
            let margin = Decimal::new(3, self.precision());
            if current_stake
                .checked_add(margin)
                .is_some_and(|limit| stake <= limit)
            {
                stake = current_stake;
            } else {
                return Err(DistrError::StakeExceedsCurrent {
                    delegator: del.delegator.clone(),
                    validator: op.clone(),
                    stake,
                    current: current_stake,
                });
            }
        }

        let part = self.rewards_between(store, op, starting_period, ending_period, stake)?;
        rewards = rewards.checked_add(&part)?;

        let outstanding = self.outstanding_rewards(store, op)?.rewards;
        if !rewards.is_all_lte(&outstanding) {
            warn!(
                validator = %op,
                delegator = %del.delegator,
                ?rewards,
                ?outstanding,
                "delegation rewards exceed outstanding; clamping"
            );
            self.observe(|m| m.rewards_clamped_total.inc());
            rewards = rewards.intersect(&outstanding);
        }
        Ok(rewards)
    }

    /// Close the period, pay the accrued reward and drop the delegation's baseline.
    ///
    /// Whole coins go to the delegator's withdraw address; the decimal change goes to
    /// the community pool. The caller re-initializes the delegation if it continues.
    pub fn settle_delegation_rewards<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        height: i64,
        val: &ValidatorInfo,
        del: &DelegationInfo,
    ) -> Result<Payout> {
        let op = &val.operator;
        let info = self
            .delegator_starting_info(store, op, &del.delegator)?
            .ok_or_else(|| DistrError::EmptyDelegationDistInfo {
                delegator: del.delegator.clone(),
                validator: op.clone(),
            })?;

        let ending_period = self.increment_validator_period(store, val)?;
        let rewards = self.calculate_delegation_rewards(store, height, val, del, ending_period)?;
        let (coins, change) = rewards.truncate_decimal();

        let mut outstanding = self.outstanding_rewards(store, op)?;
        outstanding.rewards = outstanding.rewards.checked_sub(&rewards)?;
        save(store, &keys::outstanding_rewards_key(op), &outstanding)?;
        if !change.is_zero() {
            self.route_to_community_pool(store, &change)?;
        }

        store.delete(&keys::delegator_starting_info_key(op, &del.delegator))?;
        self.decrement_reference_count(store, op, info.previous_period)?;

        let recipient = self.withdraw_address(store, &del.delegator)?;
        self.observe(|m| m.delegation_withdrawals_total.inc());
        info!(
            validator = %op,
            delegator = %del.delegator,
            recipient = %recipient,
            ?coins,
            "delegation rewards withdrawn"
        );
        Ok(Payout {
            recipient,
            amount: coins,
        })
    }

    /// Withdraw a delegation's rewards and restart its baseline.
    pub fn withdraw_delegation_rewards<S, K>(
        &self,
        store: &mut S,
        staking: &K,
        height: i64,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Payout>
    where
        S: KvWrite + ?Sized,
        K: StakingKeeper + ?Sized,
    {
        let val = staking
            .validator(validator)?
            .ok_or_else(|| DistrError::NoValidatorExists(validator.clone()))?;
        let del = staking.delegation(delegator, validator)?.ok_or_else(|| {
            DistrError::NoDelegationExists {
                delegator: delegator.clone(),
                validator: validator.clone(),
            }
        })?;
        let payout = self.settle_delegation_rewards(store, height, &val, &del)?;
        self.initialize_delegation(store, height, &val, &del)?;
        Ok(payout)
    }
}
