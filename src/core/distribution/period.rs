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

//! Reward period ledger.
//!
//! Period 0 is written at validator creation with a zero ratio; the first open
//! period is 1. Closing period `p` writes `ratio[p] = ratio[p-1] + rewards / tokens`
//! and moves the "current" reference from `p-1` to `p`.

use crate::core::distribution::error::{DistrError, Result};
use crate::core::distribution::keys;
use crate::core::distribution::records::{
    load, save, ValidatorAccumulatedCommission, MAX_RECORD_BYTES, ValidatorCurrentRewards,
    ValidatorHistoricalRewards, ValidatorOutstandingRewards,
};
use crate::core::distribution::Keeper;
use crate::core::economics::coins::DecCoins;
use crate::core::economics::staking::ValidatorInfo;
use crate::core::state::store::{walk_prefix, KvRead, KvWrite};
use crate::core::types::{decode_canonical_limited, Address, CodecError};
use std::ops::ControlFlow;
use tracing::debug;

impl Keeper {
    /// Write the zero-ratio period 0, open period 1 and zero accumulators.
    pub fn initialize_validator<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        val: &ValidatorInfo,
    ) -> Result<()> {
        let op = &val.operator;
        Self::check_address("validator", op)?;
        save(
            store,
            &keys::historical_rewards_key(op, 0),
            &ValidatorHistoricalRewards {
                cumulative_reward_ratio: DecCoins::new(),
                reference_count: 1,
            },
        )?;
        save(
            store,
            &keys::current_rewards_key(op),
            &ValidatorCurrentRewards {
                rewards: DecCoins::new(),
                period: 1,
            },
        )?;
        save(
            store,
            &keys::accumulated_commission_key(op),
            &ValidatorAccumulatedCommission::default(),
        )?;
        save(
            store,
            &keys::outstanding_rewards_key(op),
            &ValidatorOutstandingRewards::default(),
        )?;
        self.observe(|m| m.validators_tracked.inc());
        debug!(validator = %op, "validator distribution initialized");
        Ok(())
    }

    /// Close the current period and open the next one. Returns the closed period.
    pub fn increment_validator_period<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        val: &ValidatorInfo,
    ) -> Result<u64> {
        let op = &val.operator;
        let current = self.current_rewards(store, op)?;
        let previous_period = current.period.checked_sub(1).ok_or_else(|| {
            DistrError::MissingHistoricalRewards {
                validator: op.clone(),
                period: 0,
            }
        })?;
        let previous = self.historical_rewards(store, op, previous_period)?.ok_or_else(|| {
            DistrError::MissingHistoricalRewards {
                validator: op.clone(),
                period: previous_period,
            }
        })?;

        let per_share = if val.tokens.is_zero() {
            // No stake to share the pot: the ratio stays flat and the pot goes to the pool.
            if !current.rewards.is_zero() {
                let mut outstanding = self.outstanding_rewards(store, op)?;
                outstanding.rewards = outstanding.rewards.checked_sub(&current.rewards)?;
                save(store, &keys::outstanding_rewards_key(op), &outstanding)?;
                self.route_to_community_pool(store, &current.rewards)?;
            }
            DecCoins::new()
        } else {
            // Truncated; the remainder stays in outstanding rewards.
            current
                .rewards
                .quo_dec_truncate(val.tokens, self.precision())?
        };

        let ratio = previous.cumulative_reward_ratio.checked_add(&per_share)?;
        save(
            store,
            &keys::historical_rewards_key(op, current.period),
            &ValidatorHistoricalRewards {
                cumulative_reward_ratio: ratio,
                reference_count: 1,
            },
        )?;
        save(
            store,
            &keys::current_rewards_key(op),
            &ValidatorCurrentRewards {
                rewards: DecCoins::new(),
                period: current.period + 1,
            },
        )?;
        self.decrement_reference_count(store, op, previous_period)?;

        self.observe(|m| m.reward_periods_closed_total.inc());
        debug!(validator = %op, period = current.period, "reward period closed");
        Ok(current.period)
    }

    /// Take one more reference on a closed period.
    pub fn increment_reference_count<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        val: &Address,
        period: u64,
    ) -> Result<()> {
        let mut hist = self.historical_rewards(store, val, period)?.ok_or_else(|| {
            DistrError::MissingHistoricalRewards {
                validator: val.clone(),
                period,
            }
        })?;
        hist.reference_count = hist.reference_count.checked_add(1).ok_or_else(|| {
            DistrError::ReferenceCountOverflow {
                validator: val.clone(),
                period,
            }
        })?;
        save(store, &keys::historical_rewards_key(val, period), &hist)
    }

    /// Release one reference on a closed period, deleting the entry at zero.
    pub fn decrement_reference_count<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        val: &Address,
        period: u64,
    ) -> Result<()> {
        let key = keys::historical_rewards_key(val, period);
        let mut hist = self.historical_rewards(store, val, period)?.ok_or_else(|| {
            DistrError::MissingHistoricalRewards {
                validator: val.clone(),
                period,
            }
        })?;
        hist.reference_count = hist.reference_count.checked_sub(1).ok_or_else(|| {
            DistrError::ReferenceCountUnderflow {
                validator: val.clone(),
                period,
            }
        })?;
        if hist.reference_count == 0 {
            store.delete(&key)?;
            self.observe(|m| m.historical_entries_pruned_total.inc());
            debug!(validator = %val, period, "historical rewards pruned");
        } else {
            save(store, &key, &hist)?;
        }
        Ok(())
    }

    /// Open period accumulation. Missing means the validator was never initialized.
    pub fn current_rewards<S: KvRead + ?Sized>(
        &self,
        store: &S,
        val: &Address,
    ) -> Result<ValidatorCurrentRewards> {
        load(store, &keys::current_rewards_key(val))?
            .ok_or_else(|| DistrError::NoValidatorDistInfo(val.clone()))
    }

    /// Closed period snapshot, if still referenced.
    pub fn historical_rewards<S: KvRead + ?Sized>(
        &self,
        store: &S,
        val: &Address,
        period: u64,
    ) -> Result<Option<ValidatorHistoricalRewards>> {
        load(store, &keys::historical_rewards_key(val, period))
    }

    /// All retained closed periods of a validator in ascending order.
    pub fn historical_rewards_of<S: KvRead + ?Sized>(
        &self,
        store: &S,
        val: &Address,
    ) -> Result<Vec<(u64, ValidatorHistoricalRewards)>> {
        let mut out = Vec::new();
        walk_prefix(
            store,
            &keys::historical_rewards_prefix(val),
            None,
            |key, value| -> Result<ControlFlow<()>> {
                let period = keys::period_from_historical_key(key)
                    .ok_or(DistrError::Codec(CodecError::Deserialize))?;
                let hist = decode_canonical_limited(value, MAX_RECORD_BYTES)?;
                out.push((period, hist));
                Ok(ControlFlow::Continue(()))
            },
        )?;
        Ok(out)
    }
}
