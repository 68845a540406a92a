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

//! Accumulators: outstanding rewards, commission, community pool.

use crate::core::distribution::error::{DistrError, Result};
use crate::core::distribution::keys;
use crate::core::distribution::records::{
    load, save, ExternalPoolEscrow, FeePool, ValidatorAccumulatedCommission,
    ValidatorOutstandingRewards,
};
use crate::core::distribution::{Keeper, Payout};
use crate::core::economics::coins::{quo_truncate, Coins, CoinsError, DecCoins};
use crate::core::economics::staking::{StakingKeeper, ValidatorInfo};
use crate::core::state::store::{KvRead, KvWrite};
use crate::core::types::Address;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// A validator's share of a fee allocation, weighted by voting power.
#[derive(Clone, Debug)]
pub struct VoteInfo {
    /// Validator that took part in the block.
    pub validator: ValidatorInfo,
    /// Its voting power.
    pub power: u64,
}

impl Keeper {
    /// Funds allocated to a validator and not yet paid out.
    pub fn outstanding_rewards<S: KvRead + ?Sized>(
        &self,
        store: &S,
        val: &Address,
    ) -> Result<ValidatorOutstandingRewards> {
        load(store, &keys::outstanding_rewards_key(val))?
            .ok_or_else(|| DistrError::NoValidatorDistInfo(val.clone()))
    }

    /// Commission accrued to a validator operator.
    pub fn accumulated_commission<S: KvRead + ?Sized>(
        &self,
        store: &S,
        val: &Address,
    ) -> Result<ValidatorAccumulatedCommission> {
        load(store, &keys::accumulated_commission_key(val))?
            .ok_or_else(|| DistrError::NoValidatorDistInfo(val.clone()))
    }

    fn fee_pool<S: KvRead + ?Sized>(&self, store: &S) -> Result<FeePool> {
        Ok(load(store, keys::FEE_POOL_KEY)?.unwrap_or_default())
    }

    /// Send community-bound funds to the internal pool, or to escrow when the pool is external.
    pub(crate) fn route_to_community_pool<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        amount: &DecCoins,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        if self.has_external_community_pool() {
            let mut escrow: ExternalPoolEscrow =
                load(store, keys::EXTERNAL_POOL_ESCROW_KEY)?.unwrap_or_default();
            escrow.pending = escrow.pending.checked_add(amount)?;
            return save(store, keys::EXTERNAL_POOL_ESCROW_KEY, &escrow);
        }
        let mut pool = self.fee_pool(store)?;
        pool.community_pool = pool.community_pool.checked_add(amount)?;
        save(store, keys::FEE_POOL_KEY, &pool)
    }

    /// Split `tokens` between commission and delegator rewards and fund outstanding rewards.
    ///
    /// `commission + shared == tokens` exactly.
    pub fn allocate_tokens_to_validator<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        val: &ValidatorInfo,
        tokens: &DecCoins,
    ) -> Result<()> {
        if val.commission_rate < Decimal::ZERO || val.commission_rate > Decimal::ONE {
            return Err(DistrError::InvalidArgument(format!(
                "commission rate must be within [0, 1], got {}",
                val.commission_rate
            )));
        }
        let op = &val.operator;
        let mut current = self.current_rewards(store, op)?;
        let mut commission = self.accumulated_commission(store, op)?;
        let mut outstanding = self.outstanding_rewards(store, op)?;

        let commission_part = tokens.mul_dec_truncate(val.commission_rate, self.precision())?;
        let shared = tokens.checked_sub(&commission_part)?;

        commission.commission = commission.commission.checked_add(&commission_part)?;
        current.rewards = current.rewards.checked_add(&shared)?;
        outstanding.rewards = outstanding.rewards.checked_add(tokens)?;

        save(store, &keys::accumulated_commission_key(op), &commission)?;
        save(store, &keys::current_rewards_key(op), &current)?;
        save(store, &keys::outstanding_rewards_key(op), &outstanding)?;
        debug!(validator = %op, ?tokens, "tokens allocated to validator");
        Ok(())
    }

    /// Distribute collected fees: community tax first, the rest by voting power.
    ///
    /// Truncation dust and everything when no power voted goes to the community pool.
    pub fn allocate_tokens<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        fees: &DecCoins,
        votes: &[VoteInfo],
    ) -> Result<()> {
        let total_power = votes
            .iter()
            .try_fold(0u64, |acc, v| acc.checked_add(v.power))
            .ok_or(CoinsError::Overflow)?;
        if total_power == 0 {
            return self.route_to_community_pool(store, fees);
        }
        let params = self.params(store)?;
        let voters_share =
            fees.mul_dec_truncate(Decimal::ONE - params.community_tax, self.precision())?;

        let mut remaining = fees.clone();
        for vote in votes {
            let fraction = quo_truncate(
                Decimal::from(vote.power),
                Decimal::from(total_power),
                self.precision(),
            )?;
            let reward = voters_share.mul_dec_truncate(fraction, self.precision())?;
            self.allocate_tokens_to_validator(store, &vote.validator, &reward)?;
            remaining = remaining.checked_sub(&reward)?;
        }
        self.route_to_community_pool(store, &remaining)
    }

    /// Pay out the whole-coin part of a validator's commission to its operator.
    pub fn withdraw_validator_commission<S, K>(
        &self,
        store: &mut S,
        staking: &K,
        validator: &Address,
    ) -> Result<Payout>
    where
        S: KvWrite + ?Sized,
        K: StakingKeeper + ?Sized,
    {
        let val = staking
            .validator(validator)?
            .ok_or_else(|| DistrError::NoValidatorExists(validator.clone()))?;
        let op = &val.operator;
        let accumulated = self.accumulated_commission(store, op)?;
        if accumulated.commission.is_zero() {
            return Err(DistrError::NoValidatorCommission(op.clone()));
        }

        let (coins, change) = accumulated.commission.truncate_decimal();
        save(
            store,
            &keys::accumulated_commission_key(op),
            &ValidatorAccumulatedCommission { commission: change },
        )?;
        let mut outstanding = self.outstanding_rewards(store, op)?;
        outstanding.rewards = outstanding.rewards.checked_sub(&coins.to_dec_coins()?)?;
        save(store, &keys::outstanding_rewards_key(op), &outstanding)?;

        let recipient = self.withdraw_address(store, op)?;
        self.observe(|m| m.commission_withdrawals_total.inc());
        info!(validator = %op, recipient = %recipient, ?coins, "validator commission withdrawn");
        Ok(Payout {
            recipient,
            amount: coins,
        })
    }

    /// Community pool balance. Fails when the pool is owned externally.
    pub fn community_pool<S: KvRead + ?Sized>(&self, store: &S) -> Result<DecCoins> {
        if self.has_external_community_pool() {
            return Err(DistrError::ExternalCommunityPool);
        }
        Ok(self.fee_pool(store)?.community_pool)
    }

    /// Add coins to the community pool. Fails when the pool is owned externally.
    pub fn fund_community_pool<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        amount: &Coins,
    ) -> Result<()> {
        if self.has_external_community_pool() {
            return Err(DistrError::ExternalCommunityPool);
        }
        self.route_to_community_pool(store, &amount.to_dec_coins()?)
    }

    /// Spend whole coins from the community pool. Fails when the pool is owned externally.
    pub fn distribute_from_community_pool<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        amount: &Coins,
        recipient: &Address,
    ) -> Result<Payout> {
        if self.has_external_community_pool() {
            return Err(DistrError::ExternalCommunityPool);
        }
        if recipient.is_empty() {
            return Err(DistrError::InvalidArgument("empty recipient address".into()));
        }
        let mut pool = self.fee_pool(store)?;
        pool.community_pool = pool
            .community_pool
            .checked_sub(&amount.to_dec_coins()?)
            .map_err(|_| DistrError::InsufficientCommunityPool)?;
        save(store, keys::FEE_POOL_KEY, &pool)?;
        info!(recipient = %recipient, ?amount, "community pool spend");
        Ok(Payout {
            recipient: recipient.clone(),
            amount: amount.clone(),
        })
    }

    /// Drain funds held for the external community pool.
    pub fn take_external_pool_escrow<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<DecCoins> {
        if !self.has_external_community_pool() {
            return Err(DistrError::InternalCommunityPool);
        }
        let escrow: ExternalPoolEscrow =
            load(store, keys::EXTERNAL_POOL_ESCROW_KEY)?.unwrap_or_default();
        store.delete(keys::EXTERNAL_POOL_ESCROW_KEY)?;
        Ok(escrow.pending)
    }
}
