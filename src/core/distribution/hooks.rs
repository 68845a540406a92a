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

//! Staking lifecycle hooks.
//!
//! Callers invoke "before" hooks with the validator and delegation as they were
//! prior to the change and "after" hooks with the updated values.

use crate::core::distribution::error::Result;
use crate::core::distribution::keys;
use crate::core::distribution::{Keeper, Payout};
use crate::core::economics::staking::{DelegationInfo, ValidatorInfo};
use crate::core::state::store::{walk_prefix, KvWrite};
use crate::core::state::persistent_state::StateError;
use rust_decimal::Decimal;
use std::ops::ControlFlow;
use tracing::info;

impl Keeper {
    /// A validator joined: open its period ledger.
    pub fn after_validator_created<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        val: &ValidatorInfo,
    ) -> Result<()> {
        self.initialize_validator(store, val)
    }

    /// A first delegation is about to be created: close the period so it starts clean.
    pub fn before_delegation_created<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        val: &ValidatorInfo,
    ) -> Result<()> {
        self.increment_validator_period(store, val)?;
        Ok(())
    }

    /// A delegation's shares are about to change: pay out what it earned so far.
    pub fn before_delegation_shares_modified<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        height: i64,
        val: &ValidatorInfo,
        del: &DelegationInfo,
    ) -> Result<Payout> {
        self.settle_delegation_rewards(store, height, val, del)
    }

    /// A delegation was created or changed: take a new baseline.
    pub fn after_delegation_modified<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        height: i64,
        val: &ValidatorInfo,
        del: &DelegationInfo,
    ) -> Result<()> {
        self.initialize_delegation(store, height, val, del)
    }

    /// A validator is about to lose `fraction` of its stake.
    pub fn before_validator_slashed<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        height: i64,
        val: &ValidatorInfo,
        fraction: Decimal,
    ) -> Result<()> {
        self.record_slash(store, height, val, fraction)?;
        Ok(())
    }

    /// A validator left: pay its commission, sweep the rest to the community pool
    /// and delete every record it owned.
    pub fn after_validator_removed<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        val: &ValidatorInfo,
    ) -> Result<Vec<Payout>> {
        let op = &val.operator;
        let mut outstanding = self.outstanding_rewards(store, op)?.rewards;
        let commission = self.accumulated_commission(store, op)?.commission;

        let mut payouts = Vec::new();
        if !commission.is_zero() {
            outstanding = outstanding.checked_sub(&commission)?;
            let (coins, change) = commission.truncate_decimal();
            self.route_to_community_pool(store, &change)?;
            if !coins.is_zero() {
                payouts.push(Payout {
                    recipient: self.withdraw_address(store, op)?,
                    amount: coins,
                });
            }
        }
        self.route_to_community_pool(store, &outstanding)?;

        store.delete(&keys::outstanding_rewards_key(op))?;
        store.delete(&keys::accumulated_commission_key(op))?;
        store.delete(&keys::current_rewards_key(op))?;
        for prefix in [keys::slash_event_prefix(op), keys::historical_rewards_prefix(op)] {
            let mut doomed = Vec::new();
            walk_prefix(store, &prefix, None, |key, _| -> std::result::Result<_, StateError> {
                doomed.push(key.to_vec());
                Ok(ControlFlow::Continue(()))
            })?;
            for key in doomed {
                store.delete(&key)?;
            }
        }

        self.observe(|m| m.validators_tracked.dec());
        info!(validator = %op, "validator distribution records removed");
        Ok(payouts)
    }
}
