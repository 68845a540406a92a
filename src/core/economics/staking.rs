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

//! Deterministic staking ledger: validators, bonded shares, slashing.
//!
//! The ledger drives the distribution lifecycle hooks in the order the reward
//! accounting requires: "before" hooks see the pre-change state, "after" hooks the
//! post-change state.

use crate::core::distribution::error::DistrError;
use crate::core::distribution::{Keeper, Payout};
use crate::core::economics::coins::{mul_truncate, quo_truncate, CoinsError};
use crate::core::state::store::KvWrite;
use crate::core::types::{Address, AddressError};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

/// Staking ledger errors.
#[derive(Debug, Error)]
pub enum StakingError {
    /// Zero, negative or out-of-range amount or rate.
    #[error("invalid amount")]
    InvalidAmount,
    /// Unbonding more shares than the delegation holds.
    #[error("insufficient stake")]
    InsufficientStake,
    /// No such validator.
    #[error("unknown validator {0}")]
    UnknownValidator(Address),
    /// Operator already registered.
    #[error("validator {0} already exists")]
    ValidatorExists(Address),
    /// Empty or over-long address.
    #[error("address: {0}")]
    InvalidAddress(#[from] AddressError),
    /// Removal attempted while shares remain.
    #[error("validator {0} still has delegations")]
    ValidatorHasDelegations(Address),
    /// Share or token arithmetic failed.
    #[error("coins: {0}")]
    Coins(#[from] CoinsError),
    /// A distribution hook rejected the change.
    #[error("distribution: {0}")]
    Distribution(#[from] DistrError),
}

/// Validator view needed by reward accounting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorInfo {
    /// Operator address, also the validator's identity.
    pub operator: Address,
    /// Bonded tokens.
    pub tokens: Decimal,
    /// Total shares issued to delegators.
    pub delegator_shares: Decimal,
    /// Commission rate in `[0, 1]`.
    pub commission_rate: Decimal,
}

impl ValidatorInfo {
    /// Tokens backing `shares`, truncated to `precision`.
    pub fn tokens_from_shares_truncated(
        &self,
        shares: Decimal,
        precision: u32,
    ) -> Result<Decimal, CoinsError> {
        if self.delegator_shares.is_zero() {
            return Ok(Decimal::ZERO);
        }
        let scaled = mul_truncate(shares, self.tokens, precision)?;
        quo_truncate(scaled, self.delegator_shares, precision)
    }

    fn shares_from_tokens(&self, amount: Decimal, precision: u32) -> Result<Decimal, StakingError> {
        if self.delegator_shares.is_zero() {
            return Ok(amount);
        }
        if self.tokens.is_zero() {
            // Shares outstanding but no tokens behind them: the exchange rate is undefined.
            return Err(StakingError::InvalidAmount);
        }
        let scaled = mul_truncate(amount, self.delegator_shares, precision)?;
        Ok(quo_truncate(scaled, self.tokens, precision)?)
    }
}

/// A delegator's shares in one validator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegationInfo {
    /// Delegator account.
    pub delegator: Address,
    /// Validator operator.
    pub validator: Address,
    /// Shares held.
    pub shares: Decimal,
}

/// Read access to staking state.
pub trait StakingKeeper {
    /// Look up a validator.
    fn validator(&self, operator: &Address) -> Result<Option<ValidatorInfo>, DistrError>;

    /// Look up a delegation.
    fn delegation(
        &self,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Option<DelegationInfo>, DistrError>;

    /// All delegations of a delegator, ordered by validator.
    fn delegations<'a>(
        &'a self,
        delegator: &Address,
    ) -> Box<dyn Iterator<Item = Result<DelegationInfo, DistrError>> + 'a>;
}

/// In-memory staking registry.
#[derive(Clone, Debug, Default)]
pub struct StakingLedger {
    validators: BTreeMap<Address, ValidatorInfo>,
    /// Keyed by (delegator, validator).
    delegations: BTreeMap<(Address, Address), DelegationInfo>,
}

impl StakingLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator with no stake.
    pub fn create_validator<S: KvWrite + ?Sized>(
        &mut self,
        keeper: &Keeper,
        store: &mut S,
        operator: Address,
        commission_rate: Decimal,
    ) -> Result<(), StakingError> {
        operator.validate()?;
        if self.validators.contains_key(&operator) {
            return Err(StakingError::ValidatorExists(operator));
        }
        if commission_rate < Decimal::ZERO || commission_rate > Decimal::ONE {
            return Err(StakingError::InvalidAmount);
        }
        let val = ValidatorInfo {
            operator: operator.clone(),
            tokens: Decimal::ZERO,
            delegator_shares: Decimal::ZERO,
            commission_rate,
        };
        keeper.after_validator_created(store, &val)?;
        self.validators.insert(operator, val);
        Ok(())
    }

    /// Bond `amount` tokens from `delegator` to `validator`.
    ///
    /// Returns the rewards settled on an existing delegation, if any.
    pub fn bond<S: KvWrite + ?Sized>(
        &mut self,
        keeper: &Keeper,
        store: &mut S,
        height: i64,
        delegator: &Address,
        validator: &Address,
        amount: Decimal,
    ) -> Result<Option<Payout>, StakingError> {
        delegator.validate()?;
        if amount <= Decimal::ZERO {
            return Err(StakingError::InvalidAmount);
        }
        let val = self.validator_entry(validator)?.clone();
        let key = (delegator.clone(), validator.clone());
        let existing = self.delegations.get(&key).cloned();

        let issued = val.shares_from_tokens(amount, keeper.precision())?;
        let new_val = ValidatorInfo {
            tokens: val.tokens.checked_add(amount).ok_or(CoinsError::Overflow)?,
            delegator_shares: val
                .delegator_shares
                .checked_add(issued)
                .ok_or(CoinsError::Overflow)?,
            ..val.clone()
        };
        let prior_shares = existing.as_ref().map_or(Decimal::ZERO, |d| d.shares);
        let new_del = DelegationInfo {
            delegator: delegator.clone(),
            validator: validator.clone(),
            shares: prior_shares
                .checked_add(issued)
                .ok_or(CoinsError::Overflow)?,
        };

        let payout = match &existing {
            Some(del) => Some(keeper.before_delegation_shares_modified(store, height, &val, del)?),
            None => {
                keeper.before_delegation_created(store, &val)?;
                None
            }
        };
        keeper.after_delegation_modified(store, height, &new_val, &new_del)?;

        self.validators.insert(validator.clone(), new_val);
        self.delegations.insert(key, new_del);
        Ok(payout)
    }

    /// Unbond `shares` from a delegation. Returns the tokens released and the settled rewards.
    pub fn unbond<S: KvWrite + ?Sized>(
        &mut self,
        keeper: &Keeper,
        store: &mut S,
        height: i64,
        delegator: &Address,
        validator: &Address,
        shares: Decimal,
    ) -> Result<(Decimal, Payout), StakingError> {
        if shares <= Decimal::ZERO {
            return Err(StakingError::InvalidAmount);
        }
        let val = self.validator_entry(validator)?.clone();
        let key = (delegator.clone(), validator.clone());
        let del = self
            .delegations
            .get(&key)
            .cloned()
            .ok_or(StakingError::InsufficientStake)?;
        if del.shares < shares {
            return Err(StakingError::InsufficientStake);
        }

        let remaining_val_shares = val.delegator_shares - shares;
        let released = if remaining_val_shares.is_zero() {
            val.tokens
        } else {
            val.tokens_from_shares_truncated(shares, keeper.precision())?
        };
        let new_val = ValidatorInfo {
            tokens: val.tokens - released,
            delegator_shares: remaining_val_shares,
            ..val.clone()
        };
        let new_del = DelegationInfo {
            shares: del.shares - shares,
            ..del.clone()
        };

        let payout = keeper.before_delegation_shares_modified(store, height, &val, &del)?;
        if new_del.shares.is_zero() {
            self.delegations.remove(&key);
        } else {
            keeper.after_delegation_modified(store, height, &new_val, &new_del)?;
            self.delegations.insert(key, new_del);
        }
        self.validators.insert(validator.clone(), new_val);
        Ok((released, payout))
    }

    /// Burn `fraction` of a validator's tokens. Returns the amount burned.
    pub fn slash_validator<S: KvWrite + ?Sized>(
        &mut self,
        keeper: &Keeper,
        store: &mut S,
        height: i64,
        validator: &Address,
        fraction: Decimal,
    ) -> Result<Decimal, StakingError> {
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(StakingError::InvalidAmount);
        }
        let val = self.validator_entry(validator)?.clone();
        let burned = mul_truncate(val.tokens, fraction, keeper.precision())?;
        keeper.before_validator_slashed(store, height, &val, fraction)?;
        if let Some(v) = self.validators.get_mut(validator) {
            v.tokens -= burned;
        }
        Ok(burned)
    }

    /// Remove a validator with no remaining shares. Returns the final commission payout.
    pub fn remove_validator<S: KvWrite + ?Sized>(
        &mut self,
        keeper: &Keeper,
        store: &mut S,
        validator: &Address,
    ) -> Result<Vec<Payout>, StakingError> {
        let val = self.validator_entry(validator)?.clone();
        if !val.delegator_shares.is_zero() {
            return Err(StakingError::ValidatorHasDelegations(validator.clone()));
        }
        let payouts = keeper.after_validator_removed(store, &val)?;
        self.validators.remove(validator);
        Ok(payouts)
    }

    fn validator_entry(&self, operator: &Address) -> Result<&ValidatorInfo, StakingError> {
        self.validators
            .get(operator)
            .ok_or_else(|| StakingError::UnknownValidator(operator.clone()))
    }
}

impl StakingKeeper for StakingLedger {
    fn validator(&self, operator: &Address) -> Result<Option<ValidatorInfo>, DistrError> {
        Ok(self.validators.get(operator).cloned())
    }

    fn delegation(
        &self,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Option<DelegationInfo>, DistrError> {
        Ok(self
            .delegations
            .get(&(delegator.clone(), validator.clone()))
            .cloned())
    }

    fn delegations<'a>(
        &'a self,
        delegator: &Address,
    ) -> Box<dyn Iterator<Item = Result<DelegationInfo, DistrError>> + 'a> {
        let owner = delegator.clone();
        Box::new(
            self.delegations
                .range((delegator.clone(), Address::default())..)
                .take_while(move |((d, _), _)| *d == owner)
                .map(|(_, del)| Ok(del.clone())),
        )
    }
}
