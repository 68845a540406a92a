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

//! Multi-denomination coin sets.
//!
//! [`DecCoins`] carry fixed-precision decimal amounts (reward ratios, accrued rewards).
//! [`Coins`] carry integer amounts that can actually be paid out. Both keep their
//! denominations sorted and never store zero amounts, so equal sets encode identically.
//!
//! Arithmetic is computed exactly on wide integers and only then cut toward zero.
//! A result with more significant digits than a `Decimal` mantissa holds loses
//! low fractional digits, never gains value.

use crate::core::types::MAX_PRECISION;
use num_bigint::BigUint;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Coin arithmetic errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoinsError {
    /// Result does not fit a decimal even with no fractional digits.
    #[error("decimal overflow")]
    Overflow,
    /// Amount below zero.
    #[error("negative amount for denom {0}")]
    Negative(String),
    /// Zero amount stored explicitly in an encoded set.
    #[error("zero amount for denom {0}")]
    Zero(String),
    /// Divisor is zero.
    #[error("division by zero")]
    DivisionByZero,
}

/// Largest `Decimal` mantissa, `2^96 - 1`.
const MAX_MANTISSA: u128 = (1u128 << 96) - 1;

fn pow10(n: u32) -> BigUint {
    BigUint::from(10u32).pow(n)
}

/// `|d|` as `(mantissa, scale)`.
fn magnitude(d: Decimal) -> (BigUint, u32) {
    (BigUint::from(d.mantissa().unsigned_abs()), d.scale())
}

/// Build `±value * 10^-scale`, cutting digits toward zero: first down to
/// `precision` places, then further until the mantissa fits.
fn fit(
    mut value: BigUint,
    mut scale: u32,
    precision: u32,
    negative: bool,
) -> Result<Decimal, CoinsError> {
    let precision = precision.min(MAX_PRECISION);
    if scale > precision {
        value /= pow10(scale - precision);
        scale = precision;
    }
    let max = BigUint::from(MAX_MANTISSA);
    while value > max && scale > 0 {
        value /= 10u32;
        scale -= 1;
    }
    if value > max {
        return Err(CoinsError::Overflow);
    }
    let m = u128::try_from(&value).map_err(|_| CoinsError::Overflow)?;
    let m = i128::try_from(m).map_err(|_| CoinsError::Overflow)?;
    let m = if negative { -m } else { m };
    Decimal::try_from_i128_with_scale(m, scale).map_err(|_| CoinsError::Overflow)
}

/// `a * b` truncated at `precision`.
pub fn mul_truncate(a: Decimal, b: Decimal, precision: u32) -> Result<Decimal, CoinsError> {
    let (ma, sa) = magnitude(a);
    let (mb, sb) = magnitude(b);
    let negative = a.is_sign_negative() != b.is_sign_negative();
    fit(ma * mb, sa + sb, precision, negative)
}

/// `a / b` truncated at `precision`.
pub fn quo_truncate(a: Decimal, b: Decimal, precision: u32) -> Result<Decimal, CoinsError> {
    if b.is_zero() {
        return Err(CoinsError::DivisionByZero);
    }
    let precision = precision.min(MAX_PRECISION);
    let (ma, sa) = magnitude(a);
    let (mb, sb) = magnitude(b);
    let negative = a.is_sign_negative() != b.is_sign_negative();
    // |a| / |b| = ma * 10^sb / (mb * 10^sa), scaled up by 10^precision.
    let q = ma * pow10(sb + precision) / (mb * pow10(sa));
    fit(q, precision, precision, negative)
}

/// Two non-negative amounts on a common scale.
fn aligned(a: Decimal, b: Decimal) -> (BigUint, BigUint, u32) {
    let (ma, sa) = magnitude(a);
    let (mb, sb) = magnitude(b);
    let scale = sa.max(sb);
    (ma * pow10(scale - sa), mb * pow10(scale - sb), scale)
}

/// Exact sum of non-negative amounts, cut toward zero only if it does not fit.
fn add_amounts(a: Decimal, b: Decimal) -> Result<Decimal, CoinsError> {
    let (x, y, scale) = aligned(a, b);
    fit(x + y, scale, MAX_PRECISION, false)
}

/// Exact difference of non-negative amounts.
fn sub_amounts(denom: &str, a: Decimal, b: Decimal) -> Result<Decimal, CoinsError> {
    let (x, y, scale) = aligned(a, b);
    if x < y {
        return Err(CoinsError::Negative(denom.to_string()));
    }
    fit(x - y, scale, MAX_PRECISION, false)
}

/// Decimal coin set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Decimal>")]
pub struct DecCoins(BTreeMap<String, Decimal>);

impl TryFrom<BTreeMap<String, Decimal>> for DecCoins {
    type Error = CoinsError;

    /// Decoded sets must already be in canonical form.
    fn try_from(map: BTreeMap<String, Decimal>) -> Result<Self, Self::Error> {
        for (denom, amount) in &map {
            if amount.is_zero() {
                return Err(CoinsError::Zero(denom.clone()));
            }
            if amount.is_sign_negative() {
                return Err(CoinsError::Negative(denom.clone()));
            }
        }
        Ok(Self(map.into_iter().map(|(d, a)| (d, a.normalize())).collect()))
    }
}

impl DecCoins {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-denomination set. Zero or negative amounts are rejected.
    pub fn single(denom: &str, amount: Decimal) -> Result<Self, CoinsError> {
        let mut out = Self::new();
        out.put(denom, amount)?;
        Ok(out)
    }

    /// Build from `(denom, amount)` pairs, summing duplicates.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, Decimal)>,
    ) -> Result<Self, CoinsError> {
        let mut out = Self::new();
        for (denom, amount) in pairs {
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(CoinsError::Negative(denom.to_string()));
            }
            let sum = add_amounts(out.amount_of(denom), amount)?;
            out.put(denom, sum)?;
        }
        Ok(out)
    }

    fn put(&mut self, denom: &str, amount: Decimal) -> Result<(), CoinsError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CoinsError::Negative(denom.to_string()));
        }
        if amount.is_zero() {
            self.0.remove(denom);
        } else {
            self.0.insert(denom.to_string(), amount.normalize());
        }
        Ok(())
    }

    /// Amount of a denomination (zero if absent).
    pub fn amount_of(&self, denom: &str) -> Decimal {
        self.0.get(denom).copied().unwrap_or(Decimal::ZERO)
    }

    /// True when every amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(denom, amount)` in denomination order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.0.iter().map(|(d, a)| (d.as_str(), *a))
    }

    /// Sum of two sets.
    pub fn checked_add(&self, other: &DecCoins) -> Result<DecCoins, CoinsError> {
        let mut out = self.clone();
        for (denom, amount) in other.iter() {
            let sum = add_amounts(out.amount_of(denom), amount)?;
            out.put(denom, sum)?;
        }
        Ok(out)
    }

    /// Difference of two sets. Fails if any denomination would go negative.
    pub fn checked_sub(&self, other: &DecCoins) -> Result<DecCoins, CoinsError> {
        let mut out = self.clone();
        for (denom, amount) in other.iter() {
            let diff = sub_amounts(denom, out.amount_of(denom), amount)?;
            out.put(denom, diff)?;
        }
        Ok(out)
    }

    /// Multiply every amount by `d`, truncating at `precision`.
    pub fn mul_dec_truncate(&self, d: Decimal, precision: u32) -> Result<DecCoins, CoinsError> {
        let mut out = DecCoins::new();
        for (denom, amount) in self.iter() {
            out.put(denom, mul_truncate(amount, d, precision)?)?;
        }
        Ok(out)
    }

    /// Divide every amount by `d`, truncating at `precision`.
    pub fn quo_dec_truncate(&self, d: Decimal, precision: u32) -> Result<DecCoins, CoinsError> {
        let mut out = DecCoins::new();
        for (denom, amount) in self.iter() {
            out.put(denom, quo_truncate(amount, d, precision)?)?;
        }
        Ok(out)
    }

    /// Per-denomination minimum of two sets.
    pub fn intersect(&self, other: &DecCoins) -> DecCoins {
        let mut out = DecCoins::new();
        for (denom, amount) in self.iter() {
            let min = amount.min(other.amount_of(denom));
            if min > Decimal::ZERO {
                out.0.insert(denom.to_string(), min);
            }
        }
        out
    }

    /// True if every amount is `<=` the matching amount in `other`.
    pub fn is_all_lte(&self, other: &DecCoins) -> bool {
        self.iter().all(|(denom, amount)| amount <= other.amount_of(denom))
    }

    /// Split into whole coins and the decimal change left over.
    pub fn truncate_decimal(&self) -> (Coins, DecCoins) {
        let mut whole = Coins::new();
        let mut change = DecCoins::new();
        for (denom, amount) in self.iter() {
            let int_part = amount.trunc();
            // Amounts are non-negative and below 2^96, so the conversion cannot fail.
            if let Some(n) = int_part.to_u128() {
                if n > 0 {
                    whole.0.insert(denom.to_string(), n);
                }
            }
            let frac = amount - int_part;
            if !frac.is_zero() {
                change.0.insert(denom.to_string(), frac.normalize());
            }
        }
        (whole, change)
    }
}

/// Integer coin set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u128>")]
pub struct Coins(BTreeMap<String, u128>);

impl TryFrom<BTreeMap<String, u128>> for Coins {
    type Error = CoinsError;

    fn try_from(map: BTreeMap<String, u128>) -> Result<Self, Self::Error> {
        match map.iter().find(|(_, a)| **a == 0) {
            Some((denom, _)) => Err(CoinsError::Zero(denom.clone())),
            None => Ok(Self(map)),
        }
    }
}

impl Coins {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-denomination set; zero yields the empty set.
    pub fn single(denom: &str, amount: u128) -> Self {
        let mut out = Self::new();
        if amount > 0 {
            out.0.insert(denom.to_string(), amount);
        }
        out
    }

    /// Amount of a denomination (zero if absent).
    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0.get(denom).copied().unwrap_or(0)
    }

    /// True when every amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(denom, amount)` in denomination order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u128)> {
        self.0.iter().map(|(d, a)| (d.as_str(), *a))
    }

    /// Exact decimal view of these coins.
    pub fn to_dec_coins(&self) -> Result<DecCoins, CoinsError> {
        let mut out = DecCoins::new();
        for (denom, amount) in self.iter() {
            let d = Decimal::from_u128(amount).ok_or(CoinsError::Overflow)?;
            out.0.insert(denom.to_string(), d);
        }
        Ok(out)
    }
}
