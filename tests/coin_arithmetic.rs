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

use amunchain_distribution::core::distribution::error::ErrorKind;
use amunchain_distribution::core::distribution::keys;
use amunchain_distribution::core::distribution::params::Params;
use amunchain_distribution::core::distribution::Keeper;
use amunchain_distribution::core::economics::coins::{
    mul_truncate, quo_truncate, Coins, CoinsError, DecCoins,
};
use amunchain_distribution::core::economics::staking::{DelegationInfo, ValidatorInfo};
use amunchain_distribution::core::state::store::{KvWrite, MemStore};
use amunchain_distribution::core::types::{
    decode_canonical_limited, encode_canonical, Address, DistributionConfig,
};
use num_bigint::BigUint;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

const DENOM: &str = "uamun";

fn parts(d: Decimal) -> (BigUint, u32) {
    (BigUint::from(d.mantissa().unsigned_abs()), d.scale())
}

fn pow10(n: u32) -> BigUint {
    BigUint::from(10u32).pow(n)
}

/// `x / 10^sx <= y / 10^sy`
fn le(x: &BigUint, sx: u32, y: &BigUint, sy: u32) -> bool {
    x * pow10(sy) <= y * pow10(sx)
}

fn decimal() -> impl Strategy<Value = Decimal> {
    (any::<u128>(), 0u32..=28).prop_map(|(m, s)| {
        Decimal::from_i128_with_scale((m % (1u128 << 96)) as i128, s)
    })
}

#[test]
fn product_beyond_mantissa_is_cut_not_rounded() {
    let r = mul_truncate(dec!(0.123456789123456789), dec!(1234567891234569), 18).unwrap();
    // Exact: 152415787806736.922193262134538941
    assert_eq!(r, dec!(152415787806736.92219326213453));
}

#[test]
fn quotient_times_divisor_never_exceeds_dividend() {
    let ratio = quo_truncate(dec!(2000000000000), dec!(3), 18).unwrap();
    assert_eq!(ratio, dec!(666666666666.66666666666666666));
    let back = mul_truncate(ratio, dec!(3), 18).unwrap();
    assert!(back <= dec!(2000000000000));
    assert_eq!(quo_truncate(dec!(1), Decimal::ZERO, 18), Err(CoinsError::DivisionByZero));
}

#[test]
fn large_pot_over_small_stake_pays_at_most_the_pot() {
    let keeper = Keeper::new(DistributionConfig::default()).unwrap();
    let mut store = MemStore::new();
    keeper.init_genesis(&mut store, &Params::default()).unwrap();
    let val = ValidatorInfo {
        operator: Address::from_bytes(vec![0xaa; 20]),
        tokens: dec!(3),
        delegator_shares: dec!(3),
        commission_rate: Decimal::ZERO,
    };
    let del = DelegationInfo {
        delegator: Address::from_bytes(vec![0x01; 20]),
        validator: val.operator.clone(),
        shares: dec!(3),
    };
    keeper.initialize_validator(&mut store, &val).unwrap();
    keeper.initialize_delegation(&mut store, 1, &val, &del).unwrap();

    let pot = DecCoins::single(DENOM, dec!(2000000000000)).unwrap();
    keeper.allocate_tokens_to_validator(&mut store, &val, &pot).unwrap();
    let end = keeper.increment_validator_period(&mut store, &val).unwrap();

    let reward = keeper
        .calculate_delegation_rewards(&store, 2, &val, &del, end)
        .unwrap();
    assert_eq!(reward.amount_of(DENOM), dec!(1999999999999.9999999999999999));
    assert!(reward.is_all_lte(&pot));
}

#[test]
fn sums_of_mismatched_scales_do_not_round_up() {
    let a = DecCoins::single(DENOM, dec!(10000000000000000000)).unwrap();
    let b = DecCoins::single(DENOM, dec!(0.123456789123456789)).unwrap();
    let sum = a.checked_add(&b).unwrap();
    assert_eq!(sum.amount_of(DENOM), dec!(10000000000000000000.123456789));
    assert!(matches!(b.checked_sub(&a), Err(CoinsError::Negative(_))));
}

#[test]
fn decoded_coin_sets_must_be_canonical() {
    let mut negative = BTreeMap::new();
    negative.insert(DENOM.to_string(), dec!(-5));
    let bytes = encode_canonical(&negative).unwrap();
    assert!(decode_canonical_limited::<DecCoins>(&bytes, 1024).is_err());

    let mut zero = BTreeMap::new();
    zero.insert(DENOM.to_string(), 0u128);
    let bytes = encode_canonical(&zero).unwrap();
    assert!(decode_canonical_limited::<Coins>(&bytes, 1024).is_err());

    let good = DecCoins::single(DENOM, dec!(1.5)).unwrap();
    let bytes = encode_canonical(&good).unwrap();
    assert_eq!(decode_canonical_limited::<DecCoins>(&bytes, 1024).unwrap(), good);

    // A stored record carrying a negative amount surfaces as a storage failure.
    let keeper = Keeper::new(DistributionConfig::default()).unwrap();
    let mut store = MemStore::new();
    let op = Address::from_bytes(vec![0xaa; 20]);
    store
        .set(
            &keys::outstanding_rewards_key(&op),
            encode_canonical(&negative).unwrap(),
        )
        .unwrap();
    let err = keeper.outstanding_rewards(&store, &op).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
}

proptest! {
    #[test]
    fn prop_mul_truncate_is_floor_at_result_scale(a in decimal(), b in decimal(), p in 0u32..=28) {
        let (ma, sa) = parts(a);
        let (mb, sb) = parts(b);
        let exact = &ma * &mb;
        match mul_truncate(a, b, p) {
            Ok(r) => {
                let (mr, sr) = parts(r);
                prop_assert!(sr <= p);
                prop_assert!(le(&mr, sr, &exact, sa + sb));
                prop_assert!(!le(&(mr + 1u32), sr, &exact, sa + sb));
            }
            // Only when the integer part alone exceeds the mantissa.
            Err(e) => {
                prop_assert_eq!(e, CoinsError::Overflow);
                prop_assert!(exact / pow10(sa + sb) >= BigUint::from(1u128 << 96));
            }
        }
    }

    #[test]
    fn prop_quo_truncate_is_floor_at_result_scale(a in decimal(), b in decimal(), p in 0u32..=28) {
        prop_assume!(!b.is_zero());
        let (ma, sa) = parts(a);
        let (mb, sb) = parts(b);
        match quo_truncate(a, b, p) {
            Ok(r) => {
                let (mr, sr) = parts(r);
                prop_assert!(sr <= p);
                prop_assert!(le(&(&mr * &mb), sr + sb, &ma, sa));
                prop_assert!(!le(&((mr + 1u32) * &mb), sr + sb, &ma, sa));
            }
            Err(e) => prop_assert_eq!(e, CoinsError::Overflow),
        }
    }
}
