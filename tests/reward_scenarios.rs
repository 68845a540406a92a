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

use amunchain_distribution::core::distribution::error::{DistrError, ErrorKind};
use amunchain_distribution::core::distribution::keys;
use amunchain_distribution::core::distribution::params::Params;
use amunchain_distribution::core::distribution::query::Querier;
use amunchain_distribution::core::distribution::records::{
    ValidatorCurrentRewards, ValidatorHistoricalRewards,
};
use amunchain_distribution::core::distribution::Keeper;
use amunchain_distribution::core::economics::coins::DecCoins;
use amunchain_distribution::core::economics::staking::{
    DelegationInfo, StakingError, StakingKeeper, StakingLedger, ValidatorInfo,
};
use amunchain_distribution::core::state::store::{KvWrite, MemStore};
use amunchain_distribution::core::types::{
    encode_canonical, Address, AddressError, DistributionConfig,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const DENOM: &str = "uamun";

fn addr(b: u8) -> Address {
    Address::from_bytes(vec![b; 20])
}

fn coins(amount: Decimal) -> DecCoins {
    DecCoins::single(DENOM, amount).unwrap()
}

fn setup(external_pool: bool) -> (Keeper, MemStore) {
    let keeper = Keeper::new(DistributionConfig {
        precision: 18,
        external_community_pool: external_pool,
    })
    .unwrap();
    let mut store = MemStore::new();
    keeper.init_genesis(&mut store, &Params::default()).unwrap();
    (keeper, store)
}

fn validator(tokens: Decimal, rate: Decimal) -> ValidatorInfo {
    ValidatorInfo {
        operator: addr(0xaa),
        tokens,
        delegator_shares: tokens,
        commission_rate: rate,
    }
}

fn validator_with(operator: Address) -> ValidatorInfo {
    ValidatorInfo {
        operator,
        ..validator(Decimal::ZERO, Decimal::ZERO)
    }
}

#[test]
fn ratio_delta_times_stake_yields_one() {
    let (keeper, mut store) = setup(false);
    let val = validator(dec!(1000000), Decimal::ZERO);
    keeper.initialize_validator(&mut store, &val).unwrap();

    // ratio[1] = 0.0002, flat through period 3.
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(200)))
        .unwrap();
    assert_eq!(keeper.increment_validator_period(&mut store, &val).unwrap(), 1);
    assert_eq!(keeper.increment_validator_period(&mut store, &val).unwrap(), 2);
    assert_eq!(keeper.increment_validator_period(&mut store, &val).unwrap(), 3);

    let del = DelegationInfo {
        delegator: addr(0x01),
        validator: val.operator.clone(),
        shares: dec!(10000),
    };
    keeper.initialize_delegation(&mut store, 10, &val, &del).unwrap();
    let start = keeper
        .delegator_starting_info(&store, &val.operator, &del.delegator)
        .unwrap()
        .unwrap();
    assert_eq!(start.previous_period, 3);
    assert_eq!(start.stake, dec!(10000));

    assert_eq!(keeper.increment_validator_period(&mut store, &val).unwrap(), 4);
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(100)))
        .unwrap();
    assert_eq!(keeper.increment_validator_period(&mut store, &val).unwrap(), 5);

    let ratio = |p| {
        keeper
            .historical_rewards(&store, &val.operator, p)
            .unwrap()
            .unwrap()
            .cumulative_reward_ratio
            .amount_of(DENOM)
    };
    assert_eq!(ratio(3), dec!(0.0002));
    assert_eq!(ratio(5), dec!(0.0003));

    let reward = keeper
        .calculate_delegation_rewards(&store, 11, &val, &del, 5)
        .unwrap();
    assert_eq!(reward.amount_of(DENOM), dec!(1.0));
}

#[test]
fn zero_stake_period_keeps_ratio_and_moves_pot_to_pool() {
    let (keeper, mut store) = setup(false);
    let val = validator(Decimal::ZERO, Decimal::ZERO);
    keeper.initialize_validator(&mut store, &val).unwrap();
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(7)))
        .unwrap();

    let closed = keeper.increment_validator_period(&mut store, &val).unwrap();
    let hist = keeper
        .historical_rewards(&store, &val.operator, closed)
        .unwrap()
        .unwrap();
    assert!(hist.cumulative_reward_ratio.is_zero());
    assert!(keeper
        .outstanding_rewards(&store, &val.operator)
        .unwrap()
        .rewards
        .is_zero());
    assert_eq!(keeper.community_pool(&store).unwrap(), coins(dec!(7)));
}

#[test]
fn withdrawal_conserves_funds() {
    let (keeper, mut store) = setup(false);
    let mut ledger = StakingLedger::new();
    let op = addr(0xaa);
    let (alice, bob) = (addr(0x01), addr(0x02));
    ledger
        .create_validator(&keeper, &mut store, op.clone(), Decimal::ZERO)
        .unwrap();
    ledger
        .bond(&keeper, &mut store, 1, &alice, &op, dec!(100))
        .unwrap();
    ledger.bond(&keeper, &mut store, 1, &bob, &op, dec!(200)).unwrap();

    let val = ledger.validator(&op).unwrap().unwrap();
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(10)))
        .unwrap();

    let payout = keeper
        .withdraw_delegation_rewards(&mut store, &ledger, 2, &alice, &op)
        .unwrap();
    assert_eq!(payout.recipient, alice);
    assert_eq!(payout.amount.amount_of(DENOM), 3);

    let outstanding = keeper.outstanding_rewards(&store, &op).unwrap().rewards;
    let pool = keeper.community_pool(&store).unwrap();
    assert!(pool.amount_of(DENOM) > Decimal::ZERO && pool.amount_of(DENOM) < Decimal::ONE);
    assert_eq!(
        outstanding.amount_of(DENOM) + pool.amount_of(DENOM) + Decimal::from(3u32),
        dec!(10)
    );

    // The baseline was reset: nothing more is owed right away.
    let again = keeper
        .withdraw_delegation_rewards(&mut store, &ledger, 3, &alice, &op)
        .unwrap();
    assert!(again.amount.is_zero());
}

#[test]
fn slash_between_allocations_reduces_stake_for_later_interval() {
    let (keeper, mut store) = setup(false);
    let mut ledger = StakingLedger::new();
    let op = addr(0xaa);
    let alice = addr(0x01);
    let carol = addr(0x03);
    ledger
        .create_validator(&keeper, &mut store, op.clone(), Decimal::ZERO)
        .unwrap();
    ledger
        .bond(&keeper, &mut store, 1, &alice, &op, dec!(100))
        .unwrap();
    ledger
        .bond(&keeper, &mut store, 1, &carol, &op, dec!(100))
        .unwrap();

    let val = ledger.validator(&op).unwrap().unwrap();
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(20)))
        .unwrap();
    ledger
        .slash_validator(&keeper, &mut store, 2, &op, dec!(0.5))
        .unwrap();
    let val = ledger.validator(&op).unwrap().unwrap();
    assert_eq!(val.tokens, dec!(100));
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(20)))
        .unwrap();

    // 0.1 * 100 before the slash, 0.2 * 50 after it.
    let payout = keeper
        .withdraw_delegation_rewards(&mut store, &ledger, 3, &alice, &op)
        .unwrap();
    assert_eq!(payout.amount.amount_of(DENOM), 20);

    let events: Vec<_> = keeper
        .slash_events(&store, &op, 0, u64::MAX)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].fraction, dec!(0.5));
    assert_eq!(events[0].height, 2);
}

#[test]
fn reward_preview_is_idempotent_and_read_only() {
    let (keeper, mut store) = setup(false);
    let mut ledger = StakingLedger::new();
    let op = addr(0xaa);
    let alice = addr(0x01);
    ledger
        .create_validator(&keeper, &mut store, op.clone(), dec!(0.1))
        .unwrap();
    ledger
        .bond(&keeper, &mut store, 1, &alice, &op, dec!(300))
        .unwrap();
    let val = ledger.validator(&op).unwrap().unwrap();
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(33)))
        .unwrap();

    let snapshot = store.clone();
    let querier = Querier::new(&keeper, &store, &ledger, 5);
    let first = querier
        .delegation_rewards(&alice.to_hex(), &op.to_hex())
        .unwrap();
    let second = querier
        .delegation_rewards(&alice.to_hex(), &op.to_hex())
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.amount_of(DENOM), dec!(29.7));

    let total = querier.delegation_total_rewards(&alice.to_hex()).unwrap();
    assert_eq!(total.total, first);
    assert_eq!(total.rewards.len(), 1);
    assert_eq!(querier.delegator_validators(&alice.to_hex()).unwrap(), vec![op.clone()]);
    assert_eq!(store, snapshot);
}

#[test]
fn validator_distribution_info_requires_self_delegation() {
    let (keeper, mut store) = setup(false);
    let mut ledger = StakingLedger::new();
    let op = addr(0xaa);
    ledger
        .create_validator(&keeper, &mut store, op.clone(), dec!(0.5))
        .unwrap();

    let querier = Querier::new(&keeper, &store, &ledger, 1);
    let err = querier.validator_distribution_info(&op.to_hex()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = querier.validator_distribution_info("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = querier.validator_commission(&addr(0xbb).to_hex()).unwrap_err();
    assert!(matches!(err, DistrError::NoValidatorExists(_)));

    ledger.bond(&keeper, &mut store, 1, &op, &op, dec!(10)).unwrap();
    let val = ledger.validator(&op).unwrap().unwrap();
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(4)))
        .unwrap();
    let querier = Querier::new(&keeper, &store, &ledger, 2);
    let info = querier.validator_distribution_info(&op.to_hex()).unwrap();
    assert_eq!(info.operator, op);
    assert_eq!(info.commission.amount_of(DENOM), dec!(2));
    assert_eq!(info.self_bond_rewards.amount_of(DENOM), dec!(2));
}

#[test]
fn commission_withdrawal_keeps_decimal_change() {
    let (keeper, mut store) = setup(false);
    let mut ledger = StakingLedger::new();
    let op = addr(0xaa);
    ledger
        .create_validator(&keeper, &mut store, op.clone(), dec!(0.1))
        .unwrap();

    let err = keeper
        .withdraw_validator_commission(&mut store, &ledger, &op)
        .unwrap_err();
    assert!(matches!(err, DistrError::NoValidatorCommission(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let val = ledger.validator(&op).unwrap().unwrap();
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(105)))
        .unwrap();
    let payout = keeper
        .withdraw_validator_commission(&mut store, &ledger, &op)
        .unwrap();
    assert_eq!(payout.recipient, op);
    assert_eq!(payout.amount.amount_of(DENOM), 10);
    assert_eq!(
        keeper.accumulated_commission(&store, &op).unwrap().commission,
        coins(dec!(0.5))
    );
    assert_eq!(
        keeper.outstanding_rewards(&store, &op).unwrap().rewards,
        coins(dec!(95))
    );
}

#[test]
fn withdraw_address_redirects_payouts() {
    let (keeper, mut store) = setup(false);
    let mut ledger = StakingLedger::new();
    let op = addr(0xaa);
    let alice = addr(0x01);
    let cold = addr(0x0c);
    ledger
        .create_validator(&keeper, &mut store, op.clone(), Decimal::ZERO)
        .unwrap();
    ledger
        .bond(&keeper, &mut store, 1, &alice, &op, dec!(50))
        .unwrap();

    let err = keeper
        .set_withdraw_address(&mut store, &alice, &Address::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    keeper.set_withdraw_address(&mut store, &alice, &cold).unwrap();
    assert_eq!(keeper.withdraw_address(&store, &alice).unwrap(), cold);

    let val = ledger.validator(&op).unwrap().unwrap();
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(5)))
        .unwrap();
    let payout = keeper
        .withdraw_delegation_rewards(&mut store, &ledger, 2, &alice, &op)
        .unwrap();
    assert_eq!(payout.recipient, cold);
    assert_eq!(payout.amount.amount_of(DENOM), 5);

    keeper
        .set_params(
            &mut store,
            &Params {
                withdraw_addr_enabled: false,
                ..Params::default()
            },
        )
        .unwrap();
    let err = keeper
        .set_withdraw_address(&mut store, &alice, &alice)
        .unwrap_err();
    assert!(matches!(err, DistrError::SetWithdrawAddrDisabled));
}

#[test]
fn external_pool_rejects_pool_operations_and_escrows_funds() {
    let (keeper, mut store) = setup(true);
    let err = keeper.community_pool(&store).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let ledger = StakingLedger::new();
    let err = Querier::new(&keeper, &store, &ledger, 1)
        .community_pool()
        .unwrap_err();
    assert!(matches!(err, DistrError::ExternalCommunityPool));

    let fund = DecCoins::single(DENOM, dec!(3)).unwrap().truncate_decimal().0;
    assert!(keeper.fund_community_pool(&mut store, &fund).is_err());
    assert!(keeper
        .distribute_from_community_pool(&mut store, &fund, &addr(0x01))
        .is_err());

    // Fees with no voting power go to the escrow instead of the pool.
    keeper
        .allocate_tokens(&mut store, &coins(dec!(12)), &[])
        .unwrap();
    assert_eq!(
        keeper.take_external_pool_escrow(&mut store).unwrap(),
        coins(dec!(12))
    );
    assert!(keeper.take_external_pool_escrow(&mut store).unwrap().is_zero());

    let (internal, mut internal_store) = setup(false);
    let err = internal
        .take_external_pool_escrow(&mut internal_store)
        .unwrap_err();
    assert!(matches!(err, DistrError::InternalCommunityPool));
}

#[test]
fn community_pool_fund_and_spend() {
    let (keeper, mut store) = setup(false);
    let five = coins(dec!(5)).truncate_decimal().0;
    let nine = coins(dec!(9)).truncate_decimal().0;
    keeper.fund_community_pool(&mut store, &five).unwrap();

    let err = keeper
        .distribute_from_community_pool(&mut store, &nine, &addr(0x01))
        .unwrap_err();
    assert!(matches!(err, DistrError::InsufficientCommunityPool));

    let payout = keeper
        .distribute_from_community_pool(&mut store, &five, &addr(0x01))
        .unwrap();
    assert_eq!(payout.amount, five);
    assert!(keeper.community_pool(&store).unwrap().is_zero());
}

#[test]
fn allocate_tokens_applies_tax_and_power_split() {
    let (keeper, mut store) = setup(false);
    let a = ValidatorInfo {
        operator: addr(0xa1),
        ..validator(dec!(100), Decimal::ZERO)
    };
    let b = ValidatorInfo {
        operator: addr(0xb2),
        ..validator(dec!(300), Decimal::ZERO)
    };
    keeper.initialize_validator(&mut store, &a).unwrap();
    keeper.initialize_validator(&mut store, &b).unwrap();

    use amunchain_distribution::core::distribution::allocation::VoteInfo;
    let votes = [
        VoteInfo {
            validator: a.clone(),
            power: 1,
        },
        VoteInfo {
            validator: b.clone(),
            power: 3,
        },
    ];
    keeper
        .allocate_tokens(&mut store, &coins(dec!(100)), &votes)
        .unwrap();

    // 2% tax, then 98 split 1:3.
    let out_a = keeper.outstanding_rewards(&store, &a.operator).unwrap().rewards;
    let out_b = keeper.outstanding_rewards(&store, &b.operator).unwrap().rewards;
    assert_eq!(out_a.amount_of(DENOM), dec!(24.5));
    assert_eq!(out_b.amount_of(DENOM), dec!(73.5));
    assert_eq!(keeper.community_pool(&store).unwrap(), coins(dec!(2)));
}

#[test]
fn removed_validator_pays_commission_and_clears_records() {
    let (keeper, mut store) = setup(false);
    let mut ledger = StakingLedger::new();
    let op = addr(0xaa);
    ledger
        .create_validator(&keeper, &mut store, op.clone(), dec!(0.1))
        .unwrap();
    ledger.bond(&keeper, &mut store, 1, &op, &op, dec!(100)).unwrap();
    let val = ledger.validator(&op).unwrap().unwrap();
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(15)))
        .unwrap();

    let (released, payout) = ledger
        .unbond(&keeper, &mut store, 2, &op, &op, dec!(100))
        .unwrap();
    assert_eq!(released, dec!(100));
    assert_eq!(payout.amount.amount_of(DENOM), 13);

    let err = ledger
        .bond(&keeper, &mut store, 3, &op, &addr(0xee), dec!(1))
        .unwrap_err();
    assert!(err.to_string().contains("unknown validator"));

    let payouts = ledger.remove_validator(&keeper, &mut store, &op).unwrap();
    assert_eq!(payouts.len(), 1);
    assert_eq!(payouts[0].amount.amount_of(DENOM), 1);
    assert_eq!(keeper.community_pool(&store).unwrap(), coins(dec!(1)));

    let err = keeper.current_rewards(&store, &op).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(keeper.historical_rewards_of(&store, &op).unwrap().is_empty());
    assert_eq!(keeper.slash_events(&store, &op, 0, u64::MAX).count(), 0);
}

#[test]
fn calculation_rejects_inverted_range_and_missing_start() {
    let (keeper, mut store) = setup(false);
    let val = validator(dec!(10), Decimal::ZERO);
    keeper.initialize_validator(&mut store, &val).unwrap();
    let del = DelegationInfo {
        delegator: addr(0x01),
        validator: val.operator.clone(),
        shares: dec!(10),
    };

    let err = keeper
        .calculate_delegation_rewards(&store, 2, &val, &del, 0)
        .unwrap_err();
    assert!(matches!(err, DistrError::EmptyDelegationDistInfo { .. }));

    keeper.increment_validator_period(&mut store, &val).unwrap();
    keeper.increment_validator_period(&mut store, &val).unwrap();
    keeper.initialize_delegation(&mut store, 1, &val, &del).unwrap();
    let err = keeper
        .calculate_delegation_rewards(&store, 2, &val, &del, 1)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(keeper
        .calculate_delegation_rewards(&store, 2, &val, &del, 2)
        .unwrap()
        .is_zero());
    // Same-height lookups short-circuit.
    assert!(keeper
        .calculate_delegation_rewards(&store, 1, &val, &del, 5)
        .unwrap()
        .is_zero());
}

#[test]
fn consecutive_slashes_in_one_interval_compound() {
    let (keeper, mut store) = setup(false);
    let mut ledger = StakingLedger::new();
    let op = addr(0xaa);
    let alice = addr(0x01);
    ledger
        .create_validator(&keeper, &mut store, op.clone(), Decimal::ZERO)
        .unwrap();
    ledger
        .bond(&keeper, &mut store, 1, &alice, &op, dec!(100))
        .unwrap();

    // 10 over 100 tokens, 10 over 50, 10 over 25: the stake halves with each slash.
    for (height, slash) in [(2, true), (3, true), (4, false)] {
        let val = ledger.validator(&op).unwrap().unwrap();
        keeper
            .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(10)))
            .unwrap();
        if slash {
            ledger
                .slash_validator(&keeper, &mut store, height, &op, dec!(0.5))
                .unwrap();
        }
    }
    assert_eq!(ledger.validator(&op).unwrap().unwrap().tokens, dec!(25));
    assert_eq!(keeper.slash_events(&store, &op, 0, u64::MAX).count(), 2);

    let payout = keeper
        .withdraw_delegation_rewards(&mut store, &ledger, 5, &alice, &op)
        .unwrap();
    assert_eq!(payout.amount.amount_of(DENOM), 30);
    assert!(keeper.outstanding_rewards(&store, &op).unwrap().rewards.is_zero());
}

#[test]
fn reference_counts_never_wrap() {
    let (keeper, mut store) = setup(false);
    let op = addr(0xaa);

    let err = keeper
        .decrement_reference_count(&mut store, &op, 7)
        .unwrap_err();
    assert!(matches!(
        err,
        DistrError::MissingHistoricalRewards { period: 7, .. }
    ));

    let drained = ValidatorHistoricalRewards {
        cumulative_reward_ratio: DecCoins::new(),
        reference_count: 0,
    };
    store
        .set(
            &keys::historical_rewards_key(&op, 7),
            encode_canonical(&drained).unwrap(),
        )
        .unwrap();
    let err = keeper
        .decrement_reference_count(&mut store, &op, 7)
        .unwrap_err();
    assert!(matches!(
        err,
        DistrError::ReferenceCountUnderflow { period: 7, .. }
    ));
    assert_eq!(
        keeper.historical_rewards(&store, &op, 7).unwrap(),
        Some(drained)
    );
}

#[test]
fn corrupt_records_abort_the_calculation() {
    let (keeper, mut store) = setup(false);
    let mut ledger = StakingLedger::new();
    let op = addr(0xaa);
    let alice = addr(0x01);
    ledger
        .create_validator(&keeper, &mut store, op.clone(), Decimal::ZERO)
        .unwrap();
    ledger
        .bond(&keeper, &mut store, 1, &alice, &op, dec!(100))
        .unwrap();
    let val = ledger.validator(&op).unwrap().unwrap();
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(10)))
        .unwrap();
    ledger
        .slash_validator(&keeper, &mut store, 2, &op, dec!(0.1))
        .unwrap();
    let val = ledger.validator(&op).unwrap().unwrap();
    keeper
        .allocate_tokens_to_validator(&mut store, &val, &coins(dec!(10)))
        .unwrap();
    let end = keeper.increment_validator_period(&mut store, &val).unwrap();
    let del = ledger.delegation(&alice, &op).unwrap().unwrap();
    assert!(keeper
        .calculate_delegation_rewards(&store, 3, &val, &del, end)
        .is_ok());

    let event = keeper
        .slash_events(&store, &op, 0, u64::MAX)
        .next()
        .unwrap()
        .unwrap();
    let mut bad_slash = store.clone();
    bad_slash
        .set(
            &keys::slash_event_key(&op, event.validator_period, event.height),
            vec![0xff, 0x01],
        )
        .unwrap();
    let err = keeper
        .calculate_delegation_rewards(&bad_slash, 3, &val, &del, end)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);

    let mut bad_history = store.clone();
    bad_history
        .set(&keys::historical_rewards_key(&op, end), vec![0xff])
        .unwrap();
    let err = keeper
        .calculate_delegation_rewards(&bad_history, 3, &val, &del, end)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
}

#[test]
fn over_long_addresses_are_rejected_before_keys_collide() {
    let (keeper, mut store) = setup(false);
    let mut ledger = StakingLedger::new();
    let short = Address::from_bytes(vec![0x01; 255]);
    let long = Address::from_bytes(vec![0x01; 256]);

    ledger
        .create_validator(&keeper, &mut store, short.clone(), Decimal::ZERO)
        .unwrap();
    let err = ledger
        .create_validator(&keeper, &mut store, long.clone(), Decimal::ZERO)
        .unwrap_err();
    assert!(matches!(
        err,
        StakingError::InvalidAddress(AddressError::TooLong(256))
    ));
    assert_eq!(keeper.historical_rewards_of(&store, &short).unwrap().len(), 1);

    let err = keeper
        .initialize_validator(&mut store, &validator_with(long.clone()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = keeper
        .set_withdraw_address(&mut store, &addr(0x01), &long)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(matches!(
        Address::from_hex(&"01".repeat(256)),
        Err(AddressError::TooLong(256))
    ));
    assert_eq!(Address::from_hex(&"01".repeat(255)).unwrap(), short);

    ledger.remove_validator(&keeper, &mut store, &short).unwrap();
    assert!(keeper.historical_rewards_of(&store, &short).unwrap().is_empty());
}

#[test]
fn delegation_on_unopened_period_is_rejected() {
    let (keeper, mut store) = setup(false);
    let val = validator(dec!(10), Decimal::ZERO);
    let del = DelegationInfo {
        delegator: addr(0x01),
        validator: val.operator.clone(),
        shares: dec!(10),
    };
    let stale = ValidatorCurrentRewards {
        rewards: DecCoins::new(),
        period: 0,
    };
    store
        .set(
            &keys::current_rewards_key(&val.operator),
            encode_canonical(&stale).unwrap(),
        )
        .unwrap();
    let err = keeper
        .initialize_delegation(&mut store, 1, &val, &del)
        .unwrap_err();
    assert!(matches!(err, DistrError::MissingHistoricalRewards { .. }));
}
