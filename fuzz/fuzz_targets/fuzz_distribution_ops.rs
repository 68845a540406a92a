// Copyright (c) 2026 Amunchain
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use amunchain_distribution::core::distribution::params::Params;
use amunchain_distribution::core::distribution::Keeper;
use amunchain_distribution::core::economics::coins::DecCoins;
use amunchain_distribution::core::economics::staking::{StakingKeeper, StakingLedger};
use amunchain_distribution::core::state::store::{CacheStore, MemStore};
use amunchain_distribution::core::types::{Address, DistributionConfig};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;

#[derive(Arbitrary, Debug)]
enum Op {
    Create { val: u8, rate_pct: u8 },
    Bond { del: u8, val: u8, amount: u32 },
    Unbond { del: u8, val: u8, amount: u32 },
    Allocate { val: u8, amount: u32 },
    Slash { val: u8, bps: u16 },
    Withdraw { del: u8, val: u8 },
    Commission { val: u8 },
    Remove { val: u8 },
}

fn addr(b: u8) -> Address {
    Address::from_bytes(vec![b % 4 + 1; 20])
}

fuzz_target!(|ops: Vec<Op>| {
    let keeper = match Keeper::new(DistributionConfig::default()) {
        Ok(k) => k,
        Err(_) => return,
    };
    let mut store = MemStore::new();
    if keeper.init_genesis(&mut store, &Params::default()).is_err() {
        return;
    }
    let mut ledger = StakingLedger::new();

    for op in ops.into_iter().take(64) {
        // Each op is one transition: commit on success, drop the overlay on failure.
        let mut cache = CacheStore::new(&store);
        let ok = match op {
            Op::Create { val, rate_pct } => ledger
                .create_validator(
                    &keeper,
                    &mut cache,
                    addr(val),
                    Decimal::new(i64::from(rate_pct % 101), 2),
                )
                .is_ok(),
            Op::Bond { del, val, amount } => ledger
                .bond(&keeper, &mut cache, 1, &addr(del), &addr(val), Decimal::from(amount))
                .is_ok(),
            Op::Unbond { del, val, amount } => ledger
                .unbond(&keeper, &mut cache, 2, &addr(del), &addr(val), Decimal::from(amount))
                .is_ok(),
            Op::Allocate { val, amount } => match ledger.validator(&addr(val)) {
                Ok(Some(v)) => DecCoins::single("uamun", Decimal::from(amount))
                    .map(|c| keeper.allocate_tokens_to_validator(&mut cache, &v, &c).is_ok())
                    .unwrap_or(false),
                _ => false,
            },
            Op::Slash { val, bps } => ledger
                .slash_validator(
                    &keeper,
                    &mut cache,
                    3,
                    &addr(val),
                    Decimal::new(i64::from(bps % 10_001), 4),
                )
                .is_ok(),
            Op::Withdraw { del, val } => keeper
                .withdraw_delegation_rewards(&mut cache, &ledger, 4, &addr(del), &addr(val))
                .is_ok(),
            Op::Commission { val } => keeper
                .withdraw_validator_commission(&mut cache, &ledger, &addr(val))
                .is_ok(),
            Op::Remove { val } => ledger.remove_validator(&keeper, &mut cache, &addr(val)).is_ok(),
        };
        if ok {
            let ops = cache.into_ops();
            store.apply(ops);
        }

        // Every live validator keeps its distribution records.
        for b in 0..4u8 {
            if let Ok(Some(v)) = ledger.validator(&addr(b)) {
                assert!(keeper.outstanding_rewards(&store, &v.operator).is_ok());
                assert!(keeper.accumulated_commission(&store, &v.operator).is_ok());
            }
        }
    }
});
