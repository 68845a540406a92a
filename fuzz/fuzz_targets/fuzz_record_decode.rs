// Copyright (c) 2026 Amunchain
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use amunchain_distribution::core::distribution::records::{
    DelegatorStartingInfo, FeePool, ValidatorCurrentRewards, ValidatorHistoricalRewards,
    ValidatorSlashEvent, MAX_RECORD_BYTES,
};
use amunchain_distribution::core::types::decode_canonical_limited;
use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;

fuzz_target!(|data: &[u8]| {
    // Stored bytes come from disk; decoding must fail cleanly, never panic.
    let _ = decode_canonical_limited::<ValidatorHistoricalRewards>(data, MAX_RECORD_BYTES);
    let _ = decode_canonical_limited::<ValidatorCurrentRewards>(data, MAX_RECORD_BYTES);
    let _ = decode_canonical_limited::<ValidatorSlashEvent>(data, MAX_RECORD_BYTES);
    let _ = decode_canonical_limited::<DelegatorStartingInfo>(data, MAX_RECORD_BYTES);
    if let Ok(pool) = decode_canonical_limited::<FeePool>(data, MAX_RECORD_BYTES) {
        assert!(pool.community_pool.iter().all(|(_, a)| a > Decimal::ZERO));
    }
});
