// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

/// Reward distribution keeper (period ledger, slash log, reward calculator).
pub mod distribution;
/// Decimal coins and the staking registry boundary.
pub mod economics;
/// Key-value state views.
pub mod state;
/// Canonical encoding, addresses and node configuration.
pub mod types;
