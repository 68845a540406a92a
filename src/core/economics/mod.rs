// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

/// Multi-denomination decimal and integer coins.
pub mod coins;
/// Staking registry boundary and the in-memory staking ledger.
pub mod staking;
