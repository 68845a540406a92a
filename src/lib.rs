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

//! Amunchain staking reward distribution.
//!
//! This crate provides:
//! - A per-validator reward period ledger with cumulative per-share ratios (F1 distribution)
//! - An append-only slash event log applied retroactively to delegation stake
//! - On-demand delegation reward calculation and withdrawal
//! - Outstanding reward, commission and community pool accumulators
//! - Deterministic key-value state (in-memory or sled) with all-or-nothing commits
//! - Monitoring via Prometheus metrics and structured logging

/// Core protocol primitives (types, state, economics, distribution).
pub mod core;
/// Observability (metrics, logging setup).
pub mod monitoring;
