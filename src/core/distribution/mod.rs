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

//! Staking reward distribution (F1 fee distribution).
//!
//! Each validator owns a sequence of reward periods. Closing a period folds the
//! rewards accrued during it into a cumulative per-share ratio. A delegation records
//! the period it started after; its reward is the ratio delta up to the ending
//! period times its stake, with the stake reduced at every slash in between.
//!
//! The [`Keeper`] holds only configuration. All state lives in the store view
//! passed to each call; wrap a transition in a
//! [`CacheStore`](crate::core::state::store::CacheStore) to commit or discard it as a unit.

use crate::core::distribution::error::{DistrError, Result};
use crate::core::economics::coins::Coins;
use crate::core::types::{Address, DistributionConfig};
use crate::monitoring::metrics::Metrics;

/// Fee and commission allocation, outstanding rewards, community pool.
pub mod allocation;
/// Error taxonomy.
pub mod error;
/// Staking lifecycle hooks.
pub mod hooks;
/// Store key layout.
pub mod keys;
/// Parameters and genesis.
pub mod params;
/// Reward period ledger.
pub mod period;
/// Read-only query surface.
pub mod query;
/// Stored records.
pub mod records;
/// Delegation reward calculation and withdrawal.
pub mod rewards;
/// Slash event log.
pub mod slash;
/// Withdraw address registry.
pub mod withdraw;

/// Coins owed to an account. The caller's bank moves them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payout {
    /// Receiving account.
    pub recipient: Address,
    /// Whole coins to transfer.
    pub amount: Coins,
}

/// Distribution keeper.
#[derive(Clone)]
pub struct Keeper {
    cfg: DistributionConfig,
    metrics: Option<Metrics>,
}

impl Keeper {
    /// Create a keeper. Rejects a precision the decimal backend cannot hold.
    pub fn new(cfg: DistributionConfig) -> Result<Self> {
        cfg.validate()
            .map_err(|e| DistrError::InvalidArgument(e.to_string()))?;
        Ok(Self { cfg, metrics: None })
    }

    /// Attach metrics.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Decimal places kept by ratios and truncated amounts.
    pub fn precision(&self) -> u32 {
        self.cfg.precision
    }

    /// True when the community pool is owned by an external module.
    pub fn has_external_community_pool(&self) -> bool {
        self.cfg.external_community_pool
    }

    pub(crate) fn observe(&self, f: impl FnOnce(&Metrics)) {
        if let Some(m) = &self.metrics {
            f(m);
        }
    }

    /// Reject addresses the store keys cannot hold.
    pub(crate) fn check_address(field: &str, addr: &Address) -> Result<()> {
        addr.validate().map_err(|e| DistrError::bad_address(field, e))
    }
}
