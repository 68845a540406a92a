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

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus")]
    Prom,
}

/// Metrics container.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Reward periods closed.
    pub reward_periods_closed_total: IntCounter,
    /// Slash events recorded.
    pub slash_events_total: IntCounter,
    /// Delegation reward withdrawals.
    pub delegation_withdrawals_total: IntCounter,
    /// Validator commission withdrawals.
    pub commission_withdrawals_total: IntCounter,
    /// Reward calculations clamped to outstanding rewards.
    pub rewards_clamped_total: IntCounter,
    /// Historical reward entries deleted at reference count zero.
    pub historical_entries_pruned_total: IntCounter,
    /// Validators with live distribution records.
    pub validators_tracked: IntGauge,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, MetricsError> {
    let c = IntCounter::new(name, help).map_err(|_| MetricsError::Prom)?;
    registry
        .register(Box::new(c.clone()))
        .map_err(|_| MetricsError::Prom)?;
    Ok(c)
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let reward_periods_closed_total = counter(
            &registry,
            "amunchain_distr_reward_periods_closed_total",
            "Reward periods closed",
        )?;
        let slash_events_total = counter(
            &registry,
            "amunchain_distr_slash_events_total",
            "Slash events recorded",
        )?;
        let delegation_withdrawals_total = counter(
            &registry,
            "amunchain_distr_delegation_withdrawals_total",
            "Delegation reward withdrawals",
        )?;
        let commission_withdrawals_total = counter(
            &registry,
            "amunchain_distr_commission_withdrawals_total",
            "Validator commission withdrawals",
        )?;
        let rewards_clamped_total = counter(
            &registry,
            "amunchain_distr_rewards_clamped_total",
            "Reward calculations clamped to outstanding rewards",
        )?;
        let historical_entries_pruned_total = counter(
            &registry,
            "amunchain_distr_historical_entries_pruned_total",
            "Historical reward entries pruned",
        )?;

        let validators_tracked = IntGauge::new(
            "amunchain_distr_validators_tracked",
            "Validators with distribution records",
        )
        .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(validators_tracked.clone()))
            .map_err(|_| MetricsError::Prom)?;

        Ok(Self {
            registry,
            reward_periods_closed_total,
            slash_events_total,
            delegation_withdrawals_total,
            commission_withdrawals_total,
            rewards_clamped_total,
            historical_entries_pruned_total,
            validators_tracked,
        })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|_| MetricsError::Prom)?;
        String::from_utf8(buf).map_err(|_| MetricsError::Prom)
    }
}
