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

//! Distribution state inspector.
//! Opens a state directory, writes genesis if it is empty and answers read-only queries.

use amunchain_distribution::core::distribution::query::{PageRequest, Querier};
use amunchain_distribution::core::distribution::Keeper;
use amunchain_distribution::core::economics::staking::StakingLedger;
use amunchain_distribution::core::state::persistent_state::PersistentState;
use amunchain_distribution::core::state::store::CacheStore;
use amunchain_distribution::core::types::NodeConfig;
use amunchain_distribution::monitoring::logging::init_logging;
use amunchain_distribution::monitoring::metrics::Metrics;
use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

const USAGE: &str = "usage: amun-distr [-c CONFIG] <params | community-pool | \
slashes VALIDATOR START END | withdraw-address DELEGATOR | metrics>";

fn arg<'a>(args: &'a [String], i: usize, name: &str) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing {name}\n{USAGE}"))
}

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut config_path = String::from("distribution.toml");
    if args.first().map(String::as_str) == Some("-c") {
        config_path = arg(&args, 1, "config path")?.to_string();
        args.drain(..2);
    }

    let cfg = NodeConfig::load(&config_path)
        .with_context(|| format!("loading config from {config_path}"))?;
    init_logging(&cfg.log)?;

    let metrics = Metrics::new().map_err(|e| anyhow!("metrics init: {e}"))?;
    let keeper = Keeper::new(cfg.distribution.clone())?.with_metrics(metrics.clone());
    let state = PersistentState::open(&cfg.node.data_dir)
        .with_context(|| format!("opening state at {}", cfg.node.data_dir))?;

    if !keeper.is_initialized(&state)? {
        let mut cache = CacheStore::new(&state);
        keeper.init_genesis(&mut cache, &cfg.genesis)?;
        state.commit_atomic(cache.into_ops())?;
        info!(node = %cfg.node.name, "genesis written");
    }

    // Staking state lives with the staking module; the inspector sees none of it.
    let staking = StakingLedger::new();
    let querier = Querier::new(&keeper, &state, &staking, 0);

    let command = arg(&args, 0, "command")?;
    match command {
        "params" => {
            let p = querier.params()?;
            println!("community_tax = {}", p.community_tax);
            println!("withdraw_addr_enabled = {}", p.withdraw_addr_enabled);
        }
        "community-pool" => {
            for (denom, amount) in querier.community_pool()?.iter() {
                println!("{amount}{denom}");
            }
        }
        "slashes" => {
            let validator = arg(&args, 1, "validator")?;
            let start: u64 = arg(&args, 2, "start period")?.parse()?;
            let end: u64 = arg(&args, 3, "end period")?.parse()?;
            let mut page = PageRequest::default();
            loop {
                let (events, resp) = querier.validator_slashes(validator, start, end, &page)?;
                for ev in events {
                    println!(
                        "period={} height={} fraction={}",
                        ev.validator_period, ev.height, ev.fraction
                    );
                }
                match resp.next_key {
                    Some(k) => page.key = Some(k),
                    None => break,
                }
            }
        }
        "withdraw-address" => {
            let delegator = arg(&args, 1, "delegator")?;
            println!("{}", querier.delegator_withdraw_address(delegator)?);
        }
        "metrics" => {
            print!("{}", metrics.render().map_err(|e| anyhow!("metrics: {e}"))?);
        }
        other => bail!("unknown command `{other}`\n{USAGE}"),
    }
    Ok(())
}
