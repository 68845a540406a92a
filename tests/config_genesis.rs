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

use amunchain_distribution::core::distribution::Keeper;
use amunchain_distribution::core::state::persistent_state::PersistentState;
use amunchain_distribution::core::state::store::CacheStore;
use amunchain_distribution::core::types::{ConfigError, DistributionConfig, NodeConfig};
use amunchain_distribution::monitoring::metrics::Metrics;
use rust_decimal_macros::dec;

#[test]
fn minimal_config_uses_defaults() {
    let cfg = NodeConfig::from_toml_str(
        r#"
        [node]
        name = "distr-1"
        data_dir = "/tmp/distr-1"
        "#,
    )
    .unwrap();
    assert_eq!(cfg.distribution, DistributionConfig::default());
    assert_eq!(cfg.distribution.precision, 18);
    assert!(!cfg.distribution.external_community_pool);
    assert_eq!(cfg.genesis.community_tax, dec!(0.02));
    assert_eq!(cfg.log.level, "info");
}

#[test]
fn rejects_out_of_range_values() {
    let too_precise = NodeConfig::from_toml_str(
        r#"
        [node]
        name = "n"
        data_dir = "d"
        [distribution]
        precision = 29
        "#,
    );
    assert!(matches!(too_precise, Err(ConfigError::Invalid(_))));

    let bad_tax = NodeConfig::from_toml_str(
        r#"
        [node]
        name = "n"
        data_dir = "d"
        [genesis]
        community_tax = "1.5"
        withdraw_addr_enabled = true
        "#,
    );
    assert!(matches!(bad_tax, Err(ConfigError::Invalid(_))));

    assert!(matches!(
        NodeConfig::from_toml_str("[node]\nname = 1"),
        Err(ConfigError::Parse(_))
    ));
    assert!(Keeper::new(DistributionConfig {
        precision: 40,
        external_community_pool: false,
    })
    .is_err());
}

#[test]
fn genesis_commits_atomically_to_sled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_str().unwrap();
    let metrics = Metrics::new().unwrap();
    let keeper = Keeper::new(DistributionConfig::default())
        .unwrap()
        .with_metrics(metrics.clone());

    {
        let st = PersistentState::open(path).unwrap();
        assert!(!keeper.is_initialized(&st).unwrap());
        let mut cache = CacheStore::new(&st);
        keeper
            .init_genesis(&mut cache, &Default::default())
            .unwrap();
        assert!(keeper.is_initialized(&cache).unwrap());
        assert!(!keeper.is_initialized(&st).unwrap());
        st.commit_atomic(cache.into_ops()).unwrap();
    }

    let st = PersistentState::open(path).unwrap();
    assert!(keeper.is_initialized(&st).unwrap());
    assert_eq!(keeper.params(&st).unwrap().community_tax, dec!(0.02));
    assert!(keeper.community_pool(&st).unwrap().is_zero());

    let text = metrics.render().unwrap();
    assert!(text.contains("amunchain_distr_validators_tracked"));
}
