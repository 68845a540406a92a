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

use crate::core::types::{ConfigError, LogConfig};
use tracing::Level;

fn parse_level(s: &str) -> Result<Level, ConfigError> {
    s.parse::<Level>()
        .map_err(|_| ConfigError::Invalid(format!("unknown log level `{s}`")))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(cfg: &LogConfig) -> Result<(), ConfigError> {
    let level = parse_level(&cfg.level)?;
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level);
    let _ = if cfg.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    Ok(())
}
