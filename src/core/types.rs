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

//! Deterministic core types, canonical encoding helpers and node configuration.

use crate::core::distribution::params::Params;
use bincode::Options;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Canonical serialization error.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialization")]
    Serialize,
    #[error("deserialization")]
    Deserialize,
    #[error("size limit exceeded")]
    TooLarge,
}

/// Canonical bincode options (deterministic).
fn bincode_opts() -> impl Options {
    // Fixint encoding provides a stable integer representation.
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode with deterministic rules. Requires deterministic container ordering (use BTreeMap/BTreeSet).
pub fn encode_canonical<T: Serialize>(v: &T) -> Result<Vec<u8>, CodecError> {
    bincode_opts()
        .serialize(v)
        .map_err(|_| CodecError::Serialize)
}

/// Decode with a hard size cap.
pub fn decode_canonical_limited<T: DeserializeOwned>(
    bytes: &[u8],
    max: usize,
) -> Result<T, CodecError> {
    if bytes.len() > max {
        return Err(CodecError::TooLarge);
    }
    // The deserializer limit stops oversized container lengths before allocation.
    bincode_opts()
        .with_limit(max as u64)
        .deserialize(bytes)
        .map_err(|_| CodecError::Deserialize)
}

/// Address decoding error.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("empty address")]
    Empty,
    #[error("invalid hex address")]
    InvalidHex,
    #[error("address of {0} bytes exceeds 255")]
    TooLong(usize),
}

/// Longest address accepted; store keys carry the length in one byte.
pub const MAX_ADDRESS_LEN: usize = 255;

/// Account or validator operator address (raw bytes, hex in text form).
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub Vec<u8>);

impl Address {
    /// Construct from raw bytes.
    pub fn from_bytes(b: impl Into<Vec<u8>>) -> Self {
        Self(b.into())
    }

    /// Parse a hex string. Empty and over-long input is rejected.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let addr = Self(hex::decode(s).map_err(|_| AddressError::InvalidHex)?);
        addr.validate()?;
        Ok(addr)
    }

    /// Check the address is non-empty and fits the store key encoding.
    pub fn validate(&self) -> Result<(), AddressError> {
        match self.0.len() {
            0 => Err(AddressError::Empty),
            n if n > MAX_ADDRESS_LEN => Err(AddressError::TooLong(n)),
            _ => Ok(()),
        }
    }

    /// Hex text form.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True when no bytes are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Largest decimal precision representable by the decimal backend.
pub const MAX_PRECISION: u32 = 28;

/// Node configuration root.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node settings.
    pub node: NodeSettings,
    /// Distribution settings.
    #[serde(default)]
    pub distribution: DistributionConfig,
    /// Parameters written at genesis when the state is empty.
    #[serde(default)]
    pub genesis: Params,
    /// Log settings.
    #[serde(default)]
    pub log: LogConfig,
}

impl NodeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: NodeConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Reject values that cannot be applied consistently across replicas.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.data_dir.is_empty() {
            return Err(ConfigError::Invalid("node.data_dir is empty".into()));
        }
        self.distribution.validate()?;
        self.genesis
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Node settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeSettings {
    /// Human-readable name.
    pub name: String,
    /// Data directory (sled db).
    pub data_dir: String,
}

/// Distribution protocol settings. Must be identical on every replica.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Decimal places kept by per-share ratios and truncated reward amounts.
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// When true the community pool is owned by an external module.
    #[serde(default)]
    pub external_community_pool: bool,
}

fn default_precision() -> u32 {
    18
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            external_community_pool: false,
        }
    }
}

impl DistributionConfig {
    /// Precision must fit the decimal backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::Invalid(format!(
                "distribution.precision {} exceeds maximum {}",
                self.precision, MAX_PRECISION
            )));
        }
        Ok(())
    }
}

/// Log settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogConfig {
    /// Max level: trace, debug, info, warn, error.
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of compact text.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
