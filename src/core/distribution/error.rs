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
#![allow(missing_docs)]

//! Distribution errors.

use crate::core::economics::coins::CoinsError;
use crate::core::state::persistent_state::StateError;
use crate::core::types::{Address, AddressError, CodecError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Error category, used by callers to map failures onto their own status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input.
    InvalidArgument,
    /// Referenced validator, delegation or record does not exist.
    NotFound,
    /// Operation not meaningful in the current state, or state is inconsistent.
    Conflict,
    /// Persistence or encoding failure.
    Storage,
}

/// Distribution errors.
#[derive(Debug, Error)]
pub enum DistrError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("validator {0} does not exist")]
    NoValidatorExists(Address),
    #[error("delegation of {delegator} to validator {validator} does not exist")]
    NoDelegationExists {
        delegator: Address,
        validator: Address,
    },
    #[error("no distribution info for validator {0}")]
    NoValidatorDistInfo(Address),
    #[error("no delegation distribution info for {delegator} on validator {validator}")]
    EmptyDelegationDistInfo {
        delegator: Address,
        validator: Address,
    },
    #[error("historical rewards missing for validator {validator} at period {period}")]
    MissingHistoricalRewards { validator: Address, period: u64 },
    #[error("reference count underflow for validator {validator} at period {period}")]
    ReferenceCountUnderflow { validator: Address, period: u64 },
    #[error("reference count overflow for validator {validator} at period {period}")]
    ReferenceCountOverflow { validator: Address, period: u64 },
    #[error("negative reward ratio delta for validator {validator} between periods {start} and {end}")]
    NegativeRewardRatio {
        validator: Address,
        start: u64,
        end: u64,
    },
    #[error("calculated stake {stake} for {delegator} exceeds current stake {current} on validator {validator}")]
    StakeExceedsCurrent {
        delegator: Address,
        validator: Address,
        stake: Decimal,
        current: Decimal,
    },
    #[error("no validator commission to withdraw for {0}")]
    NoValidatorCommission(Address),
    #[error("withdraw address changes are disabled")]
    SetWithdrawAddrDisabled,
    #[error("external community pool is enabled; use the external pool instead")]
    ExternalCommunityPool,
    #[error("external community pool is disabled; no escrow to drain")]
    InternalCommunityPool,
    #[error("community pool does not have sufficient coins to distribute")]
    InsufficientCommunityPool,
    #[error("coins: {0}")]
    Coins(#[from] CoinsError),
    #[error("storage: {0}")]
    Storage(#[from] StateError),
    #[error("codec: {0}")]
    Codec(#[from] CodecError),
}

impl DistrError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        use DistrError::*;
        match self {
            InvalidArgument(_) => ErrorKind::InvalidArgument,
            NoValidatorExists(_)
            | NoDelegationExists { .. }
            | NoValidatorDistInfo(_)
            | EmptyDelegationDistInfo { .. } => ErrorKind::NotFound,
            MissingHistoricalRewards { .. }
            | ReferenceCountUnderflow { .. }
            | ReferenceCountOverflow { .. }
            | NegativeRewardRatio { .. }
            | StakeExceedsCurrent { .. }
            | NoValidatorCommission(_)
            | SetWithdrawAddrDisabled
            | ExternalCommunityPool
            | InternalCommunityPool
            | InsufficientCommunityPool
            | Coins(_) => ErrorKind::Conflict,
            Storage(_) | Codec(_) => ErrorKind::Storage,
        }
    }

    /// Wrap an address decoding failure with the name of the offending field.
    pub fn bad_address(field: &str, e: AddressError) -> Self {
        match e {
            AddressError::Empty => DistrError::InvalidArgument(format!("empty {field} address")),
            AddressError::InvalidHex => {
                DistrError::InvalidArgument(format!("invalid {field} address"))
            }
            AddressError::TooLong(n) => {
                DistrError::InvalidArgument(format!("{field} address of {n} bytes is too long"))
            }
        }
    }
}

/// Distribution result.
pub type Result<T> = std::result::Result<T, DistrError>;
