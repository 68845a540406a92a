// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Module parameters and genesis initialization.

use crate::core::distribution::error::{DistrError, Result};
use crate::core::distribution::keys;
use crate::core::distribution::records::{load, save, FeePool};
use crate::core::distribution::Keeper;
use crate::core::state::store::{KvRead, KvWrite};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Distribution parameters, stored in state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Share of allocated fees routed to the community pool, in `[0, 1]`.
    pub community_tax: Decimal,
    /// Whether delegators may redirect their rewards to another account.
    pub withdraw_addr_enabled: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            community_tax: Decimal::new(2, 2),
            withdraw_addr_enabled: true,
        }
    }
}

impl Params {
    /// Check parameter bounds.
    pub fn validate(&self) -> Result<()> {
        if self.community_tax.is_sign_negative() || self.community_tax > Decimal::ONE {
            return Err(DistrError::InvalidArgument(format!(
                "community tax must be within [0, 1], got {}",
                self.community_tax
            )));
        }
        Ok(())
    }
}

impl Keeper {
    /// Current parameters. Defaults are returned before genesis.
    pub fn params<S: KvRead + ?Sized>(&self, store: &S) -> Result<Params> {
        Ok(load(store, keys::PARAMS_KEY)?.unwrap_or_default())
    }

    /// Replace parameters after validation.
    pub fn set_params<S: KvWrite + ?Sized>(&self, store: &mut S, params: &Params) -> Result<()> {
        params.validate()?;
        save(store, keys::PARAMS_KEY, params)
    }

    /// True once genesis has written parameters.
    pub fn is_initialized<S: KvRead + ?Sized>(&self, store: &S) -> Result<bool> {
        Ok(store.has(keys::PARAMS_KEY)?)
    }

    /// Write parameters and an empty fee pool.
    pub fn init_genesis<S: KvWrite + ?Sized>(&self, store: &mut S, params: &Params) -> Result<()> {
        self.set_params(store, params)?;
        save(store, keys::FEE_POOL_KEY, &FeePool::default())?;
        info!(
            community_tax = %params.community_tax,
            withdraw_addr_enabled = params.withdraw_addr_enabled,
            "distribution genesis initialized"
        );
        Ok(())
    }
}
