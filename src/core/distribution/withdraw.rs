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

//! Withdraw-address registry. Payouts go to the delegator unless redirected.

use crate::core::distribution::error::{DistrError, Result};
use crate::core::distribution::keys;
use crate::core::distribution::Keeper;
use crate::core::state::store::{KvRead, KvWrite};
use crate::core::types::Address;
use tracing::info;

impl Keeper {
    /// Redirect a delegator's future payouts. Setting the delegator itself clears the override.
    pub fn set_withdraw_address<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        delegator: &Address,
        withdraw: &Address,
    ) -> Result<()> {
        Self::check_address("delegator", delegator)?;
        Self::check_address("withdraw", withdraw)?;
        if !self.params(store)?.withdraw_addr_enabled {
            return Err(DistrError::SetWithdrawAddrDisabled);
        }
        let key = keys::withdraw_addr_key(delegator);
        if withdraw == delegator {
            store.delete(&key)?;
        } else {
            store.set(&key, withdraw.as_bytes().to_vec())?;
        }
        info!(delegator = %delegator, withdraw = %withdraw, "withdraw address set");
        Ok(())
    }

    /// Where a delegator's payouts go; the delegator itself unless overridden.
    pub fn withdraw_address<S: KvRead + ?Sized>(
        &self,
        store: &S,
        delegator: &Address,
    ) -> Result<Address> {
        Ok(store
            .get(&keys::withdraw_addr_key(delegator))?
            .map(Address::from_bytes)
            .unwrap_or_else(|| delegator.clone()))
    }
}
