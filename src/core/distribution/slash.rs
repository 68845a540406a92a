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

//! Slash event log.
//!
//! Every slash closes the validator's current period and appends one event anchored
//! to the closed period. Events are never merged: the reward calculator applies them
//! one at a time along the period timeline.

use crate::core::distribution::error::{DistrError, Result};
use crate::core::distribution::keys;
use crate::core::distribution::records::{save, ValidatorSlashEvent, MAX_RECORD_BYTES};
use crate::core::distribution::Keeper;
use crate::core::economics::staking::ValidatorInfo;
use crate::core::state::store::{KvIter, KvRead, KvWrite};
use crate::core::types::{decode_canonical_limited, Address, CodecError};
use rust_decimal::Decimal;
use tracing::info;

/// Lazy iterator over a validator's slash events with period in a closed range.
///
/// Yields `Result` items; a decode failure ends the walk with that error. The key of the
/// last yielded event is kept so a new walk can resume right after it.
pub struct SlashEvents<'a> {
    inner: KvIter<'a>,
    end_period: u64,
    last_key: Option<Vec<u8>>,
    done: bool,
}

impl<'a> SlashEvents<'a> {
    /// Key of the most recently yielded event.
    pub fn last_key(&self) -> Option<&[u8]> {
        self.last_key.as_deref()
    }
}

impl<'a> Iterator for SlashEvents<'a> {
    type Item = Result<ValidatorSlashEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (key, value) = match self.inner.next()? {
            Ok(kv) => kv,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        match keys::slash_event_position(&key) {
            Some((period, _)) if period > self.end_period => {
                self.done = true;
                return None;
            }
            Some(_) => {}
            None => {
                self.done = true;
                return Some(Err(DistrError::Codec(CodecError::Deserialize)));
            }
        }
        let decoded = decode_canonical_limited::<ValidatorSlashEvent>(&value, MAX_RECORD_BYTES);
        self.last_key = Some(key);
        match decoded {
            Ok(ev) => Some(Ok(ev)),
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

impl Keeper {
    /// Close the current period and append a slash event anchored to it.
    ///
    /// The closed period gains a reference held by the event. Returns that period.
    pub fn record_slash<S: KvWrite + ?Sized>(
        &self,
        store: &mut S,
        height: i64,
        val: &ValidatorInfo,
        fraction: Decimal,
    ) -> Result<u64> {
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(DistrError::InvalidArgument(format!(
                "slash fraction must be within [0, 1], got {fraction}"
            )));
        }
        let op = &val.operator;
        let period = self.increment_validator_period(store, val)?;
        self.increment_reference_count(store, op, period)?;
        let event = ValidatorSlashEvent {
            validator_period: period,
            height,
            fraction,
        };
        save(store, &keys::slash_event_key(op, period, height), &event)?;

        self.observe(|m| m.slash_events_total.inc());
        info!(validator = %op, period, height, %fraction, "slash event recorded");
        Ok(period)
    }

    /// Slash events with `from_period <= validator_period <= to_period`, ordered by period then height.
    pub fn slash_events<'a, S: KvRead + ?Sized>(
        &self,
        store: &'a S,
        val: &Address,
        from_period: u64,
        to_period: u64,
    ) -> SlashEvents<'a> {
        self.slash_events_resume(store, val, from_period, to_period, None)
    }

    /// Like [`Keeper::slash_events`], continuing strictly after `after_key` when given.
    pub fn slash_events_resume<'a, S: KvRead + ?Sized>(
        &self,
        store: &'a S,
        val: &Address,
        from_period: u64,
        to_period: u64,
        after_key: Option<&[u8]>,
    ) -> SlashEvents<'a> {
        let prefix = keys::slash_event_prefix(val);
        let mut start = keys::slash_event_period_start(val, from_period);
        if let Some(k) = after_key {
            // Smallest key strictly greater than `k`.
            let mut next = k.to_vec();
            next.push(0);
            if next > start {
                start = next;
            }
        }
        SlashEvents {
            inner: store.iter_prefix(&prefix, Some(start.as_slice())),
            end_period: to_period,
            last_key: None,
            done: from_period > to_period,
        }
    }
}
