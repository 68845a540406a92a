// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Store key layout.
//!
//! Addresses are length-prefixed so one address can never be a prefix of another.
//! Periods and heights are big-endian so byte order matches numeric order.

use crate::core::types::Address;

pub const FEE_POOL_KEY: &[u8] = &[0x00];
pub const EXTERNAL_POOL_ESCROW_KEY: &[u8] = &[0x01];
pub const OUTSTANDING_REWARDS_PREFIX: u8 = 0x02;
pub const WITHDRAW_ADDR_PREFIX: u8 = 0x03;
pub const DELEGATOR_STARTING_INFO_PREFIX: u8 = 0x04;
pub const HISTORICAL_REWARDS_PREFIX: u8 = 0x05;
pub const CURRENT_REWARDS_PREFIX: u8 = 0x06;
pub const ACCUMULATED_COMMISSION_PREFIX: u8 = 0x07;
pub const SLASH_EVENT_PREFIX: u8 = 0x08;
pub const PARAMS_KEY: &[u8] = &[0x09];

fn addr_key(prefix: u8, addr: &Address) -> Vec<u8> {
    let b = addr.as_bytes();
    let mut k = Vec::with_capacity(2 + b.len());
    k.push(prefix);
    k.push(addr_len(b));
    k.extend_from_slice(b);
    k
}

/// Entry points reject addresses over `MAX_ADDRESS_LEN`, so the length fits one byte.
fn addr_len(b: &[u8]) -> u8 {
    u8::try_from(b.len()).unwrap_or(u8::MAX)
}

/// Heights sort correctly as unsigned after flipping the sign bit.
fn height_bytes(height: i64) -> [u8; 8] {
    ((height as u64) ^ (1u64 << 63)).to_be_bytes()
}

fn height_from_bytes(b: [u8; 8]) -> i64 {
    (u64::from_be_bytes(b) ^ (1u64 << 63)) as i64
}

pub fn outstanding_rewards_key(val: &Address) -> Vec<u8> {
    addr_key(OUTSTANDING_REWARDS_PREFIX, val)
}

pub fn withdraw_addr_key(del: &Address) -> Vec<u8> {
    addr_key(WITHDRAW_ADDR_PREFIX, del)
}

pub fn delegator_starting_info_prefix(val: &Address) -> Vec<u8> {
    addr_key(DELEGATOR_STARTING_INFO_PREFIX, val)
}

pub fn delegator_starting_info_key(val: &Address, del: &Address) -> Vec<u8> {
    let mut k = delegator_starting_info_prefix(val);
    let b = del.as_bytes();
    k.push(addr_len(b));
    k.extend_from_slice(b);
    k
}

pub fn historical_rewards_prefix(val: &Address) -> Vec<u8> {
    addr_key(HISTORICAL_REWARDS_PREFIX, val)
}

pub fn historical_rewards_key(val: &Address, period: u64) -> Vec<u8> {
    let mut k = historical_rewards_prefix(val);
    k.extend_from_slice(&period.to_be_bytes());
    k
}

/// Period encoded in the last 8 bytes of a historical rewards key.
pub fn period_from_historical_key(key: &[u8]) -> Option<u64> {
    let tail: [u8; 8] = key.get(key.len().checked_sub(8)?..)?.try_into().ok()?;
    Some(u64::from_be_bytes(tail))
}

pub fn current_rewards_key(val: &Address) -> Vec<u8> {
    addr_key(CURRENT_REWARDS_PREFIX, val)
}

pub fn accumulated_commission_key(val: &Address) -> Vec<u8> {
    addr_key(ACCUMULATED_COMMISSION_PREFIX, val)
}

pub fn slash_event_prefix(val: &Address) -> Vec<u8> {
    addr_key(SLASH_EVENT_PREFIX, val)
}

/// First possible slash event key at or after `period`.
pub fn slash_event_period_start(val: &Address, period: u64) -> Vec<u8> {
    let mut k = slash_event_prefix(val);
    k.extend_from_slice(&period.to_be_bytes());
    k
}

pub fn slash_event_key(val: &Address, period: u64, height: i64) -> Vec<u8> {
    let mut k = slash_event_period_start(val, period);
    k.extend_from_slice(&height_bytes(height));
    k
}

/// `(period, height)` encoded in the last 16 bytes of a slash event key.
pub fn slash_event_position(key: &[u8]) -> Option<(u64, i64)> {
    let tail = key.get(key.len().checked_sub(16)?..)?;
    let period: [u8; 8] = tail[..8].try_into().ok()?;
    let height: [u8; 8] = tail[8..].try_into().ok()?;
    Some((u64::from_be_bytes(period), height_from_bytes(height)))
}
