// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversions between atomic units and decimal amounts.
//!
//! Amounts never pass through floating point on the way in or out: decimal
//! strings are split into whole and fractional digits and scaled with
//! checked integer arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TonError;

/// Toncoin has 9 decimals (1 TON = 10^9 nanotons).
pub const TON_DECIMALS: u8 = 9;

/// Largest supported precision (10^38 still fits in a `u128`).
pub const MAX_DECIMALS: u8 = 38;

/// An atomic-unit value together with its decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    atomic: u128,
    decimals: u8,
}

impl Amount {
    pub fn new(atomic: u128, decimals: u8) -> Self {
        Self { atomic, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self::new(0, decimals)
    }

    /// Parse a decimal string at the given precision.
    pub fn from_decimal(value: &str, decimals: u8) -> Result<Self, TonError> {
        Ok(Self::new(to_base(value, decimals)?, decimals))
    }

    /// Amount of nanotons expressed in TON.
    pub fn nano(atomic: u128) -> Self {
        Self::new(atomic, TON_DECIMALS)
    }

    pub fn atomic(&self) -> u128 {
        self.atomic
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.atomic == 0
    }

    /// Approximate value for display only.
    pub fn to_f64(&self) -> f64 {
        self.atomic as f64 / 10f64.powi(self.decimals as i32)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&from_base(self.atomic, self.decimals))
    }
}

/// Convert a decimal string into atomic units.
///
/// Rejects negative values, malformed input and values with more fractional
/// digits than `decimals`.
pub fn to_base(value: &str, decimals: u8) -> Result<u128, TonError> {
    let value = value.trim();
    if value.starts_with('-') {
        return Err(TonError::InvalidAmount(format!("negative amount: {value}")));
    }
    if decimals > MAX_DECIMALS {
        return Err(TonError::InvalidAmount(format!(
            "unsupported precision: {decimals}"
        )));
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(TonError::InvalidAmount(format!("malformed amount: {value:?}")));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(TonError::InvalidAmount(format!("malformed amount: {value:?}")));
    }
    if fraction.len() > decimals as usize {
        return Err(TonError::InvalidAmount(format!(
            "too many decimal places in {value} (max {decimals})"
        )));
    }

    let overflow = || TonError::InvalidAmount(format!("amount overflow: {value}"));

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let padded = format!("{:0<width$}", fraction, width = decimals as usize);
    let fraction: u128 = if padded.is_empty() {
        0
    } else {
        padded.parse().map_err(|_| overflow())?
    };

    whole
        .checked_mul(10u128.pow(decimals as u32))
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(overflow)
}

/// Render atomic units as a canonical decimal string (no trailing zeros).
///
/// Works on the digit string, so any precision renders exactly.
pub fn from_base(atomic: u128, decimals: u8) -> String {
    let digits = atomic.to_string();
    if decimals == 0 {
        return digits;
    }

    let scale = decimals as usize;
    let padded = format!("{digits:0>width$}", width = scale + 1);
    let (whole, fraction) = padded.split_at(padded.len() - scale);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Parse an indexer-provided integer string (e.g. `"2830538"`).
pub fn parse_atomic(raw: &str) -> Result<u128, TonError> {
    raw.trim()
        .parse()
        .map_err(|_| TonError::InvalidResponse(format!("not an integer amount: {raw:?}")))
}
