// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TON address parsing and rendering.
//!
//! An address is a workchain id plus a 32-byte account hash. It has a raw
//! form (`0:<64 hex>`) and a user-friendly form: 36 bytes
//! (`tag | workchain | hash | crc16`) encoded as URL-safe base64. The tag
//! encodes two flags:
//!
//! - bounceable (`0x11`) or non-bounceable (`0x51`)
//! - testnet-only (`| 0x80`)
//!
//! Plain accounts are displayed in wallet form (non-bounceable) and
//! contracts in contract form (bounceable).

use std::fmt;
use std::str::FromStr;

use base64ct::{Base64, Base64Url, Encoding};

use crate::error::TonError;

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TEST_ONLY: u8 = 0x80;

const FRIENDLY_LEN: usize = 36;

/// Canonical account or contract identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    workchain: i32,
    hash: [u8; 32],
}

impl Address {
    pub fn new(workchain: i32, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    /// Parse either the raw or the user-friendly form.
    pub fn parse(raw: &str) -> Result<Self, TonError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TonError::InvalidAddress("empty address".to_string()));
        }
        if raw.contains(':') {
            Self::parse_raw(raw)
        } else {
            Self::parse_friendly(raw)
        }
    }

    fn parse_raw(raw: &str) -> Result<Self, TonError> {
        let (wc, hex_part) = raw
            .split_once(':')
            .ok_or_else(|| TonError::InvalidAddress(raw.to_string()))?;

        let workchain: i32 = wc
            .parse()
            .map_err(|_| TonError::InvalidAddress(format!("bad workchain in {raw}")))?;

        let bytes = hex::decode(hex_part)
            .map_err(|e| TonError::InvalidAddress(format!("{raw}: {e}")))?;
        let hash: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            TonError::InvalidAddress(format!("expected 32 hash bytes, got {}", v.len()))
        })?;

        Ok(Self { workchain, hash })
    }

    fn parse_friendly(raw: &str) -> Result<Self, TonError> {
        let decoded = if raw.contains('+') || raw.contains('/') {
            Base64::decode_vec(raw)
        } else {
            Base64Url::decode_vec(raw)
        }
        .map_err(|e| TonError::InvalidAddress(format!("{raw}: {e}")))?;

        if decoded.len() != FRIENDLY_LEN {
            return Err(TonError::InvalidAddress(format!(
                "expected {FRIENDLY_LEN} bytes, got {}",
                decoded.len()
            )));
        }

        let expected = crc16(&decoded[..34]);
        let actual = u16::from_be_bytes([decoded[34], decoded[35]]);
        if expected != actual {
            return Err(TonError::InvalidAddress(format!("checksum mismatch in {raw}")));
        }

        let tag = decoded[0] & !TAG_TEST_ONLY;
        if tag != TAG_BOUNCEABLE && tag != TAG_NON_BOUNCEABLE {
            return Err(TonError::InvalidAddress(format!("unknown tag {:#04x}", decoded[0])));
        }

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&decoded[2..34]);

        Ok(Self {
            workchain: decoded[1] as i8 as i32,
            hash,
        })
    }

    pub fn workchain(&self) -> i32 {
        self.workchain
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Raw `workchain:hex` form.
    pub fn to_raw_string(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    /// User-friendly URL-safe rendering.
    pub fn render(&self, bounceable: bool, testnet: bool) -> String {
        let mut bytes = [0u8; FRIENDLY_LEN];
        bytes[0] = if bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };
        if testnet {
            bytes[0] |= TAG_TEST_ONLY;
        }
        bytes[1] = self.workchain as i8 as u8;
        bytes[2..34].copy_from_slice(&self.hash);
        let crc = crc16(&bytes[..34]);
        bytes[34..].copy_from_slice(&crc.to_be_bytes());

        Base64Url::encode_string(&bytes)
    }

    /// Non-bounceable rendering used for plain accounts.
    pub fn to_string_wallet(&self, testnet: bool) -> String {
        self.render(false, testnet)
    }

    /// Bounceable rendering used for contracts, collections and items.
    pub fn to_string_contract(&self, testnet: bool) -> String {
        self.render(true, testnet)
    }
}

impl FromStr for Address {
    type Err = TonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_raw_string())
    }
}

/// Case-insensitive comparison of two rendered addresses.
pub fn same_rendering(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// CRC-16/XMODEM over the address prefix.
fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for byte in data {
        crc ^= (*byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}
