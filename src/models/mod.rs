// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Transaction Models
//!
//! A [`Transaction`] joins two independently indexed records, the raw ledger
//! transaction and the indexer's semantic action, into one view. The typed
//! wrappers add per-asset accessors and `verify_transfer`:
//!
//! - [`CoinTransaction`]: Toncoin (`ton_transfer`)
//! - [`TokenTransaction`]: jettons (`jetton_transfer`)
//! - [`NftTransaction`]: NFTs (`nft_transfer`)
//! - [`ContractTransaction`]: any other contract interaction

pub mod coin;
pub mod contract;
pub mod nft;
pub mod token;
pub mod transaction;

pub use coin::CoinTransaction;
pub use contract::ContractTransaction;
pub use nft::NftTransaction;
pub use token::TokenTransaction;
pub use transaction::{Transaction, TransactionData, DEFAULT_WAIT_INTERVAL};

use serde::{Deserialize, Serialize};

use crate::blockchain::address::{same_rendering, Address};
use crate::blockchain::units::{to_base, Amount};
use crate::error::TonError;
use crate::provider::Provider;

/// Asset kind derived from the action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// No data is available for the transaction.
    General,
    Coin,
    Token,
    Nft,
    Contract,
}

impl TransactionType {
    /// Exact match on the action type tag.
    pub fn from_action_type(kind: &str) -> Self {
        match kind {
            "ton_transfer" => TransactionType::Coin,
            "jetton_transfer" => TransactionType::Token,
            "nft_transfer" => TransactionType::Nft,
            _ => TransactionType::Contract,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Which side of a transfer the caller is checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetDirection {
    /// The counterparty address must be the receiver.
    Incoming,
    /// The counterparty address must be the sender.
    Outgoing,
}

/// Exact comparison in atomic units at the asset's precision.
///
/// An expected value that cannot be represented at that precision never
/// matches.
pub(crate) fn amount_matches(actual: Amount, expected: &str) -> bool {
    to_base(expected, actual.decimals())
        .map(|atomic| atomic == actual.atomic())
        .unwrap_or(false)
}

/// Only a confirmed record is checked any further.
pub(crate) fn unsettled(status: TransactionStatus) -> Option<TransactionStatus> {
    match status {
        TransactionStatus::Confirmed => None,
        other => Some(other),
    }
}

/// Final step of every verification: compare the relevant party.
///
/// `party` is in wallet form; a parseable `expected` is brought into the same
/// form first, anything else is compared verbatim.
pub(crate) fn party_status(party: &str, expected: &str, testnet: bool) -> TransactionStatus {
    let expected = Address::parse(expected)
        .map(|a| a.to_string_wallet(testnet))
        .unwrap_or_else(|_| expected.to_string());
    if same_rendering(party, &expected) {
        TransactionStatus::Confirmed
    } else {
        TransactionStatus::Failed
    }
}

/// Wallet-form rendering of an action detail field.
pub(crate) fn wallet_detail(
    provider: &Provider,
    value: Option<&str>,
    field: &str,
) -> Result<String, TonError> {
    provider.wallet_form(require_detail(value, field)?)
}

/// Contract-form rendering of an action detail field.
pub(crate) fn contract_detail(
    provider: &Provider,
    value: Option<&str>,
    field: &str,
) -> Result<String, TonError> {
    provider.contract_form(require_detail(value, field)?)
}

fn require_detail<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, TonError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TonError::InvalidResponse(format!("action has no `{field}`")))
}
