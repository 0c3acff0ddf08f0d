// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Asset Adapters
//!
//! Uniform read/transfer surface over Toncoin, jettons and NFT collections.
//! Adapters read chain state through the indexer and produce unsigned
//! [`TransferIntent`](crate::blockchain::types::TransferIntent)s; signing and
//! broadcasting happen in [`crate::blockchain::transactions::TransferSigner`].
//!
//! Transfer validation runs before the intent is built and fails fast with
//! `InvalidAmount`, `InsufficientBalance`, `UnauthorizedAddress` or
//! `WalletNotActive`.

pub mod coin;
pub mod contract;
pub mod nft;
pub mod token;

pub use coin::Coin;
pub use contract::{Contract, ContractMethods};
pub use nft::{CollectionMetadata, Nft};
pub use token::Token;

use async_trait::async_trait;

use crate::blockchain::units::Amount;
use crate::error::TonError;

/// Toncoin attached to jetton and NFT transfers to pay for execution (0.05 TON).
pub const CONTRACT_TRANSFER_VALUE: u128 = 50_000_000;

/// Forward amount passed on to the recipient with jetton and NFT transfers.
pub const FORWARD_AMOUNT: u128 = 1;

/// Capabilities every asset exposes.
#[async_trait]
pub trait Asset: Send + Sync {
    async fn name(&self) -> Result<String, TonError>;

    async fn symbol(&self) -> Result<String, TonError>;

    async fn decimals(&self) -> Result<u8, TonError>;

    async fn balance(&self, owner: &str) -> Result<Amount, TonError>;
}
