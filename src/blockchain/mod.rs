// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TON chain plumbing.
//!
//! This module provides:
//! - Address parsing and wallet/contract renderings
//! - Atomic-unit conversions
//! - The indexer transport (`RpcGateway`) and its toncenter client
//! - Cells, bags of cells and the wallet v4r2 contract
//! - Key derivation, transfer signing and broadcast resolution

pub mod address;
pub mod cell;
pub mod client;
#[cfg(test)]
pub mod mock;
pub mod signing;
pub mod transactions;
pub mod types;
pub mod units;
pub mod wallet;

pub use address::Address;
pub use client::{RpcError, RpcGateway, ToncenterClient};
pub use signing::{KeyPair, SignedMessage, WalletContract, WalletFactory};
pub use transactions::{HashResolver, TransferSigner};
pub use types::{SendMode, TransferIntent, TransferPayload, WalletVersion};
pub use units::{from_base, to_base, Amount, TON_DECIMALS};
pub use wallet::{TonWalletFactory, WalletV4R2};
