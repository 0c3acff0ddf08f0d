// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TON Payments - multi-asset adapter for The Open Network
//!
//! Resolves indexer transactions into one canonical view, verifies payments
//! in Toncoin, jettons and NFTs, and builds, signs and broadcasts transfers.
//!
//! ## Modules
//!
//! - `assets` - Coin/Token/NFT/Contract adapters producing transfer intents
//! - `blockchain` - Addresses, units, transport, signing and broadcast
//! - `config` - Network configuration and logging setup
//! - `indexer` - Typed toncenter v3 queries
//! - `models` - Transaction records and transfer verification
//! - `provider` - Shared context handed to every component

pub mod assets;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod indexer;
pub mod models;
pub mod provider;

pub use config::{Explorer, NetworkConfig};
pub use error::{Result, TonError};
pub use provider::Provider;
