// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy shared by adapters, transaction models and the signer.
//!
//! Validation errors (`InvalidAmount`, `InsufficientBalance`,
//! `UnauthorizedAddress`, `WalletNotActive`) are raised while a transfer is
//! being constructed. Transport failures while loading a transaction record
//! always surface as [`TonError::RpcRequest`].

use crate::blockchain::client::RpcError;

#[derive(Debug, thiserror::Error)]
pub enum TonError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Unauthorized address: {0}")]
    UnauthorizedAddress(String),

    #[error("Jetton wallet is not active: {0}")]
    WalletNotActive(String),

    #[error("RPC request error: {0}")]
    RpcRequest(#[source] RpcError),

    #[error("Transaction not found after {attempts} attempts")]
    TransactionNotFound { attempts: u32 },

    #[error("Method not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid indexer response: {0}")]
    InvalidResponse(String),

    #[error("Transport error: {0}")]
    Transport(#[from] RpcError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Cell encoding error: {0}")]
    CellEncoding(String),

    #[error("Transfer has not been signed")]
    NotSigned,

    #[error("Operation cancelled")]
    Cancelled,
}

impl TonError {
    /// Re-tag a transport failure as a record-fetch failure.
    pub(crate) fn into_rpc_request(self) -> Self {
        match self {
            TonError::Transport(e) => TonError::RpcRequest(e),
            other => other,
        }
    }
}

pub type Result<T, E = TonError> = std::result::Result<T, E>;
