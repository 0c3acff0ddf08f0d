// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared network context.
//!
//! A [`Provider`] pairs one [`NetworkConfig`] with the indexer it talks to.
//! It is constructed explicitly and passed to every adapter, transaction
//! model and signer as an `Arc<Provider>`; there is no process-wide instance.

use std::sync::Arc;

use crate::blockchain::address::Address;
use crate::blockchain::client::{RpcGateway, ToncenterClient};
use crate::blockchain::types::{AccountStatus, WalletVersion};
use crate::config::NetworkConfig;
use crate::error::TonError;
use crate::indexer::Indexer;

pub struct Provider {
    config: NetworkConfig,
    indexer: Indexer,
}

impl Provider {
    /// Build a provider backed by the toncenter HTTP client.
    pub fn new(config: NetworkConfig) -> Result<Self, TonError> {
        let client =
            ToncenterClient::new(&config.api_base_url, &config.api_key, config.request_timeout)?;
        tracing::debug!(
            base_url = %client.base_url(),
            testnet = config.testnet,
            "TON provider initialized"
        );
        Ok(Self::with_gateway(config, Arc::new(client)))
    }

    /// Build a provider over any gateway implementation.
    pub fn with_gateway(config: NetworkConfig, gateway: Arc<dyn RpcGateway>) -> Self {
        Self {
            config,
            indexer: Indexer::new(gateway),
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn indexer(&self) -> &Indexer {
        &self.indexer
    }

    pub fn is_testnet(&self) -> bool {
        self.config.testnet
    }

    pub fn explorer_url(&self, transaction_id: &str) -> String {
        self.config.explorer_url(transaction_id)
    }

    /// Wallet-form (non-bounceable) rendering of `raw`.
    pub fn wallet_form(&self, raw: &str) -> Result<String, TonError> {
        Ok(Address::parse(raw)?.to_string_wallet(self.is_testnet()))
    }

    /// Contract-form (bounceable) rendering of `raw`.
    pub fn contract_form(&self, raw: &str) -> Result<String, TonError> {
        Ok(Address::parse(raw)?.to_string_contract(self.is_testnet()))
    }

    /// `true` when the indexer answers with a masterchain head.
    pub async fn check_rpc_connection(&self) -> bool {
        match self.indexer.masterchain_info().await {
            Ok(info) => info.last.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, "RPC connection check failed");
                false
            }
        }
    }

    /// Detect the wallet contract revision deployed at `address`.
    pub async fn find_wallet_version(&self, address: &str) -> Result<WalletVersion, TonError> {
        let info = self.indexer.wallet_information(address).await?;
        if info.status == AccountStatus::Uninit {
            return Err(TonError::InvalidResponse(format!(
                "wallet {address} is not initialized"
            )));
        }

        let wallet_type = info.wallet_type.unwrap_or_default();
        WalletVersion::from_wallet_type(&wallet_type).ok_or_else(|| {
            TonError::InvalidResponse(format!("unknown wallet version `{wallet_type}`"))
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::blockchain::client::RpcError;
    use crate::blockchain::mock::MockGateway;
    use serde_json::json;

    #[tokio::test]
    async fn rpc_connection_requires_a_last_block() {
        let mock = Arc::new(MockGateway::new());
        mock.on("masterchainInfo", json!({"last": {"workchain": -1, "shard": "8000000000000000", "seqno": 1}}));
        assert!(provider(&mock).check_rpc_connection().await);

        let mock = Arc::new(MockGateway::new());
        mock.fail("masterchainInfo", RpcError::Http("connection refused".to_string()));
        assert!(!provider(&mock).check_rpc_connection().await);
    }

    #[tokio::test]
    async fn wallet_version_is_detected() {
        let mock = Arc::new(MockGateway::new());
        mock.on(
            "walletInformation",
            json!({"status": "active", "wallet_type": "wallet v4 r2", "seqno": 7, "balance": "10"}),
        );
        let version = provider(&mock).find_wallet_version(&raw(1)).await.unwrap();
        assert_eq!(version, WalletVersion::V4R2);
    }

    #[tokio::test]
    async fn uninitialized_and_unknown_wallets_are_errors() {
        let mock = Arc::new(MockGateway::new());
        mock.on("walletInformation", json!({"status": "uninit", "balance": "0"}));
        mock.on("walletInformation", json!({"status": "active", "wallet_type": "highload v3"}));
        let provider = provider(&mock);

        assert!(matches!(
            provider.find_wallet_version(&raw(1)).await,
            Err(TonError::InvalidResponse(_))
        ));
        assert!(matches!(
            provider.find_wallet_version(&raw(1)).await,
            Err(TonError::InvalidResponse(_))
        ));
    }

    #[test]
    fn renderings_follow_the_testnet_flag() {
        let mock = Arc::new(MockGateway::new());
        let provider = provider(&mock);
        assert_eq!(provider.wallet_form(&raw(2)).unwrap(), wallet(2));
        assert_eq!(provider.contract_form(&raw(2)).unwrap(), contract(2));
        assert!(provider.wallet_form("").is_err());
    }
}
