// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Jetton (fungible token) adapter.
//!
//! Balances live in per-owner jetton wallets derived from the master
//! contract; transfers are sent to the sender's jetton wallet, which
//! forwards the tokens to the receiver's wallet.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;

use super::contract::{Contract, ContractMethods, MethodCache};
use super::{Asset, CONTRACT_TRANSFER_VALUE, FORWARD_AMOUNT};
use crate::blockchain::address::Address;
use crate::blockchain::types::{
    AccountStatus, JettonContent, JettonMaster, SendMode, TransferIntent, TransferPayload,
};
use crate::blockchain::units::{to_base, Amount, MAX_DECIMALS};
use crate::error::TonError;
use crate::provider::Provider;

pub struct Token {
    contract: Contract,
    master: OnceCell<JettonMaster>,
}

impl Token {
    /// Adapter for the jetton master at `address`.
    pub fn new(address: impl Into<String>, provider: Arc<Provider>) -> Self {
        Self {
            contract: Contract::new(address, provider),
            master: OnceCell::new(),
        }
    }

    fn provider(&self) -> &Arc<Provider> {
        self.contract.provider()
    }

    /// Master record, fetched once.
    pub async fn jetton_master(&self) -> Result<&JettonMaster, TonError> {
        self.master
            .get_or_try_init(|| async {
                self.provider()
                    .indexer()
                    .jetton_master(self.address())
                    .await?
                    .ok_or_else(|| {
                        TonError::InvalidResponse(format!(
                            "jetton master {} not found",
                            self.address()
                        ))
                    })
            })
            .await
    }

    pub async fn metadata(&self) -> Result<&JettonContent, TonError> {
        Ok(&self.jetton_master().await?.jetton_content)
    }

    pub async fn total_supply(&self) -> Result<Amount, TonError> {
        let decimals = self.decimals().await?;
        Ok(Amount::new(self.jetton_master().await?.total_supply, decimals))
    }

    /// Owner's jetton wallet, if the indexer knows of one.
    pub async fn jetton_wallet_address(&self, owner: &str) -> Result<Option<Address>, TonError> {
        let wallet = self
            .provider()
            .indexer()
            .jetton_wallet(owner, self.address())
            .await?;
        wallet.map(|w| Address::parse(&w.address)).transpose()
    }

    /// Decimal amount to atomic jetton units.
    pub async fn format_amount(&self, amount: &str) -> Result<u128, TonError> {
        to_base(amount, self.decimals().await?)
    }

    pub async fn allowance(&self, _owner: &str, _spender: &str) -> Result<Amount, TonError> {
        Err(TonError::NotImplemented("allowance"))
    }

    /// Build a jetton transfer routed through the sender's jetton wallet.
    pub async fn transfer(
        &self,
        sender: &str,
        receiver: &str,
        amount: &str,
        memo: Option<&str>,
    ) -> Result<TransferIntent, TonError> {
        if amount.trim().starts_with('-') {
            return Err(TonError::InvalidAmount(format!("negative amount: {amount}")));
        }
        let sender_address = Address::parse(sender)?;
        let receiver_address = Address::parse(receiver)?;

        let jetton_amount = self.format_amount(amount).await?;
        let balance = self.balance(sender).await?;
        if jetton_amount > balance.atomic() {
            tracing::debug!(sender, amount, balance = %balance, "insufficient jetton balance");
            return Err(TonError::InsufficientBalance);
        }

        let jetton_wallet = self
            .jetton_wallet_address(sender)
            .await?
            .ok_or_else(|| TonError::WalletNotActive(sender.to_string()))?;

        let state = self
            .provider()
            .indexer()
            .account_state(&jetton_wallet.to_raw_string())
            .await?;
        if state.map(|s| s.status) != Some(AccountStatus::Active) {
            return Err(TonError::WalletNotActive(
                jetton_wallet.to_string_contract(self.provider().is_testnet()),
            ));
        }

        Ok(TransferIntent::new(
            jetton_wallet,
            CONTRACT_TRANSFER_VALUE,
            true,
            SendMode::PAY_GAS_SEPARATELY,
            TransferPayload::JettonTransfer {
                query_id: 0,
                amount: jetton_amount,
                destination: receiver_address,
                response_destination: sender_address,
                forward_amount: FORWARD_AMOUNT,
                forward_comment: memo.map(str::to_string),
            },
        ))
    }

    pub async fn transfer_from(
        &self,
        _spender: &str,
        _owner: &str,
        _receiver: &str,
        _amount: &str,
    ) -> Result<TransferIntent, TonError> {
        Err(TonError::NotImplemented("transfer_from"))
    }

    pub async fn approve(
        &self,
        _owner: &str,
        _spender: &str,
        _amount: &str,
    ) -> Result<TransferIntent, TonError> {
        Err(TonError::NotImplemented("approve"))
    }
}

#[async_trait]
impl ContractMethods for Token {
    fn address(&self) -> &str {
        self.contract.address()
    }

    fn method_cache(&self) -> &MethodCache {
        self.contract.method_cache()
    }
}

#[async_trait]
impl Asset for Token {
    async fn name(&self) -> Result<String, TonError> {
        self.metadata()
            .await?
            .name
            .clone()
            .ok_or_else(|| TonError::InvalidResponse("jetton has no name".to_string()))
    }

    async fn symbol(&self) -> Result<String, TonError> {
        self.metadata()
            .await?
            .symbol
            .clone()
            .ok_or_else(|| TonError::InvalidResponse("jetton has no symbol".to_string()))
    }

    async fn decimals(&self) -> Result<u8, TonError> {
        let raw = self.metadata().await?.decimals.as_ref();
        let decimals = match raw {
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
            _ => None,
        };
        match decimals {
            Some(decimals) if decimals <= MAX_DECIMALS => Ok(decimals),
            Some(decimals) => Err(TonError::InvalidResponse(format!(
                "jetton {} declares {decimals} decimals (max {MAX_DECIMALS})",
                self.address()
            ))),
            None => Err(TonError::InvalidResponse(format!(
                "jetton {} has no usable decimals",
                self.address()
            ))),
        }
    }

    async fn balance(&self, owner: &str) -> Result<Amount, TonError> {
        let decimals = self.decimals().await?;
        let wallet = self
            .provider()
            .indexer()
            .jetton_wallet(owner, self.address())
            .await?;
        Ok(Amount::new(wallet.map(|w| w.balance).unwrap_or(0), decimals))
    }
}
