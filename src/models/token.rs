// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Jetton transfers (`jetton_transfer` actions).

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tokio::sync::OnceCell;

use super::{
    amount_matches, contract_detail, party_status, unsettled, wallet_detail, AssetDirection,
    ContractTransaction, Transaction, TransactionStatus,
};
use crate::assets::{Asset, Token};
use crate::blockchain::units::{parse_atomic, Amount};
use crate::error::TonError;
use crate::provider::Provider;

pub struct TokenTransaction {
    inner: ContractTransaction,
    decimals: OnceCell<u8>,
}

impl TokenTransaction {
    pub fn new(id: impl Into<String>, provider: Arc<Provider>) -> Self {
        Self::from(Transaction::new(id, provider))
    }

    /// Jetton master, in contract form.
    pub async fn address(&self) -> Result<String, TonError> {
        self.inner.address().await
    }

    pub async fn receiver(&self) -> Result<String, TonError> {
        let details = self.details().await?;
        wallet_detail(self.provider(), details.receiver.as_deref(), "receiver")
    }

    pub async fn sender(&self) -> Result<String, TonError> {
        let details = self.details().await?;
        wallet_detail(self.provider(), details.sender.as_deref(), "sender")
    }

    pub async fn receiver_jetton_address(&self) -> Result<String, TonError> {
        let details = self.details().await?;
        contract_detail(
            self.provider(),
            details.receiver_jetton_wallet.as_deref(),
            "receiver_jetton_wallet",
        )
    }

    pub async fn sender_jetton_address(&self) -> Result<String, TonError> {
        let details = self.details().await?;
        contract_detail(
            self.provider(),
            details.sender_jetton_wallet.as_deref(),
            "sender_jetton_wallet",
        )
    }

    /// Transferred jetton amount at the master's declared decimals.
    pub async fn amount(&self) -> Result<Amount, TonError> {
        let details = self.details().await?;
        let atomic = match details.amount.as_deref() {
            Some(raw) => parse_atomic(raw)?,
            None => 0,
        };
        let decimals = self
            .decimals
            .get_or_try_init(|| async {
                let master = details.asset.as_deref().ok_or_else(|| {
                    TonError::InvalidResponse("action has no `asset`".to_string())
                })?;
                Token::new(master, self.provider().clone()).decimals().await
            })
            .await?;
        Ok(Amount::new(atomic, *decimals))
    }

    /// Check the transfer against what the caller expects.
    ///
    /// `expected` is a decimal jetton amount and must match exactly at the
    /// jetton's precision.
    pub async fn verify_transfer(
        &self,
        direction: AssetDirection,
        address: &str,
        expected: &str,
    ) -> Result<TransactionStatus, TonError> {
        if let Some(status) = unsettled(self.status().await?) {
            return Ok(status);
        }

        if !amount_matches(self.amount().await?, expected) {
            return Ok(TransactionStatus::Failed);
        }

        let party = match direction {
            AssetDirection::Incoming => self.receiver().await?,
            AssetDirection::Outgoing => self.sender().await?,
        };
        Ok(party_status(&party, address, self.provider().is_testnet()))
    }
}

impl From<Transaction> for TokenTransaction {
    fn from(inner: Transaction) -> Self {
        Self {
            inner: ContractTransaction::from(inner),
            decimals: OnceCell::new(),
        }
    }
}

impl Deref for TokenTransaction {
    type Target = ContractTransaction;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for TokenTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
