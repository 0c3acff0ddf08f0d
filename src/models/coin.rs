// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Toncoin transfers (`ton_transfer` actions).

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::{
    amount_matches, party_status, unsettled, wallet_detail, AssetDirection, Transaction,
    TransactionStatus,
};
use crate::blockchain::units::{parse_atomic, Amount};
use crate::error::TonError;
use crate::provider::Provider;

pub struct CoinTransaction {
    inner: Transaction,
}

impl CoinTransaction {
    pub fn new(id: impl Into<String>, provider: Arc<Provider>) -> Self {
        Self {
            inner: Transaction::new(id, provider),
        }
    }

    pub async fn receiver(&self) -> Result<String, TonError> {
        let details = self.details().await?;
        wallet_detail(self.provider(), details.destination.as_deref(), "destination")
    }

    pub async fn sender(&self) -> Result<String, TonError> {
        let details = self.details().await?;
        wallet_detail(self.provider(), details.source.as_deref(), "source")
    }

    /// Transferred value; zero when no data is available.
    pub async fn amount(&self) -> Result<Amount, TonError> {
        let value = match self.details().await?.value {
            Some(raw) => parse_atomic(&raw)?,
            None => 0,
        };
        Ok(Amount::nano(value))
    }

    /// Check the transfer against what the caller expects.
    ///
    /// `expected` is a decimal TON amount and must match exactly.
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

impl From<Transaction> for CoinTransaction {
    fn from(inner: Transaction) -> Self {
        Self { inner }
    }
}

impl Deref for CoinTransaction {
    type Target = Transaction;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for CoinTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
