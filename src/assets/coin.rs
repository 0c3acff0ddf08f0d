// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Toncoin, the native currency.

use std::sync::Arc;

use async_trait::async_trait;

use super::Asset;
use crate::blockchain::address::Address;
use crate::blockchain::types::{SendMode, TransferIntent, TransferPayload};
use crate::blockchain::units::{to_base, Amount, TON_DECIMALS};
use crate::error::TonError;
use crate::provider::Provider;

pub struct Coin {
    provider: Arc<Provider>,
}

impl Coin {
    pub fn new(provider: Arc<Provider>) -> Self {
        Self { provider }
    }

    /// Build a plain Toncoin transfer with an optional text comment.
    ///
    /// The amount is validated before any network access.
    pub async fn transfer(
        &self,
        sender: &str,
        receiver: &str,
        amount: &str,
        memo: Option<&str>,
    ) -> Result<TransferIntent, TonError> {
        let value = to_base(amount, TON_DECIMALS)?;
        let destination = Address::parse(receiver)?;

        let balance = self.balance(sender).await?;
        if value > balance.atomic() {
            tracing::debug!(sender, amount, balance = %balance, "insufficient TON balance");
            return Err(TonError::InsufficientBalance);
        }

        let payload = match memo {
            Some(text) => TransferPayload::Comment(text.to_string()),
            None => TransferPayload::Empty,
        };

        Ok(TransferIntent::new(
            destination,
            value,
            false,
            SendMode::PAY_GAS_SEPARATELY | SendMode::IGNORE_ERRORS,
            payload,
        ))
    }
}

#[async_trait]
impl Asset for Coin {
    async fn name(&self) -> Result<String, TonError> {
        Ok("Toncoin".to_string())
    }

    async fn symbol(&self) -> Result<String, TonError> {
        Ok("TON".to_string())
    }

    async fn decimals(&self) -> Result<u8, TonError> {
        Ok(TON_DECIMALS)
    }

    async fn balance(&self, owner: &str) -> Result<Amount, TonError> {
        let state = self.provider.indexer().account_state(owner).await?;
        Ok(Amount::nano(state.map(|s| s.balance).unwrap_or(0)))
    }
}
