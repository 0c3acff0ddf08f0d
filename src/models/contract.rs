// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generic contract interactions. Token and NFT transactions build on this.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::{contract_detail, Transaction};
use crate::error::TonError;
use crate::provider::Provider;

pub struct ContractTransaction {
    inner: Transaction,
}

impl ContractTransaction {
    pub fn new(id: impl Into<String>, provider: Arc<Provider>) -> Self {
        Self {
            inner: Transaction::new(id, provider),
        }
    }

    /// Contract the action touched, in contract form.
    pub async fn address(&self) -> Result<String, TonError> {
        let details = self.details().await?;
        contract_detail(self.provider(), details.asset.as_deref(), "asset")
    }
}

impl From<Transaction> for ContractTransaction {
    fn from(inner: Transaction) -> Self {
        Self { inner }
    }
}

impl Deref for ContractTransaction {
    type Target = Transaction;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ContractTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::MockGateway;
    use crate::models::transaction::test_support::{action, raw_tx, script, TX_ID};
    use crate::models::TransactionType;
    use crate::provider::test_support::{contract, provider, raw};
    use serde_json::json;

    #[tokio::test]
    async fn address_is_the_asset_in_contract_form() {
        let mock = Arc::new(MockGateway::new());
        script(
            &mock,
            raw_tx(&raw(1), Some("prev")),
            action("call_contract", true, json!({"source": raw(1), "asset": raw(4)})),
        );
        let tx = ContractTransaction::new(TX_ID, provider(&mock));

        assert_eq!(tx.transaction_type().await.unwrap(), TransactionType::Contract);
        assert_eq!(tx.address().await.unwrap(), contract(4));
    }

    #[tokio::test]
    async fn missing_asset_is_an_invalid_response() {
        let mock = Arc::new(MockGateway::new());
        script(
            &mock,
            raw_tx(&raw(1), Some("prev")),
            action("call_contract", true, json!({"source": raw(1)})),
        );
        let tx = ContractTransaction::from(Transaction::new(TX_ID, provider(&mock)));

        assert!(matches!(tx.address().await, Err(TonError::InvalidResponse(_))));
    }
}
