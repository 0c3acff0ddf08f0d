// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! NFT ownership transfers (`nft_transfer` actions).

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::{
    contract_detail, party_status, unsettled, wallet_detail, AssetDirection, ContractTransaction,
    Transaction, TransactionStatus,
};
use crate::blockchain::address::Address;
use crate::error::TonError;
use crate::provider::Provider;

pub struct NftTransaction {
    inner: ContractTransaction,
}

impl NftTransaction {
    pub fn new(id: impl Into<String>, provider: Arc<Provider>) -> Self {
        Self::from(Transaction::new(id, provider))
    }

    /// Collection, in contract form.
    pub async fn address(&self) -> Result<String, TonError> {
        let details = self.details().await?;
        contract_detail(self.provider(), details.nft_collection.as_deref(), "nft_collection")
    }

    /// New owner, in wallet form.
    pub async fn receiver(&self) -> Result<String, TonError> {
        let details = self.details().await?;
        wallet_detail(self.provider(), details.new_owner.as_deref(), "new_owner")
    }

    /// Previous owner, in wallet form.
    pub async fn sender(&self) -> Result<String, TonError> {
        let details = self.details().await?;
        wallet_detail(self.provider(), details.old_owner.as_deref(), "old_owner")
    }

    /// Item address, in contract form.
    pub async fn nft_id(&self) -> Result<String, TonError> {
        let details = self.details().await?;
        contract_detail(self.provider(), details.nft_item.as_deref(), "nft_item")
    }

    /// Check the transfer against what the caller expects.
    ///
    /// `nft_id` may be given in any address rendering.
    pub async fn verify_transfer(
        &self,
        direction: AssetDirection,
        address: &str,
        nft_id: &str,
    ) -> Result<TransactionStatus, TonError> {
        if let Some(status) = unsettled(self.status().await?) {
            return Ok(status);
        }

        let actual = Address::parse(&self.nft_id().await?)?;
        if Address::parse(nft_id).ok() != Some(actual) {
            return Ok(TransactionStatus::Failed);
        }

        let party = match direction {
            AssetDirection::Incoming => self.receiver().await?,
            AssetDirection::Outgoing => self.sender().await?,
        };
        Ok(party_status(&party, address, self.provider().is_testnet()))
    }
}

impl From<Transaction> for NftTransaction {
    fn from(inner: Transaction) -> Self {
        Self {
            inner: ContractTransaction::from(inner),
        }
    }
}

impl Deref for NftTransaction {
    type Target = ContractTransaction;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for NftTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
