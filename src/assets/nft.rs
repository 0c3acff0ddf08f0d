// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! NFT collection adapter (TEP-62 items, TEP-64 collection metadata).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;

use super::contract::{Contract, ContractMethods, MethodCache};
use super::{Asset, CONTRACT_TRANSFER_VALUE, FORWARD_AMOUNT};
use crate::blockchain::address::{same_rendering, Address};
use crate::blockchain::types::{NftItem, SendMode, TransferIntent, TransferPayload};
use crate::blockchain::units::Amount;
use crate::error::TonError;
use crate::provider::Provider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMetadata {
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl CollectionMetadata {
    fn from_content(content: &Value) -> Option<Self> {
        let text = |key: &str| content.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            name: text("name")?,
            image: text("image"),
            description: text("description"),
        })
    }
}

pub struct Nft {
    contract: Contract,
    metadata: OnceCell<CollectionMetadata>,
}

impl Nft {
    /// Adapter for the collection at `address`.
    pub fn new(address: impl Into<String>, provider: Arc<Provider>) -> Self {
        Self {
            contract: Contract::new(address, provider),
            metadata: OnceCell::new(),
        }
    }

    fn provider(&self) -> &Arc<Provider> {
        self.contract.provider()
    }

    /// Collection metadata, fetched once.
    ///
    /// Uses the indexer's decoded content when it carries a name, otherwise
    /// follows the off-chain `uri`.
    pub async fn metadata(&self) -> Result<&CollectionMetadata, TonError> {
        self.metadata
            .get_or_try_init(|| self.load_metadata())
            .await
    }

    async fn load_metadata(&self) -> Result<CollectionMetadata, TonError> {
        let collection = self
            .provider()
            .indexer()
            .nft_collection(self.address())
            .await?
            .ok_or_else(|| {
                TonError::InvalidResponse(format!("collection {} not found", self.address()))
            })?;

        if let Some(metadata) = CollectionMetadata::from_content(&collection.collection_content) {
            return Ok(metadata);
        }

        let uri = collection
            .collection_content
            .get("uri")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                TonError::InvalidResponse(format!("collection {} has no metadata", self.address()))
            })?;

        tracing::debug!(collection = self.address(), uri, "fetching off-chain collection metadata");
        let document = self.provider().indexer().fetch_json(uri).await?;
        CollectionMetadata::from_content(&document).ok_or_else(|| {
            TonError::InvalidResponse(format!("metadata at {uri} has no name"))
        })
    }

    /// Indexer record for one item of this collection.
    pub async fn nft_item(&self, token_id: &str) -> Result<NftItem, TonError> {
        self.provider()
            .indexer()
            .nft_item(self.address(), token_id)
            .await?
            .ok_or_else(|| TonError::InvalidResponse(format!("NFT item {token_id} not found")))
    }

    /// Current holder, in wallet form.
    pub async fn owner(&self, token_id: &str) -> Result<String, TonError> {
        let item = self.nft_item(token_id).await?;
        let owner = item
            .owner_address
            .ok_or_else(|| TonError::InvalidResponse(format!("NFT item {token_id} has no owner")))?;
        self.provider().wallet_form(&owner)
    }

    pub async fn token_uri(&self, token_id: &str) -> Result<String, TonError> {
        let item = self.nft_item(token_id).await?;
        item.content
            .get("uri")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| TonError::InvalidResponse(format!("NFT item {token_id} has no uri")))
    }

    pub async fn approved(&self, _token_id: &str) -> Result<Option<String>, TonError> {
        Err(TonError::NotImplemented("approved"))
    }

    /// Build an ownership transfer addressed to the item contract.
    pub async fn transfer(
        &self,
        sender: &str,
        receiver: &str,
        token_id: &str,
        memo: Option<&str>,
    ) -> Result<TransferIntent, TonError> {
        if self.balance(sender).await?.is_zero() {
            return Err(TonError::InsufficientBalance);
        }

        let owner = self.owner(token_id).await?;
        let sender_wallet = self.provider().wallet_form(sender)?;
        if !same_rendering(&owner, &sender_wallet) {
            tracing::debug!(token_id, owner, sender, "sender does not hold the item");
            return Err(TonError::UnauthorizedAddress(sender.to_string()));
        }

        Ok(TransferIntent::new(
            Address::parse(token_id)?,
            CONTRACT_TRANSFER_VALUE,
            true,
            SendMode::PAY_GAS_SEPARATELY,
            TransferPayload::NftTransfer {
                query_id: 0,
                new_owner: Address::parse(receiver)?,
                response_destination: Address::parse(sender)?,
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
        _token_id: &str,
    ) -> Result<TransferIntent, TonError> {
        Err(TonError::NotImplemented("transfer_from"))
    }

    pub async fn approve(
        &self,
        _owner: &str,
        _spender: &str,
        _token_id: &str,
    ) -> Result<TransferIntent, TonError> {
        Err(TonError::NotImplemented("approve"))
    }
}

#[async_trait]
impl ContractMethods for Nft {
    fn address(&self) -> &str {
        self.contract.address()
    }

    fn method_cache(&self) -> &MethodCache {
        self.contract.method_cache()
    }
}

#[async_trait]
impl Asset for Nft {
    async fn name(&self) -> Result<String, TonError> {
        Ok(self.metadata().await?.name.clone())
    }

    /// Collections have no ticker; the description stands in for one.
    async fn symbol(&self) -> Result<String, TonError> {
        let metadata = self.metadata().await?;
        Ok(metadata
            .description
            .clone()
            .unwrap_or_else(|| metadata.name.clone()))
    }

    async fn decimals(&self) -> Result<u8, TonError> {
        Ok(0)
    }

    async fn balance(&self, owner: &str) -> Result<Amount, TonError> {
        let items = self
            .provider()
            .indexer()
            .nft_items_by_owner(self.address(), owner)
            .await?;
        Ok(Amount::new(items.len() as u128, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::MockGateway;
    use crate::provider::test_support::{provider, raw, wallet};
    use serde_json::json;

    const COLLECTION: u8 = 5;
    const ITEM: u8 = 6;
    const HOLDER: u8 = 1;
    const OTHER: u8 = 2;

    fn held_by(owner: u8) -> Arc<MockGateway> {
        let mock = Arc::new(MockGateway::new());
        mock.on(
            "nft/items",
            json!({"nft_items": [{
                "address": raw(ITEM),
                "collection_address": raw(COLLECTION),
                "owner_address": raw(owner),
                "index": "0",
                "content": {"uri": "https://example.org/item/0.json"},
            }]}),
        );
        mock
    }

    #[tokio::test]
    async fn metadata_prefers_indexed_content() {
        let mock = Arc::new(MockGateway::new());
        mock.on(
            "nft/collections",
            json!({"nft_collections": [{
                "address": raw(COLLECTION),
                "collection_content": {"name": "Punks", "description": "PNK"},
            }]}),
        );
        let nft = Nft::new(raw(COLLECTION), provider(&mock));

        assert_eq!(nft.name().await.unwrap(), "Punks");
        assert_eq!(nft.symbol().await.unwrap(), "PNK");
        assert_eq!(nft.decimals().await.unwrap(), 0);
        assert_eq!(mock.calls_to("nft/collections").len(), 1);
        assert!(mock.calls_to("https://example.org/collection.json").is_empty());
    }

    #[tokio::test]
    async fn metadata_falls_back_to_the_content_uri() {
        let mock = Arc::new(MockGateway::new());
        mock.on(
            "nft/collections",
            json!({"nft_collections": [{
                "address": raw(COLLECTION),
                "collection_content": {"uri": "https://example.org/collection.json"},
            }]}),
        );
        mock.on(
            "https://example.org/collection.json",
            json!({"name": "Punks", "image": "https://example.org/logo.png"}),
        );
        let nft = Nft::new(raw(COLLECTION), provider(&mock));

        let metadata = nft.metadata().await.unwrap();
        assert_eq!(metadata.image.as_deref(), Some("https://example.org/logo.png"));
        // No description: symbol falls back to the name.
        assert_eq!(nft.symbol().await.unwrap(), "Punks");
        assert_eq!(mock.calls_to("https://example.org/collection.json").len(), 1);
    }

    #[tokio::test]
    async fn item_queries() {
        let mock = held_by(HOLDER);
        let nft = Nft::new(raw(COLLECTION), provider(&mock));

        assert_eq!(nft.owner(&raw(ITEM)).await.unwrap(), wallet(HOLDER));
        assert_eq!(
            nft.token_uri(&raw(ITEM)).await.unwrap(),
            "https://example.org/item/0.json"
        );
        assert_eq!(nft.balance(&raw(HOLDER)).await.unwrap().atomic(), 1);
        assert!(matches!(
            nft.approved(&raw(ITEM)).await,
            Err(TonError::NotImplemented("approved"))
        ));
    }

    #[tokio::test]
    async fn empty_holder_cannot_transfer() {
        let mock = Arc::new(MockGateway::new());
        mock.on("nft/items", json!({"nft_items": []}));
        let nft = Nft::new(raw(COLLECTION), provider(&mock));

        let err = nft.transfer(&raw(HOLDER), &raw(OTHER), &raw(ITEM), None).await.unwrap_err();
        assert!(matches!(err, TonError::InsufficientBalance));
    }

    #[tokio::test]
    async fn only_the_owner_may_transfer() {
        let mock = held_by(OTHER);
        let nft = Nft::new(raw(COLLECTION), provider(&mock));

        let err = nft.transfer(&raw(HOLDER), &raw(OTHER), &raw(ITEM), None).await.unwrap_err();
        assert!(matches!(err, TonError::UnauthorizedAddress(_)));
    }

    #[tokio::test]
    async fn transfer_is_addressed_to_the_item() {
        let mock = held_by(HOLDER);
        let nft = Nft::new(raw(COLLECTION), provider(&mock));

        // Sender given in wallet form; ownership check is rendering-insensitive.
        let intent = nft
            .transfer(&wallet(HOLDER), &raw(OTHER), &raw(ITEM), Some("gift"))
            .await
            .unwrap();

        assert_eq!(intent.destination(), &Address::parse(&raw(ITEM)).unwrap());
        assert_eq!(intent.value(), CONTRACT_TRANSFER_VALUE);
        assert!(intent.bounce());
        assert_eq!(intent.send_mode(), SendMode::PAY_GAS_SEPARATELY);
        assert_eq!(
            intent.payload(),
            &TransferPayload::NftTransfer {
                query_id: 0,
                new_owner: Address::parse(&raw(OTHER)).unwrap(),
                response_destination: Address::parse(&raw(HOLDER)).unwrap(),
                forward_amount: FORWARD_AMOUNT,
                forward_comment: Some("gift".to_string()),
            }
        );
        assert_eq!(intent.memo(), Some("gift"));
    }
}
