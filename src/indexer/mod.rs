// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Indexer API
//!
//! Typed queries against the toncenter v3 indexer. Each method maps one
//! logical endpoint onto a response record from [`crate::blockchain::types`].
//!
//! ## Endpoints
//!
//! | Method | Path |
//! |--------|------|
//! | [`Indexer::account_state`] | `accountStates` |
//! | [`Indexer::transaction_by_hash`] | `transactions` |
//! | [`Indexer::action_by_trace_id`] | `actions` |
//! | [`Indexer::latest_block`] | `blocks` (sorted descending) |
//! | [`Indexer::message_by_hash`] | `messages` |
//! | [`Indexer::jetton_master`] | `jetton/masters` |
//! | [`Indexer::jetton_wallet`] | `jetton/wallets` |
//! | [`Indexer::nft_collection`] | `nft/collections` |
//! | [`Indexer::nft_item`], [`Indexer::nft_items_by_owner`] | `nft/items` |
//! | [`Indexer::wallet_information`] | `walletInformation` |
//! | [`Indexer::masterchain_info`] | `masterchainInfo` |
//! | [`Indexer::send_message`] | `message` (POST) |

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::blockchain::client::{QueryParams, RequestBody, RpcError, RpcGateway};
use crate::blockchain::types::*;
use crate::error::TonError;

/// Page size when listing NFT items.
const NFT_PAGE_LIMIT: usize = 256;

/// Upper bound on pages fetched for one owner listing.
pub const MAX_NFT_PAGES: usize = 64;

/// Which hash a message lookup is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageHashKind {
    /// Hash of the message body cell.
    Body,
    /// Hash of the whole message cell.
    Message,
}

impl MessageHashKind {
    fn param(self) -> &'static str {
        match self {
            MessageHashKind::Body => "body_hash",
            MessageHashKind::Message => "msg_hash",
        }
    }
}

/// Typed indexer queries sharing one gateway.
#[derive(Clone)]
pub struct Indexer {
    gateway: Arc<dyn RpcGateway>,
}

impl Indexer {
    pub fn new(gateway: Arc<dyn RpcGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<dyn RpcGateway> {
        &self.gateway
    }

    async fn query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: QueryParams,
    ) -> Result<T, TonError> {
        let value = self.gateway.get(path, &params).await?;
        decode(path, value)
    }

    pub async fn transaction_by_hash(&self, hash: &str) -> Result<Option<RawTransaction>, TonError> {
        let response: TransactionsResponse = self
            .query("transactions", QueryParams::new().with("hash", hash))
            .await?;
        Ok(response.transactions.into_iter().next())
    }

    pub async fn action_by_trace_id(&self, trace_id: &str) -> Result<Option<Action>, TonError> {
        let response: ActionsResponse = self
            .query("actions", QueryParams::new().with_all("trace_id", [trace_id]))
            .await?;
        Ok(response.actions.into_iter().next())
    }

    /// Most recent block of a workchain.
    pub async fn latest_block(&self, workchain: i32) -> Result<Option<BlockSummary>, TonError> {
        let response: BlocksResponse = self
            .query(
                "blocks",
                QueryParams::new()
                    .with("workchain", workchain)
                    .with("sort", "desc")
                    .with("limit", 1),
            )
            .await?;
        Ok(response.blocks.into_iter().next())
    }

    pub async fn message_by_hash(
        &self,
        kind: MessageHashKind,
        hash: &str,
    ) -> Result<Option<MessageRecord>, TonError> {
        let response: MessagesResponse = self
            .query("messages", QueryParams::new().with(kind.param(), hash))
            .await?;
        Ok(response.messages.into_iter().next())
    }

    pub async fn account_state(&self, address: &str) -> Result<Option<AccountState>, TonError> {
        let response: AccountStatesResponse = self
            .query(
                "accountStates",
                QueryParams::new()
                    .with_all("address", [address])
                    .with("include_boc", false),
            )
            .await?;
        Ok(response.accounts.into_iter().next())
    }

    pub async fn jetton_master(&self, address: &str) -> Result<Option<JettonMaster>, TonError> {
        let response: JettonMastersResponse = self
            .query("jetton/masters", QueryParams::new().with_all("address", [address]))
            .await?;
        Ok(response.jetton_masters.into_iter().next())
    }

    /// The owner's wallet for a given jetton master.
    pub async fn jetton_wallet(
        &self,
        owner: &str,
        jetton: &str,
    ) -> Result<Option<JettonWalletRecord>, TonError> {
        let response: JettonWalletsResponse = self
            .query(
                "jetton/wallets",
                QueryParams::new()
                    .with_all("owner_address", [owner])
                    .with("jetton_address", jetton)
                    .with("limit", 1),
            )
            .await?;
        Ok(response.jetton_wallets.into_iter().next())
    }

    pub async fn nft_collection(&self, address: &str) -> Result<Option<NftCollection>, TonError> {
        let response: NftCollectionsResponse = self
            .query(
                "nft/collections",
                QueryParams::new().with_all("collection_address", [address]),
            )
            .await?;
        Ok(response.nft_collections.into_iter().next())
    }

    pub async fn nft_item(
        &self,
        collection: &str,
        item: &str,
    ) -> Result<Option<NftItem>, TonError> {
        let response: NftItemsResponse = self
            .query(
                "nft/items",
                QueryParams::new()
                    .with("collection_address", collection)
                    .with_all("address", [item]),
            )
            .await?;
        Ok(response.nft_items.into_iter().next())
    }

    /// Every item of `collection` held by `owner`, following pagination.
    ///
    /// Stops at a short page or at a page that adds no unseen item, and
    /// gives up after [`MAX_NFT_PAGES`] pages.
    pub async fn nft_items_by_owner(
        &self,
        collection: &str,
        owner: &str,
    ) -> Result<Vec<NftItem>, TonError> {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        for page in 0..MAX_NFT_PAGES {
            let response: NftItemsResponse = self
                .query(
                    "nft/items",
                    QueryParams::new()
                        .with("collection_address", collection)
                        .with_all("owner_address", [owner])
                        .with("limit", NFT_PAGE_LIMIT)
                        .with("offset", page * NFT_PAGE_LIMIT),
                )
                .await?;

            let page_len = response.nft_items.len();
            let before = items.len();
            items.extend(
                response
                    .nft_items
                    .into_iter()
                    .filter(|item| seen.insert(item.address.clone())),
            );
            if page_len < NFT_PAGE_LIMIT || items.len() == before {
                return Ok(items);
            }
        }

        tracing::warn!(collection, owner, pages = MAX_NFT_PAGES, "nft listing did not terminate");
        Err(TonError::InvalidResponse(format!(
            "nft/items returned more than {MAX_NFT_PAGES} full pages"
        )))
    }

    pub async fn wallet_information(&self, address: &str) -> Result<WalletInformation, TonError> {
        self.query(
            "walletInformation",
            QueryParams::new()
                .with("address", address)
                .with("use_v2", false),
        )
        .await
    }

    pub async fn masterchain_info(&self) -> Result<MasterchainInfo, TonError> {
        self.query("masterchainInfo", QueryParams::new()).await
    }

    /// Broadcast a serialized external message (base64 BoC).
    pub async fn send_message(&self, boc_base64: &str) -> Result<SendMessageResponse, TonError> {
        let value = self
            .gateway
            .post("message", RequestBody::Json(json!({ "boc": boc_base64 })))
            .await?;
        decode("message", value)
    }

    /// Fetch an off-chain JSON document (e.g. collection metadata).
    pub async fn fetch_json(&self, url: &str) -> Result<Value, TonError> {
        Ok(self.gateway.fetch_url(url).await?)
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, TonError> {
    serde_json::from_value(value)
        .map_err(|e| TonError::Transport(RpcError::Decode(format!("{path}: {e}"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::MockGateway;

    fn indexer(mock: &Arc<MockGateway>) -> Indexer {
        Indexer::new(mock.clone())
    }

    #[tokio::test]
    async fn actions_are_queried_by_trace_id() {
        let mock = Arc::new(MockGateway::new());
        mock.on(
            "actions",
            json!({"actions": [{"type": "ton_transfer", "success": true, "details": {"value": "5"}}]}),
        );

        let action = indexer(&mock).action_by_trace_id("trace-1").await.unwrap().unwrap();
        assert_eq!(action.kind, "ton_transfer");
        assert_eq!(action.details.value.as_deref(), Some("5"));

        let calls = mock.calls_to("actions");
        assert_eq!(calls[0].params.get("trace_id"), Some("trace-1"));
    }

    #[tokio::test]
    async fn empty_lists_become_none() {
        let mock = Arc::new(MockGateway::new());
        mock.on("transactions", json!({"transactions": []}));
        assert!(indexer(&mock).transaction_by_hash("H").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_block_sorts_descending() {
        let mock = Arc::new(MockGateway::new());
        mock.on("blocks", json!({"blocks": [{"workchain": 0, "shard": "8000000000000000", "seqno": 99}]}));

        let block = indexer(&mock).latest_block(0).await.unwrap().unwrap();
        assert_eq!(block.seqno, 99);

        let params = &mock.calls_to("blocks")[0].params;
        assert_eq!(params.get("sort"), Some("desc"));
        assert_eq!(params.get("workchain"), Some("0"));
    }

    #[tokio::test]
    async fn message_lookup_uses_the_right_key() {
        let mock = Arc::new(MockGateway::new());
        mock.on("messages", json!({"messages": []}));
        let idx = indexer(&mock);

        idx.message_by_hash(MessageHashKind::Body, "aa").await.unwrap();
        idx.message_by_hash(MessageHashKind::Message, "bb").await.unwrap();

        let calls = mock.calls_to("messages");
        assert_eq!(calls[0].params.get("body_hash"), Some("aa"));
        assert_eq!(calls[1].params.get("msg_hash"), Some("bb"));
    }

    #[tokio::test]
    async fn nft_items_follow_pagination() {
        let mock = Arc::new(MockGateway::new());
        let full_page: Vec<Value> = (0..NFT_PAGE_LIMIT)
            .map(|i| json!({"address": format!("0:{i:064x}")}))
            .collect();
        mock.on("nft/items", json!({ "nft_items": full_page }));
        mock.on("nft/items", json!({"nft_items": [{"address": "0:ff"}]}));

        let items = indexer(&mock).nft_items_by_owner("C", "O").await.unwrap();
        assert_eq!(items.len(), NFT_PAGE_LIMIT + 1);

        let calls = mock.calls_to("nft/items");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].params.get("offset"), Some("256"));
    }

    #[tokio::test]
    async fn raw_string_replies_are_decode_errors() {
        let mock = Arc::new(MockGateway::new());
        mock.on("masterchainInfo", json!("<html>gateway timeout</html>"));

        let err = indexer(&mock).masterchain_info().await.unwrap_err();
        assert!(matches!(err, TonError::Transport(RpcError::Decode(_))));
    }

    #[tokio::test]
    async fn send_message_posts_json_boc() {
        let mock = Arc::new(MockGateway::new());
        mock.on("message", json!({"message_hash": "abc"}));

        let response = indexer(&mock).send_message("te6cc").await.unwrap();
        assert_eq!(response.message_hash.as_deref(), Some("abc"));

        let call = &mock.calls_to("message")[0];
        assert_eq!(call.method, "POST");
        assert_eq!(call.body, Some(RequestBody::Json(json!({"boc": "te6cc"}))));
    }

    #[tokio::test]
    async fn nft_listing_stops_when_offset_is_ignored() {
        let mock = Arc::new(MockGateway::new());
        let full_page: Vec<Value> = (0..NFT_PAGE_LIMIT)
            .map(|i| json!({"address": format!("0:{i:064x}")}))
            .collect();
        // the same full page for every offset
        mock.on("nft/items", json!({ "nft_items": full_page }));

        let items = indexer(&mock).nft_items_by_owner("C", "O").await.unwrap();
        assert_eq!(items.len(), NFT_PAGE_LIMIT);
        assert_eq!(mock.calls_to("nft/items").len(), 2);
    }

    #[tokio::test]
    async fn nft_listing_is_bounded() {
        let mock = Arc::new(MockGateway::new());
        for page in 0..MAX_NFT_PAGES {
            let items: Vec<Value> = (0..NFT_PAGE_LIMIT)
                .map(|i| json!({"address": format!("0:{:064x}", page * NFT_PAGE_LIMIT + i)}))
                .collect();
            mock.on("nft/items", json!({ "nft_items": items }));
        }

        let err = indexer(&mock).nft_items_by_owner("C", "O").await.unwrap_err();
        assert!(matches!(err, TonError::InvalidResponse(_)));
        assert_eq!(mock.calls_to("nft/items").len(), MAX_NFT_PAGES);
    }
}
