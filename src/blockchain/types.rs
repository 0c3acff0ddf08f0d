// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Indexer response records and unsigned transfer descriptions.

use std::ops::BitOr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::address::Address;

// =============================================================================
// Indexer records
// =============================================================================

/// Block coordinates of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub workchain: i32,
    #[serde(default)]
    pub shard: String,
    pub seqno: u64,
}

/// Raw ledger transaction as returned by `transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub account: String,
    pub hash: String,
    #[serde(default)]
    pub lt: String,
    #[serde(default)]
    pub now: i64,
    #[serde(default, deserialize_with = "lenient_u128")]
    pub total_fees: u128,
    #[serde(default)]
    pub prev_trans_hash: Option<String>,
    #[serde(default)]
    pub block_ref: Option<BlockRef>,
    #[serde(default)]
    pub trace_id: Option<String>,
}

/// Type-specific payload of an action. Which fields are set depends on the
/// action type (`ton_transfer`, `jetton_transfer`, `nft_transfer`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDetails {
    // ton_transfer
    pub source: Option<String>,
    pub destination: Option<String>,
    pub value: Option<String>,
    pub comment: Option<String>,
    // jetton_transfer
    pub asset: Option<String>,
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub sender_jetton_wallet: Option<String>,
    pub receiver_jetton_wallet: Option<String>,
    pub amount: Option<String>,
    // nft_transfer
    pub nft_collection: Option<String>,
    pub nft_item: Option<String>,
    pub old_owner: Option<String>,
    pub new_owner: Option<String>,
}

/// Indexer-derived semantic summary of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: ActionDetails,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub action_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionsResponse {
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockSummary {
    #[serde(default)]
    pub workchain: i32,
    #[serde(default)]
    pub shard: String,
    pub seqno: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlocksResponse {
    #[serde(default)]
    pub blocks: Vec<BlockSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRecord {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub in_msg_tx_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
}

/// Lifecycle state of an on-chain account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Uninit,
    Frozen,
    Nonexist,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountState {
    pub address: String,
    #[serde(default, deserialize_with = "lenient_u128")]
    pub balance: u128,
    pub status: AccountStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountStatesResponse {
    #[serde(default)]
    pub accounts: Vec<AccountState>,
}

/// TEP-64 jetton metadata as decoded by the indexer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JettonContent {
    pub name: Option<String>,
    pub symbol: Option<String>,
    /// Either a string or a number depending on the metadata source.
    pub decimals: Option<Value>,
    pub image: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JettonMaster {
    pub address: String,
    #[serde(default, deserialize_with = "lenient_u128")]
    pub total_supply: u128,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jetton_content: JettonContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JettonMastersResponse {
    #[serde(default)]
    pub jetton_masters: Vec<JettonMaster>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JettonWalletRecord {
    pub address: String,
    #[serde(default, deserialize_with = "lenient_u128")]
    pub balance: u128,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub jetton: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JettonWalletsResponse {
    #[serde(default)]
    pub jetton_wallets: Vec<JettonWalletRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NftCollection {
    pub address: String,
    #[serde(default)]
    pub owner_address: Option<String>,
    #[serde(default)]
    pub collection_content: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NftCollectionsResponse {
    #[serde(default)]
    pub nft_collections: Vec<NftCollection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NftItem {
    pub address: String,
    #[serde(default)]
    pub collection_address: Option<String>,
    #[serde(default)]
    pub owner_address: Option<String>,
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub content: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NftItemsResponse {
    #[serde(default)]
    pub nft_items: Vec<NftItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletInformation {
    #[serde(default, deserialize_with = "lenient_u128")]
    pub balance: u128,
    #[serde(default)]
    pub wallet_type: Option<String>,
    #[serde(default)]
    pub seqno: Option<u32>,
    pub status: AccountStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MasterchainInfo {
    #[serde(default)]
    pub last: Option<BlockSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub message_hash: Option<String>,
}

/// Accept integers encoded either as JSON strings or numbers; `null` is 0.
fn lenient_u128<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::String(s) if s.is_empty() => Ok(0),
        Value::String(s) => s.parse().map_err(D::Error::custom),
        Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| D::Error::custom(format!("not an unsigned integer: {n}"))),
        other => Err(D::Error::custom(format!("unexpected amount: {other}"))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Wallets and transfers
// =============================================================================

/// Wallet contract revisions known to the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletVersion {
    V3R1,
    V3R2,
    V4R1,
    V4R2,
    V5Beta,
    V5R1,
}

impl WalletVersion {
    /// Version used when signing transfers.
    pub const DEFAULT: WalletVersion = WalletVersion::V4R2;

    /// Map the indexer's `wallet_type` string.
    pub fn from_wallet_type(wallet_type: &str) -> Option<Self> {
        match wallet_type {
            "wallet v5 r1" => Some(Self::V5R1),
            "wallet v5 beta" => Some(Self::V5Beta),
            "wallet v4 r2" => Some(Self::V4R2),
            "wallet v4 r1" => Some(Self::V4R1),
            "wallet v3 r2" => Some(Self::V3R2),
            "wallet v3 r1" => Some(Self::V3R1),
            _ => None,
        }
    }
}

/// Outbound message send-mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SendMode(u8);

impl SendMode {
    pub const ORDINARY: SendMode = SendMode(0);
    pub const PAY_GAS_SEPARATELY: SendMode = SendMode(1);
    pub const IGNORE_ERRORS: SendMode = SendMode(2);
    pub const CARRY_ALL_REMAINING_BALANCE: SendMode = SendMode(128);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: SendMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SendMode {
    type Output = SendMode;

    fn bitor(self, rhs: Self) -> Self::Output {
        SendMode(self.0 | rhs.0)
    }
}

/// Message body attached to a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPayload {
    Empty,
    /// Plain text comment (opcode 0 followed by UTF-8 text).
    Comment(String),
    /// TEP-74 `transfer` addressed to the sender's jetton wallet.
    JettonTransfer {
        query_id: u64,
        amount: u128,
        destination: Address,
        response_destination: Address,
        forward_amount: u128,
        forward_comment: Option<String>,
    },
    /// TEP-62 `transfer` addressed to the NFT item.
    NftTransfer {
        query_id: u64,
        new_owner: Address,
        response_destination: Address,
        forward_amount: u128,
        forward_comment: Option<String>,
    },
}

/// Unsigned, immutable description of one outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    destination: Address,
    value: u128,
    bounce: bool,
    send_mode: SendMode,
    payload: TransferPayload,
}

impl TransferIntent {
    pub fn new(
        destination: Address,
        value: u128,
        bounce: bool,
        send_mode: SendMode,
        payload: TransferPayload,
    ) -> Self {
        Self {
            destination,
            value,
            bounce,
            send_mode,
            payload,
        }
    }

    pub fn destination(&self) -> &Address {
        &self.destination
    }

    /// Nanotons attached to the message.
    pub fn value(&self) -> u128 {
        self.value
    }

    pub fn bounce(&self) -> bool {
        self.bounce
    }

    pub fn send_mode(&self) -> SendMode {
        self.send_mode
    }

    pub fn payload(&self) -> &TransferPayload {
        &self.payload
    }

    /// Text memo carried by the payload, if any.
    pub fn memo(&self) -> Option<&str> {
        match &self.payload {
            TransferPayload::Comment(text) => Some(text),
            TransferPayload::JettonTransfer {
                forward_comment, ..
            }
            | TransferPayload::NftTransfer {
                forward_comment, ..
            } => forward_comment.as_deref(),
            TransferPayload::Empty => None,
        }
    }
}
