// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing, broadcasting and settling transfers.
//!
//! [`TransferSigner`] turns a [`TransferIntent`] into a signed external
//! message and broadcasts it. TON does not hand back a transaction id on
//! broadcast, so [`HashResolver`] polls the indexer until the message shows
//! up as the inbound message of a settled transaction.

use std::sync::Arc;
use std::time::Duration;

use base64ct::{Base64, Base64Url, Encoding};
use tokio_util::sync::CancellationToken;

use super::signing::{KeyPair, SignedMessage, WalletFactory};
use super::types::{TransferIntent, WalletVersion};
use super::wallet::TonWalletFactory;
use crate::error::TonError;
use crate::indexer::MessageHashKind;
use crate::provider::Provider;

/// Maps a message hash to the id of the transaction it created.
///
/// Every `resolve_*` call runs its own bounded loop: one lookup per attempt,
/// `interval` between attempts, at most `max_attempts` lookups.
#[derive(Clone)]
pub struct HashResolver {
    provider: Arc<Provider>,
    interval: Duration,
    max_attempts: u32,
    cancel: CancellationToken,
}

impl HashResolver {
    /// Resolver using the provider's configured retry policy.
    pub fn new(provider: Arc<Provider>) -> Self {
        let interval = provider.config().resolve_interval;
        let max_attempts = provider.config().resolve_attempts;
        Self {
            provider,
            interval,
            max_attempts,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.interval = interval;
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Abort pending resolutions when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn resolve_by_body_hash(&self, hash: &str) -> Result<String, TonError> {
        self.resolve(MessageHashKind::Body, hash).await
    }

    pub async fn resolve_by_message_hash(&self, hash: &str) -> Result<String, TonError> {
        self.resolve(MessageHashKind::Message, hash).await
    }

    async fn resolve(&self, kind: MessageHashKind, hash: &str) -> Result<String, TonError> {
        for attempt in 1..=self.max_attempts {
            let message = self.provider.indexer().message_by_hash(kind, hash).await?;
            if let Some(tx_hash) = message.and_then(|m| m.in_msg_tx_hash) {
                let id = base64_to_hex(&tx_hash)?;
                tracing::info!(message = hash, tx = %id, attempt, "message settled");
                return Ok(id);
            }

            if attempt == self.max_attempts {
                break;
            }
            tracing::debug!(message = hash, attempt, "message not indexed yet");

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = self.cancel.cancelled() => return Err(TonError::Cancelled),
            }
        }

        tracing::warn!(message = hash, attempts = self.max_attempts, "message never settled");
        Err(TonError::TransactionNotFound {
            attempts: self.max_attempts,
        })
    }
}

/// Indexer hashes are base64 (either alphabet); transaction ids are hex.
fn base64_to_hex(encoded: &str) -> Result<String, TonError> {
    Base64::decode_vec(encoded)
        .or_else(|_| Base64Url::decode_vec(encoded))
        .map(hex::encode)
        .map_err(|_| TonError::InvalidResponse(format!("transaction hash is not base64: {encoded}")))
}

/// Signs one [`TransferIntent`] with a wallet contract and broadcasts it.
///
/// `sign` consumes and returns the signer so calls chain:
/// `TransferSigner::new(intent, provider).sign(secret).await?.send().await?`.
pub struct TransferSigner {
    intent: TransferIntent,
    provider: Arc<Provider>,
    wallets: Arc<dyn WalletFactory>,
    version: WalletVersion,
    resolver: HashResolver,
    signed: Option<SignedMessage>,
}

impl TransferSigner {
    /// Signer using the bundled wallet contracts and the provider's
    /// resolution policy.
    pub fn new(intent: TransferIntent, provider: Arc<Provider>) -> Self {
        Self {
            intent,
            resolver: HashResolver::new(provider.clone()),
            provider,
            wallets: Arc::new(TonWalletFactory),
            version: WalletVersion::DEFAULT,
            signed: None,
        }
    }

    pub fn with_wallet_factory(mut self, wallets: Arc<dyn WalletFactory>) -> Self {
        self.wallets = wallets;
        self
    }

    /// Sign from a wallet other than the default revision.
    pub fn with_wallet_version(mut self, version: WalletVersion) -> Self {
        self.version = version;
        self
    }

    /// Resolve broadcasts with `resolver` (its retry policy and cancellation).
    pub fn with_resolver(mut self, resolver: HashResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn intent(&self) -> &TransferIntent {
        &self.intent
    }

    pub fn signed_message(&self) -> Option<&SignedMessage> {
        self.signed.as_ref()
    }

    /// Derive keys from `secret`, fetch the wallet's seqno and sign.
    ///
    /// # Arguments
    /// * `secret` - 24-word mnemonic or hex-encoded Ed25519 seed
    ///
    /// # Returns
    /// * `Ok(Self)` - Signer holding the signed external message
    /// * `Err(TonError)` - Key derivation, seqno lookup or message building failed
    pub async fn sign(mut self, secret: &str) -> Result<Self, TonError> {
        let keys = KeyPair::from_secret(secret)?;
        let wallet = self.wallets.create(
            keys.public_key(),
            self.version,
            self.provider.config().workchain,
        )?;
        let address = wallet.address();

        let info = self
            .provider
            .indexer()
            .wallet_information(&address.to_raw_string())
            .await?;
        // Undeployed wallets report no seqno; their first message uses 0.
        let seqno = info.seqno.unwrap_or(0);

        let signed = wallet.build_signed_message(std::slice::from_ref(&self.intent), seqno, &keys)?;
        tracing::debug!(
            wallet = %address,
            version = ?wallet.version(),
            seqno,
            message = %hex::encode(signed.hash),
            "transfer signed"
        );
        self.signed = Some(signed);
        Ok(self)
    }

    /// Broadcast the signed message and wait for the transaction it creates.
    ///
    /// Every call broadcasts once; calling twice sends the message twice.
    pub async fn send(&self) -> Result<String, TonError> {
        let signed = self.signed.as_ref().ok_or(TonError::NotSigned)?;
        let message_hash = hex::encode(signed.hash);

        self.provider
            .indexer()
            .send_message(&Base64::encode_string(&signed.boc))
            .await?;
        tracing::info!(message = %message_hash, "transfer broadcast");

        self.resolver.resolve_by_message_hash(&message_hash).await
    }
}
