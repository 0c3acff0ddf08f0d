// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lazily loaded, memoized view of one transaction.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use super::{TransactionStatus, TransactionType};
use crate::blockchain::types::{Action, ActionDetails, RawTransaction};
use crate::blockchain::units::Amount;
use crate::error::TonError;
use crate::provider::Provider;

/// Default delay between status polls in [`Transaction::wait`].
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_millis(4000);

/// The raw transaction and its action, fetched together.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionData {
    pub transaction: RawTransaction,
    pub action: Action,
}

/// One transaction id and its indexer records.
///
/// Records are fetched on first access and kept for the lifetime of the
/// instance, including the "no data" outcome. Transport failures are not
/// kept; the next access retries.
pub struct Transaction {
    id: String,
    provider: Arc<Provider>,
    data: OnceCell<Option<TransactionData>>,
}

impl Transaction {
    pub fn new(id: impl Into<String>, provider: Arc<Provider>) -> Self {
        Self {
            id: id.into(),
            provider,
            data: OnceCell::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    /// Both records, or `None` when either lookup came back empty.
    pub async fn data(&self) -> Result<Option<&TransactionData>, TonError> {
        let data = self.data.get_or_try_init(|| self.fetch()).await?;
        Ok(data.as_ref())
    }

    async fn fetch(&self) -> Result<Option<TransactionData>, TonError> {
        let indexer = self.provider.indexer();

        let transaction = indexer
            .transaction_by_hash(&self.id)
            .await
            .map_err(TonError::into_rpc_request)?;
        let Some(transaction) = transaction else {
            tracing::debug!(tx = %self.id, "transaction not indexed");
            return Ok(None);
        };

        let Some(trace_id) = transaction.trace_id.clone() else {
            tracing::debug!(tx = %self.id, "transaction has no trace id");
            return Ok(None);
        };

        let action = indexer
            .action_by_trace_id(&trace_id)
            .await
            .map_err(TonError::into_rpc_request)?;
        let Some(action) = action else {
            tracing::debug!(tx = %self.id, trace_id = %trace_id, "no action for trace");
            return Ok(None);
        };

        tracing::debug!(tx = %self.id, kind = %action.kind, "transaction loaded");
        Ok(Some(TransactionData {
            transaction,
            action,
        }))
    }

    async fn require_data(&self) -> Result<&TransactionData, TonError> {
        self.data()
            .await?
            .ok_or_else(|| TonError::InvalidResponse(format!("no data for transaction {}", self.id)))
    }

    /// Action details, empty when no data is available.
    pub(crate) async fn details(&self) -> Result<ActionDetails, TonError> {
        Ok(self
            .data()
            .await?
            .map(|d| d.action.details.clone())
            .unwrap_or_default())
    }

    pub async fn transaction_type(&self) -> Result<TransactionType, TonError> {
        Ok(match self.data().await? {
            None => TransactionType::General,
            Some(data) => TransactionType::from_action_type(&data.action.kind),
        })
    }

    /// Pending until the ledger record links to a predecessor, then the
    /// action's success flag decides.
    pub async fn status(&self) -> Result<TransactionStatus, TonError> {
        let Some(data) = self.data().await? else {
            return Ok(TransactionStatus::Pending);
        };

        let has_predecessor = data
            .transaction
            .prev_trans_hash
            .as_deref()
            .is_some_and(|h| !h.is_empty());

        Ok(match (has_predecessor, data.action.success) {
            (false, _) => TransactionStatus::Pending,
            (true, true) => TransactionStatus::Confirmed,
            (true, false) => TransactionStatus::Failed,
        })
    }

    /// Poll until the status leaves `Pending`.
    ///
    /// Each poll re-queries the indexer. Errors end the wait with `Failed`;
    /// cancellation ends it with `Pending`.
    pub async fn wait(&mut self, interval: Duration, cancel: &CancellationToken) -> TransactionStatus {
        loop {
            self.data = OnceCell::new();

            match self.status().await {
                Ok(TransactionStatus::Pending) => {}
                Ok(status) => return status,
                Err(e) => {
                    tracing::warn!(tx = %self.id, error = %e, "status poll failed, reporting Failed");
                    return TransactionStatus::Failed;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {},
                _ = cancel.cancelled() => {
                    tracing::debug!(tx = %self.id, "wait cancelled");
                    return TransactionStatus::Pending;
                }
            }
        }
    }

    /// [`Transaction::wait`] bounded by a total timeout.
    pub async fn wait_for(&mut self, interval: Duration, timeout: Duration) -> TransactionStatus {
        let cancel = CancellationToken::new();
        match tokio::time::timeout(timeout, self.wait(interval, &cancel)).await {
            Ok(status) => status,
            Err(_) => {
                tracing::debug!(tx = %self.id, ?timeout, "wait timed out");
                TransactionStatus::Pending
            }
        }
    }

    pub fn url(&self) -> String {
        self.provider.explorer_url(&self.id)
    }

    pub async fn comment(&self) -> Result<String, TonError> {
        Ok(self.details().await?.comment.unwrap_or_default())
    }

    /// Account that executed the transaction, in wallet form.
    pub async fn signer(&self) -> Result<String, TonError> {
        let data = self.require_data().await?;
        self.provider.wallet_form(&data.transaction.account)
    }

    pub async fn fee(&self) -> Result<Amount, TonError> {
        let fees = self
            .data()
            .await?
            .map(|d| d.transaction.total_fees)
            .unwrap_or(0);
        Ok(Amount::nano(fees))
    }

    pub async fn block_number(&self) -> Result<u64, TonError> {
        Ok(self
            .data()
            .await?
            .and_then(|d| d.transaction.block_ref.as_ref())
            .map(|b| b.seqno)
            .unwrap_or(0))
    }

    pub async fn workchain(&self) -> Result<i32, TonError> {
        Ok(self
            .data()
            .await?
            .and_then(|d| d.transaction.block_ref.as_ref())
            .map(|b| b.workchain)
            .unwrap_or(0))
    }

    pub async fn shard(&self) -> Result<String, TonError> {
        Ok(self
            .data()
            .await?
            .and_then(|d| d.transaction.block_ref.as_ref())
            .map(|b| b.shard.clone())
            .unwrap_or_default())
    }

    /// `workchain:shard:seqno`.
    pub async fn block_id(&self) -> Result<String, TonError> {
        let data = self.require_data().await?;
        let block = data.transaction.block_ref.as_ref().ok_or_else(|| {
            TonError::InvalidResponse(format!("transaction {} has no block reference", self.id))
        })?;
        Ok(format!("{}:{}:{}", block.workchain, block.shard, block.seqno))
    }

    /// Unix time of the block.
    pub async fn block_timestamp(&self) -> Result<i64, TonError> {
        Ok(self.data().await?.map(|d| d.transaction.now).unwrap_or(0))
    }

    pub async fn block_time(&self) -> Result<Option<DateTime<Utc>>, TonError> {
        let timestamp = self.block_timestamp().await?;
        if timestamp == 0 {
            return Ok(None);
        }
        Ok(DateTime::from_timestamp(timestamp, 0))
    }

    /// Blocks produced on this transaction's workchain since its block.
    pub async fn block_confirmation_count(&self) -> Result<u64, TonError> {
        let block_number = self.block_number().await?;
        let workchain = self.workchain().await?;

        let head = self
            .provider
            .indexer()
            .latest_block(workchain)
            .await?
            .ok_or_else(|| {
                TonError::InvalidResponse(format!("no blocks for workchain {workchain}"))
            })?;

        Ok(head.seqno.saturating_sub(block_number))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::blockchain::client::RpcError;
    use crate::blockchain::mock::MockGateway;
    use crate::provider::test_support::{provider, raw, wallet};
    use serde_json::json;

    fn coin_action(success: bool) -> serde_json::Value {
        action(
            "ton_transfer",
            success,
            json!({"source": raw(1), "destination": raw(2), "value": "2830538", "comment": "order-42"}),
        )
    }

    #[tokio::test]
    async fn missing_transaction_is_memoized_as_no_data() {
        let mock = Arc::new(MockGateway::new());
        mock.on("transactions", json!({"transactions": []}));
        let tx = Transaction::new("H", provider(&mock));

        assert!(tx.data().await.unwrap().is_none());
        assert_eq!(tx.status().await.unwrap(), TransactionStatus::Pending);
        assert_eq!(tx.transaction_type().await.unwrap(), TransactionType::General);
        assert_eq!(mock.calls_to("transactions").len(), 1);
        assert!(mock.calls_to("actions").is_empty());
    }

    #[tokio::test]
    async fn missing_action_is_no_data() {
        let mock = Arc::new(MockGateway::new());
        mock.on("transactions", json!({"transactions": [raw_tx(&raw(1), Some("prev"))]}));
        mock.on("actions", json!({"actions": []}));
        let tx = Transaction::new(TX_ID, provider(&mock));

        assert!(tx.data().await.unwrap().is_none());
        assert_eq!(mock.calls_to("actions")[0].params.get("trace_id"), Some("trace-1"));
    }

    #[tokio::test]
    async fn confirmed_coin_transfer_exposes_ledger_fields() {
        let mock = Arc::new(MockGateway::new());
        script(&mock, raw_tx(&raw(1), Some("prev")), coin_action(true));
        let tx = Transaction::new(TX_ID, provider(&mock));

        assert_eq!(tx.transaction_type().await.unwrap(), TransactionType::Coin);
        assert_eq!(tx.status().await.unwrap(), TransactionStatus::Confirmed);
        let fee = tx.fee().await.unwrap();
        assert_eq!(fee.to_string(), "0.002830538");
        assert!((fee.to_f64() - 0.002830538).abs() < 1e-12);
        assert_eq!(tx.block_number().await.unwrap(), 28607062);
        assert_eq!(tx.workchain().await.unwrap(), 0);
        assert_eq!(tx.shard().await.unwrap(), "6000000000000000");
        assert_eq!(tx.block_id().await.unwrap(), "0:6000000000000000:28607062");
        assert_eq!(tx.block_timestamp().await.unwrap(), 1736323418);
        assert_eq!(
            tx.block_time().await.unwrap().unwrap().to_rfc3339(),
            "2025-01-08T08:03:38+00:00"
        );
        assert_eq!(tx.comment().await.unwrap(), "order-42");
        assert_eq!(tx.signer().await.unwrap(), wallet(1));
        assert_eq!(
            tx.url(),
            format!("https://testnet.tonscan.org/tx/{TX_ID}")
        );

        // Every accessor above shares one fetch.
        assert_eq!(mock.calls_to("transactions").len(), 1);
        assert_eq!(mock.calls_to("actions").len(), 1);
    }

    #[tokio::test]
    async fn unsuccessful_action_is_failed_and_missing_predecessor_is_pending() {
        let mock = Arc::new(MockGateway::new());
        script(&mock, raw_tx(&raw(1), Some("prev")), coin_action(false));
        let tx = Transaction::new(TX_ID, provider(&mock));
        assert_eq!(tx.status().await.unwrap(), TransactionStatus::Failed);

        let mock = Arc::new(MockGateway::new());
        script(&mock, raw_tx(&raw(1), None), coin_action(true));
        let tx = Transaction::new(TX_ID, provider(&mock));
        assert_eq!(tx.status().await.unwrap(), TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_action_type_is_contract() {
        let mock = Arc::new(MockGateway::new());
        script(&mock, raw_tx(&raw(1), Some("prev")), action("call_contract", true, json!({})));
        let tx = Transaction::new(TX_ID, provider(&mock));
        assert_eq!(tx.transaction_type().await.unwrap(), TransactionType::Contract);
    }

    #[tokio::test]
    async fn transport_errors_are_rpc_request_errors_and_not_cached() {
        let mock = Arc::new(MockGateway::new());
        mock.fail("transactions", RpcError::Http("timeout".to_string()));
        mock.on("transactions", json!({"transactions": []}));
        let tx = Transaction::new(TX_ID, provider(&mock));

        assert!(matches!(tx.data().await, Err(TonError::RpcRequest(_))));
        assert!(tx.data().await.unwrap().is_none());
        assert_eq!(mock.calls_to("transactions").len(), 2);
    }

    #[tokio::test]
    async fn confirmation_count_uses_the_workchain_head() {
        let mock = Arc::new(MockGateway::new());
        script(&mock, raw_tx(&raw(1), Some("prev")), coin_action(true));
        mock.on("blocks", json!({"blocks": [{"workchain": 0, "shard": "6000000000000000", "seqno": 28684800}]}));
        let tx = Transaction::new(TX_ID, provider(&mock));

        assert_eq!(tx.block_confirmation_count().await.unwrap(), 77738);
        assert_eq!(mock.calls_to("blocks")[0].params.get("workchain"), Some("0"));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_polls_until_final() {
        let mock = Arc::new(MockGateway::new());
        mock.on("transactions", json!({"transactions": []}));
        mock.on("transactions", json!({"transactions": [raw_tx(&raw(1), None)]}));
        mock.on("transactions", json!({"transactions": [raw_tx(&raw(1), Some("prev"))]}));
        mock.on("actions", json!({"actions": [coin_action(true)]}));
        let mut tx = Transaction::new(TX_ID, provider(&mock));

        let status = tx.wait(DEFAULT_WAIT_INTERVAL, &CancellationToken::new()).await;
        assert_eq!(status, TransactionStatus::Confirmed);
        assert_eq!(mock.calls_to("transactions").len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_reports_failed_on_errors() {
        let mock = Arc::new(MockGateway::new());
        mock.fail("transactions", RpcError::Http("reset".to_string()));
        let mut tx = Transaction::new(TX_ID, provider(&mock));

        let status = tx.wait(DEFAULT_WAIT_INTERVAL, &CancellationToken::new()).await;
        assert_eq!(status, TransactionStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_stops_on_cancel_and_timeout() {
        let mock = Arc::new(MockGateway::new());
        mock.on("transactions", json!({"transactions": []}));
        let mut tx = Transaction::new(TX_ID, provider(&mock));

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(
            tx.wait(DEFAULT_WAIT_INTERVAL, &cancel).await,
            TransactionStatus::Pending
        );

        let status = tx
            .wait_for(Duration::from_secs(1), Duration::from_secs(10))
            .await;
        assert_eq!(status, TransactionStatus::Pending);
        assert!(mock.calls_to("transactions").len() >= 10);
    }
}
