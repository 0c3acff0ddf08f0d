// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generic contract facade.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TonError;
use crate::provider::Provider;

/// Results memoized by [`ContractMethods::call_method_with_cache`].
pub type MethodCache = Mutex<HashMap<String, Value>>;

/// Method-level access to a contract.
///
/// The default implementations report `NotImplemented`; assets that can
/// answer a method override it.
#[async_trait]
pub trait ContractMethods: Send + Sync {
    fn address(&self) -> &str;

    fn method_cache(&self) -> &MethodCache;

    async fn call_method(&self, _method: &str, _args: &[Value]) -> Result<Value, TonError> {
        Err(TonError::NotImplemented("call_method"))
    }

    async fn get_method_data(&self, _method: &str, _args: &[Value]) -> Result<Value, TonError> {
        Err(TonError::NotImplemented("get_method_data"))
    }

    async fn create_transaction_data(
        &self,
        _method: &str,
        _from: &str,
        _args: &[Value],
    ) -> Result<Value, TonError> {
        Err(TonError::NotImplemented("create_transaction_data"))
    }

    /// [`ContractMethods::call_method`] memoized per method and arguments.
    ///
    /// Entries live as long as the adapter and are never invalidated.
    async fn call_method_with_cache(&self, method: &str, args: &[Value]) -> Result<Value, TonError> {
        let key = cache_key(method, args);

        let cached = match self.method_cache().lock() {
            Ok(cache) => cache.get(&key).cloned(),
            Err(_) => None,
        };
        if let Some(value) = cached {
            tracing::debug!(contract = %self.address(), method, "method cache hit");
            return Ok(value);
        }

        let value = self.call_method(method, args).await?;
        if let Ok(mut cache) = self.method_cache().lock() {
            cache.insert(key, value.clone());
        }
        Ok(value)
    }
}

fn cache_key(method: &str, args: &[Value]) -> String {
    format!("{method}:{}", Value::Array(args.to_vec()))
}

/// Address-only contract handle.
pub struct Contract {
    address: String,
    provider: Arc<Provider>,
    cache: MethodCache,
}

impl Contract {
    pub fn new(address: impl Into<String>, provider: Arc<Provider>) -> Self {
        Self {
            address: address.into(),
            provider,
            cache: MethodCache::default(),
        }
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }
}

#[async_trait]
impl ContractMethods for Contract {
    fn address(&self) -> &str {
        &self.address
    }

    fn method_cache(&self) -> &MethodCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::MockGateway;
    use crate::provider::test_support::{provider, raw};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingContract {
        inner: Contract,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContractMethods for CountingContract {
        fn address(&self) -> &str {
            self.inner.address()
        }

        fn method_cache(&self) -> &MethodCache {
            self.inner.method_cache()
        }

        async fn call_method(&self, method: &str, args: &[Value]) -> Result<Value, TonError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "method": method, "args": args }))
        }
    }

    #[tokio::test]
    async fn default_methods_are_not_implemented() {
        let mock = Arc::new(MockGateway::new());
        let contract = Contract::new(raw(3), provider(&mock));

        assert_eq!(contract.address(), raw(3));
        assert!(matches!(
            contract.call_method("get_jetton_data", &[]).await,
            Err(TonError::NotImplemented("call_method"))
        ));
        assert!(matches!(
            contract.get_method_data("seqno", &[]).await,
            Err(TonError::NotImplemented(_))
        ));
        assert!(matches!(
            contract.create_transaction_data("transfer", &raw(1), &[]).await,
            Err(TonError::NotImplemented(_))
        ));
        assert!(matches!(
            contract.call_method_with_cache("seqno", &[]).await,
            Err(TonError::NotImplemented(_))
        ));
    }

    #[tokio::test]
    async fn cached_calls_are_keyed_by_method_and_arguments() {
        let mock = Arc::new(MockGateway::new());
        let contract = CountingContract {
            inner: Contract::new(raw(3), provider(&mock)),
            calls: AtomicUsize::new(0),
        };

        let first = contract.call_method_with_cache("balance", &[json!("a")]).await.unwrap();
        let again = contract.call_method_with_cache("balance", &[json!("a")]).await.unwrap();
        assert_eq!(first, again);
        assert_eq!(contract.calls.load(Ordering::SeqCst), 1);

        contract.call_method_with_cache("balance", &[json!("b")]).await.unwrap();
        contract.call_method_with_cache("owner", &[json!("a")]).await.unwrap();
        assert_eq!(contract.calls.load(Ordering::SeqCst), 3);
    }
}
