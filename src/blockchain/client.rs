// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generic JSON transport for the toncenter v3 indexer API.
//!
//! Every call goes through one request builder that attaches the API key and
//! resolves the path against the configured base URL. Query parameters may
//! repeat a key (`trace_id=a&trace_id=b`), which is how the indexer accepts
//! array-valued filters.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use url::Url;

use crate::config::REDACTED;

const API_KEY_HEADER: &str = "X-API-KEY";

/// Ordered query parameters; keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    /// Add one `key=value` pair per element.
    pub fn with_all<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        for value in values {
            self.0.push((key.to_string(), value.to_string()));
        }
        self
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Body of a non-GET request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Raw JSON document.
    Json(Value),
    /// `application/x-www-form-urlencoded` pairs.
    Form(QueryParams),
}

/// Transport-level failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

/// JSON request/response transport.
///
/// Responses that are not valid JSON come back as [`Value::String`] holding
/// the raw body.
#[async_trait]
pub trait RpcGateway: Send + Sync {
    async fn get(&self, path: &str, params: &QueryParams) -> Result<Value, RpcError>;

    async fn post(&self, path: &str, body: RequestBody) -> Result<Value, RpcError>;

    /// Fetch an absolute URL outside the API (e.g. off-chain metadata).
    async fn fetch_url(&self, url: &str) -> Result<Value, RpcError>;
}

/// toncenter v3 HTTP client.
#[derive(Clone)]
pub struct ToncenterClient {
    base_url: Url,
    api_key: String,
    http: Client,
}

impl ToncenterClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, RpcError> {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url).map_err(|e| RpcError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, RpcError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RpcError::InvalidUrl(format!("{path}: {e}")))?;

        Ok(self
            .http
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, RpcError> {
        let response = builder
            .send()
            .await
            .map_err(|e| RpcError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;

        if !status.is_success() {
            return Err(RpcError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(decode_body(text))
    }
}

impl fmt::Debug for ToncenterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToncenterClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &REDACTED)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RpcGateway for ToncenterClient {
    async fn get(&self, path: &str, params: &QueryParams) -> Result<Value, RpcError> {
        tracing::debug!(path, params = params.pairs().len(), "toncenter GET");
        let mut builder = self.request(Method::GET, path)?;
        if !params.is_empty() {
            builder = builder.query(params.pairs());
        }
        self.send(builder).await
    }

    async fn post(&self, path: &str, body: RequestBody) -> Result<Value, RpcError> {
        tracing::debug!(path, "toncenter POST");
        let builder = self.request(Method::POST, path)?;
        let builder = match &body {
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(params) => builder.form(params.pairs()),
        };
        self.send(builder).await
    }

    async fn fetch_url(&self, url: &str) -> Result<Value, RpcError> {
        let url = Url::parse(url).map_err(|e| RpcError::InvalidUrl(format!("{url}: {e}")))?;
        self.send(self.http.get(url)).await
    }
}

/// Decode JSON when possible, otherwise keep the raw text.
fn decode_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repeated_keys_are_kept_in_order() {
        let params = QueryParams::new()
            .with("collection_address", "EQabc")
            .with_all("owner_address", ["a", "b"]);
        assert_eq!(
            params.pairs(),
            &[
                ("collection_address".to_string(), "EQabc".to_string()),
                ("owner_address".to_string(), "a".to_string()),
                ("owner_address".to_string(), "b".to_string()),
            ]
        );
        assert_eq!(params.get("owner_address"), Some("a"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn non_json_bodies_are_returned_raw() {
        assert_eq!(decode_body(r#"{"ok":true}"#.to_string()), json!({"ok": true}));
        assert_eq!(decode_body("plain".to_string()), json!("plain"));
    }

    #[test]
    fn base_url_gets_a_trailing_slash() {
        let client = ToncenterClient::new(
            "https://testnet.toncenter.com/api/v3",
            "key",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.base_url().join("transactions").unwrap().as_str(),
            "https://testnet.toncenter.com/api/v3/transactions"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ToncenterClient::new("not a url", "key", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, RpcError::InvalidUrl(_)));
    }

    #[test]
    fn debug_output_hides_the_api_key() {
        let client = ToncenterClient::new(
            "https://toncenter.com/api/v3/",
            "tc-secret-key",
            Duration::from_secs(5),
        )
        .unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("tc-secret-key"));
        assert!(rendered.contains("toncenter.com"));
    }
}
