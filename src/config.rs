// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! A [`NetworkConfig`] is built once, explicitly, and shared by every
//! component through [`crate::provider::Provider`]. It can be assembled in
//! code or loaded from the environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TON_API_KEY` | toncenter API key | Required |
//! | `TON_TESTNET` | Use testnet endpoints and address flags | `false` |
//! | `TON_WORKCHAIN` | Workchain for wallets and confirmations | `0` |
//! | `TON_EXPLORER` | Explorer for transaction links (`tonscan` or `tonviewer`) | `tonscan` |
//! | `TON_API_BASE_URL` | Override the indexer base URL | toncenter v3 per network |
//! | `TON_REQUEST_TIMEOUT_SECS` | HTTP request timeout | `30` |
//! | `TON_RESOLVE_INTERVAL_MS` | Delay between message hash lookups | `1000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::error::TonError;

pub const API_KEY_ENV: &str = "TON_API_KEY";
pub const TESTNET_ENV: &str = "TON_TESTNET";
pub const WORKCHAIN_ENV: &str = "TON_WORKCHAIN";
pub const EXPLORER_ENV: &str = "TON_EXPLORER";
pub const API_BASE_URL_ENV: &str = "TON_API_BASE_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "TON_REQUEST_TIMEOUT_SECS";
pub const RESOLVE_INTERVAL_ENV: &str = "TON_RESOLVE_INTERVAL_MS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const MAINNET_API_URL: &str = "https://toncenter.com/api/v3/";
pub const TESTNET_API_URL: &str = "https://testnet.toncenter.com/api/v3/";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RESOLVE_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_RESOLVE_ATTEMPTS: u32 = 30;

/// Block explorer used for transaction links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Explorer {
    #[default]
    TonScan,
    TonViewer,
}

impl Explorer {
    /// Base URL that a transaction id is appended to.
    pub fn base_url(self, testnet: bool) -> &'static str {
        match (self, testnet) {
            (Explorer::TonScan, false) => "https://tonscan.org/tx/",
            (Explorer::TonScan, true) => "https://testnet.tonscan.org/tx/",
            (Explorer::TonViewer, false) => "https://tonviewer.com/transaction/",
            (Explorer::TonViewer, true) => "https://testnet.tonviewer.com/transaction/",
        }
    }
}

impl FromStr for Explorer {
    type Err = TonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tonscan" => Ok(Explorer::TonScan),
            "tonviewer" => Ok(Explorer::TonViewer),
            other => Err(TonError::Config(format!("unknown explorer `{other}`"))),
        }
    }
}

/// Placeholder printed instead of credentials.
pub(crate) const REDACTED: &str = "[REDACTED]";

/// Network settings shared by every component.
#[derive(Clone)]
pub struct NetworkConfig {
    pub api_key: String,
    pub testnet: bool,
    pub workchain: i32,
    pub explorer: Explorer,
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub resolve_interval: Duration,
    pub resolve_attempts: u32,
}

impl NetworkConfig {
    /// Configuration with defaults for the chosen network.
    pub fn new(api_key: impl Into<String>, testnet: bool) -> Result<Self, TonError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TonError::Config("API key is required".to_string()));
        }

        Ok(Self {
            api_key,
            testnet,
            workchain: 0,
            explorer: Explorer::default(),
            api_base_url: default_api_url(testnet).to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            resolve_interval: DEFAULT_RESOLVE_INTERVAL,
            resolve_attempts: DEFAULT_RESOLVE_ATTEMPTS,
        })
    }

    pub fn with_explorer(mut self, explorer: Explorer) -> Self {
        self.explorer = explorer;
        self
    }

    pub fn with_workchain(mut self, workchain: i32) -> Self {
        self.workchain = workchain;
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_resolve_policy(mut self, interval: Duration, attempts: u32) -> Self {
        self.resolve_interval = interval;
        self.resolve_attempts = attempts;
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, TonError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, TonError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .ok_or_else(|| TonError::Config(format!("{API_KEY_ENV} is not set")))?;
        let testnet = match lookup(TESTNET_ENV) {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| TonError::Config(format!("{TESTNET_ENV}: expected a boolean")))?,
            None => false,
        };

        let mut config = Self::new(api_key, testnet)?;

        if let Some(raw) = lookup(WORKCHAIN_ENV) {
            config.workchain = raw
                .trim()
                .parse()
                .map_err(|_| TonError::Config(format!("{WORKCHAIN_ENV}: invalid workchain")))?;
        }
        if let Some(raw) = lookup(EXPLORER_ENV) {
            config.explorer = raw.parse()?;
        }
        if let Some(url) = lookup(API_BASE_URL_ENV) {
            config.api_base_url = url;
        }
        if let Some(raw) = lookup(REQUEST_TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| TonError::Config(format!("{REQUEST_TIMEOUT_ENV}: invalid seconds")))?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(RESOLVE_INTERVAL_ENV) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                TonError::Config(format!("{RESOLVE_INTERVAL_ENV}: invalid milliseconds"))
            })?;
            config.resolve_interval = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn is_testnet(&self) -> bool {
        self.testnet
    }

    /// Explorer link for a transaction id.
    pub fn explorer_url(&self, transaction_id: &str) -> String {
        format!("{}{}", self.explorer.base_url(self.testnet), transaction_id)
    }
}

impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("api_key", &REDACTED)
            .field("testnet", &self.testnet)
            .field("workchain", &self.workchain)
            .field("explorer", &self.explorer)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("resolve_interval", &self.resolve_interval)
            .field("resolve_attempts", &self.resolve_attempts)
            .finish()
    }
}

fn default_api_url(testnet: bool) -> &'static str {
    if testnet {
        TESTNET_API_URL
    } else {
        MAINNET_API_URL
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}

/// Install the global tracing subscriber (`RUST_LOG`, `LOG_FORMAT`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {e}");
    }
}
