// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted gateway used by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::client::{QueryParams, RequestBody, RpcError, RpcGateway};

/// A request observed by [`MockGateway`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub params: QueryParams,
    pub body: Option<RequestBody>,
}

/// Returns queued responses per path. The last queued response for a path
/// is repeated once the queue is drained to one entry.
#[derive(Default)]
pub struct MockGateway {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, RpcError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, path: &str, value: Value) -> &Self {
        self.push(path, Ok(value))
    }

    pub fn fail(&self, path: &str, error: RpcError) -> &Self {
        self.push(path, Err(error))
    }

    fn push(&self, path: &str, response: Result<Value, RpcError>) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.path == path)
            .collect()
    }

    fn respond(&self, call: RecordedCall) -> Result<Value, RpcError> {
        let path = call.path.clone();
        self.calls.lock().unwrap().push(call);

        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&path).ok_or_else(|| RpcError::Status {
            status: 404,
            body: format!("no scripted response for {path}"),
        })?;

        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        }
    }
}

#[async_trait]
impl RpcGateway for MockGateway {
    async fn get(&self, path: &str, params: &QueryParams) -> Result<Value, RpcError> {
        self.respond(RecordedCall {
            method: "GET",
            path: path.to_string(),
            params: params.clone(),
            body: None,
        })
    }

    async fn post(&self, path: &str, body: RequestBody) -> Result<Value, RpcError> {
        self.respond(RecordedCall {
            method: "POST",
            path: path.to_string(),
            params: QueryParams::new(),
            body: Some(body),
        })
    }

    async fn fetch_url(&self, url: &str) -> Result<Value, RpcError> {
        self.respond(RecordedCall {
            method: "GET",
            path: url.to_string(),
            params: QueryParams::new(),
            body: None,
        })
    }
}
