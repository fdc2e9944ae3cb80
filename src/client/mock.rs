//! Scripted in-memory client
//!
//! Replies are handed out in order; once the script runs dry every request gets
//! the fallback reply. Every request is recorded for later assertions.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use crate::error::{Error, Result};

use super::{ResourceClient, Response};

/// One scripted answer
#[derive(Debug, Clone)]
pub enum MockReply {
    /// An HTTP response, whatever its status
    Respond(Response),
    /// A transport failure with the given message
    Fail(String),
}

impl MockReply {
    /// Response with a status and an empty body
    pub fn status(status: StatusCode) -> Self {
        MockReply::Respond(Response::empty(status))
    }

    /// Response with a status and a JSON body
    pub fn json(status: StatusCode, body: &str) -> Self {
        MockReply::Respond(Response::new(status, body.as_bytes()))
    }

    /// Connection refused
    pub fn refused() -> Self {
        MockReply::Fail("connection refused".to_string())
    }

    fn into_result(self) -> Result<Response> {
        match self {
            MockReply::Respond(response) => Ok(response),
            MockReply::Fail(msg) => Err(Error::transport(msg)),
        }
    }
}

/// A request seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    /// Decode the request body as JSON
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// Scripted client with request history
#[derive(Debug)]
pub struct MockClient {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    history: Mutex<Vec<RecordedRequest>>,
}

impl MockClient {
    /// Replay `replies` in order, then answer 200 with an empty body
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            fallback: MockReply::status(StatusCode::OK),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with `reply`
    pub fn always(reply: MockReply) -> Self {
        Self::new(Vec::new()).with_fallback(reply)
    }

    /// Reply used once the script is exhausted
    pub fn with_fallback(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.history).clone()
    }

    /// `(method, path)` pairs of every request received so far
    pub fn calls(&self) -> Vec<(Method, String)> {
        lock(&self.history)
            .iter()
            .map(|r| (r.method.clone(), r.path.clone()))
            .collect()
    }

    /// Forget recorded requests; the script is left as is
    pub fn clear_history(&self) {
        lock(&self.history).clear();
    }

    fn answer(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Response> {
        lock(&self.history).push(RecordedRequest {
            method,
            path: path.to_string(),
            body,
        });

        let reply = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        reply.into_result()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ResourceClient for MockClient {
    async fn get(&self, path: &str) -> Result<Response> {
        self.answer(Method::GET, path, None)
    }

    async fn post(&self, path: &str, body: Vec<u8>) -> Result<Response> {
        self.answer(Method::POST, path, Some(body))
    }

    async fn put(&self, path: &str, body: Vec<u8>) -> Result<Response> {
        self.answer(Method::PUT, path, Some(body))
    }

    async fn patch(&self, path: &str, body: Vec<u8>) -> Result<Response> {
        self.answer(Method::PATCH, path, Some(body))
    }

    async fn delete(&self, path: &str) -> Result<Response> {
        self.answer(Method::DELETE, path, None)
    }
}
