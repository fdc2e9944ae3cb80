//! REST transport for the emulator
//!
//! Everything that talks to the emulator goes through [`ResourceClient`], so the
//! reconciler can run against the real HTTP client or a scripted [`MockClient`].

mod http;
mod mock;

pub use http::*;
pub use mock::*;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::Result;

/// API version segment prepended to every path
pub const API_VERSION: &str = "v1";

/// Raw emulator answer
///
/// Non-2xx statuses are ordinary responses; callers decide what they mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Response {
    /// Build a response from a status and a body
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Response with an empty body
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, Vec::new())
    }
}

/// Capabilities needed to drive the emulator REST API
///
/// Paths are relative to `http://{host}/v1/`. Implementations do not retry;
/// an `Err` always means the request never produced an HTTP response.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<Response>;

    async fn post(&self, path: &str, body: Vec<u8>) -> Result<Response>;

    async fn put(&self, path: &str, body: Vec<u8>) -> Result<Response>;

    async fn patch(&self, path: &str, body: Vec<u8>) -> Result<Response>;

    async fn delete(&self, path: &str) -> Result<Response>;
}
