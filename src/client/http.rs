//! reqwest-backed emulator client

use std::borrow::Cow;
use std::net::Ipv6Addr;

use async_trait::async_trait;
use reqwest::{header, Client, Method};
use tracing::debug;

use crate::error::{Error, Result};
use crate::metrics;

use super::{ResourceClient, Response, API_VERSION};

/// HTTP client bound to one emulator host
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    host: String,
    version: String,
}

impl HttpClient {
    /// Create a client for `host` (`host:port`, no scheme)
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            host: host.into(),
            version: API_VERSION.to_string(),
        }
    }

    /// Host this client talks to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Absolute URL for a path relative to the API version root
    ///
    /// A bare IPv6 literal host is bracketed.
    pub fn url(&self, path: &str) -> String {
        let authority = match self.host.parse::<Ipv6Addr>() {
            Ok(_) => Cow::Owned(format!("[{}]", self.host)),
            Err(_) => Cow::Borrowed(self.host.as_str()),
        };
        format!("http://{}/{}/{}", authority, self.version, path)
    }

    async fn call(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Response> {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Sending request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::REQUESTS
                    .with_label_values(&[method.as_str(), "transport_error"])
                    .inc();
                return Err(Error::transport(format!("{} {}: {}", method, url, e)));
            }
        };

        let status = response.status();
        metrics::REQUESTS
            .with_label_values(&[method.as_str(), status.as_str()])
            .inc();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("reading body of {} {}: {}", method, url, e)))?;

        Ok(Response {
            status,
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl ResourceClient for HttpClient {
    async fn get(&self, path: &str) -> Result<Response> {
        self.call(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Vec<u8>) -> Result<Response> {
        self.call(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Vec<u8>) -> Result<Response> {
        self.call(Method::PUT, path, Some(body)).await
    }

    async fn patch(&self, path: &str, body: Vec<u8>) -> Result<Response> {
        self.call(Method::PATCH, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Response> {
        self.call(Method::DELETE, path, None).await
    }
}
