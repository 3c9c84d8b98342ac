//! Page acquisition through public CORS proxies.
//!
//! Proxies are tried strictly in sequence, one request in flight at a
//! time. The HTTP layer sits behind the `Transport` trait so the chain can
//! be driven by a mock in tests.

pub mod chain;
pub mod proxy;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub use chain::{FetchedDocument, ProxyChain, ProxyReport};
pub use proxy::{Proxy, ProxyContent};

/// Status, content type and body of one HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over a plain HTTP GET.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the response whatever its status.
    async fn get(&self, url: &str) -> Result<RawResponse>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = resp
            .text()
            .await
            .context("Failed to read response body")?;

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
