//! Sequential proxy fallback and per-proxy diagnostics.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::proxy::Proxy;
use super::Transport;
use crate::types::ScratcherError;

/// Snippet length reported by diagnostics.
const SNIPPET_CHARS: usize = 500;

/// A page successfully relayed by one of the proxies.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub proxy: Proxy,
    pub content: String,
    pub fetched_at: DateTime<Utc>,
}

/// Outcome of one proxy during diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyReport {
    pub name: String,
    pub proxy_url: String,
    pub status: Option<u16>,
    pub ok: bool,
    pub duration_ms: u64,
    pub content_type: Option<String>,
    pub snippet: Option<String>,
    pub warning: Option<String>,
    pub error: Option<String>,
}

fn line(f: &mut fmt::Formatter<'_>, label: &str, value: Option<&str>) -> fmt::Result {
    writeln!(f, "{label}: {}", value.unwrap_or("n/a"))
}

impl fmt::Display for ProxyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.name)?;
        line(f, "Proxy URL", Some(self.proxy_url.as_str()))?;
        if let Some(err) = &self.error {
            return line(f, "Error", Some(err.as_str()));
        }
        if let Some(status) = self.status {
            let ok = if self.ok { "ok" } else { "not ok" };
            line(f, "HTTP status", Some(format!("{status} ({ok})").as_str()))?;
        }
        line(f, "Duration", Some(format!("{}ms", self.duration_ms).as_str()))?;
        line(f, "Content-Type", self.content_type.as_deref())?;
        if let Some(warning) = &self.warning {
            line(f, "Warning", Some(warning.as_str()))?;
        }
        line(f, "Snippet", self.snippet.as_deref())
    }
}

fn snippet(content: &str) -> String {
    let head: String = content.chars().take(SNIPPET_CHARS).collect();
    let collapsed = head.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        "(empty response)".to_string()
    } else {
        collapsed
    }
}

/// Fetches a page through the first proxy that returns usable content.
pub struct ProxyChain<T: Transport> {
    transport: T,
    proxies: Vec<Proxy>,
}

impl<T: Transport> ProxyChain<T> {
    /// Chain over every known proxy.
    pub fn new(transport: T) -> Self {
        Self::with_proxies(transport, Proxy::ALL.to_vec())
    }

    pub fn with_proxies(transport: T, proxies: Vec<Proxy>) -> Self {
        Self { transport, proxies }
    }

    pub fn proxies(&self) -> &[Proxy] {
        &self.proxies
    }

    /// One proxy attempt. Non-2xx and blank content both count as failure.
    async fn attempt(&self, proxy: Proxy, url: &str) -> anyhow::Result<String> {
        let resp = self.transport.get(&proxy.build_url(url)).await?;
        if !resp.is_success() {
            return Err(anyhow!(ScratcherError::Http(resp.status)));
        }

        let relayed = proxy.unwrap_body(&resp.body);
        let content = relayed.content.trim();
        if content.is_empty() {
            let msg = relayed.warning.unwrap_or_else(|| "Empty response".to_string());
            return Err(anyhow!(ScratcherError::EmptyContent(msg)));
        }

        Ok(content.to_string())
    }

    /// Fetch `url`, falling back through the proxies in order.
    pub async fn fetch_document(&self, url: &str) -> Result<FetchedDocument, ScratcherError> {
        let mut errors: Vec<String> = Vec::new();

        for &proxy in &self.proxies {
            debug!(proxy = %proxy, url, "Fetching via proxy");
            match self.attempt(proxy, url).await {
                Ok(content) => {
                    info!(proxy = %proxy, url, bytes = content.len(), "Page fetched");
                    return Ok(FetchedDocument {
                        proxy,
                        content,
                        fetched_at: Utc::now(),
                    });
                }
                Err(e) => {
                    warn!(proxy = %proxy, url, error = %e, "Proxy attempt failed");
                    errors.push(format!("{}: {e}", proxy.name()));
                }
            }
        }

        Err(ScratcherError::FetchFailed {
            attempts: errors.len(),
            details: errors.join(" | "),
        })
    }

    /// Run every proxy against `url` and report what each returned.
    pub async fn diagnose(&self, url: &str) -> Result<Vec<ProxyReport>, ScratcherError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ScratcherError::InvalidUrl("no URL given".into()));
        }
        Url::parse(url).map_err(|e| ScratcherError::InvalidUrl(format!("{url}: {e}")))?;

        let mut reports = Vec::with_capacity(self.proxies.len());
        for &proxy in &self.proxies {
            let proxy_url = proxy.build_url(url);
            let start = Instant::now();
            let result = self.transport.get(&proxy_url).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let report = match result {
                Ok(resp) => {
                    let relayed = proxy.inspect_body(&resp.body);
                    ProxyReport {
                        name: proxy.name().to_string(),
                        proxy_url,
                        status: Some(resp.status),
                        ok: resp.is_success(),
                        duration_ms,
                        content_type: resp.content_type,
                        snippet: Some(snippet(&relayed.content)),
                        warning: relayed.warning,
                        error: None,
                    }
                }
                Err(e) => ProxyReport {
                    name: proxy.name().to_string(),
                    proxy_url,
                    status: None,
                    ok: false,
                    duration_ms,
                    content_type: None,
                    snippet: None,
                    warning: None,
                    error: Some(e.to_string()),
                },
            };

            debug!(proxy = %proxy, status = ?report.status, ok = report.ok, "Proxy diagnosed");
            reports.push(report);
        }

        Ok(reports)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
