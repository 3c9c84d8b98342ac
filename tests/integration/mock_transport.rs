//! Scripted transport for integration testing.
//!
//! Provides a deterministic `Transport` implementation that answers each
//! request from a table of URL prefixes, and records every URL it was
//! asked for. No network access.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use scratcher_ev::fetch::{RawResponse, Transport};

enum Reply {
    Response(RawResponse),
    Failure(String),
}

/// A transport whose answers are fully controllable from test code.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    routes: Arc<Mutex<Vec<(String, Reply)>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer URLs starting with `prefix` with `status` and `body`.
    pub fn respond(self, prefix: &str, status: u16, body: &str) -> Self {
        self.routes.lock().unwrap().push((
            prefix.to_string(),
            Reply::Response(RawResponse {
                status,
                content_type: Some("text/html; charset=utf-8".to_string()),
                body: body.to_string(),
            }),
        ));
        self
    }

    /// Fail URLs starting with `prefix` at the network level.
    pub fn fail(self, prefix: &str, msg: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((prefix.to_string(), Reply::Failure(msg.to_string())));
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(url.to_string());

        let routes = self.routes.lock().unwrap();
        match routes.iter().find(|(prefix, _)| url.starts_with(prefix.as_str())) {
            Some((_, Reply::Response(resp))) => Ok(resp.clone()),
            Some((_, Reply::Failure(msg))) => Err(anyhow!("{msg}")),
            None => Err(anyhow!("no scripted reply for {url}")),
        }
    }
}
