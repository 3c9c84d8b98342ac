//! The public CORS proxies, in fallback order.

use serde::Deserialize;
use std::fmt;

/// A CORS proxy able to relay an arbitrary public URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Proxy {
    /// Returns the target body untouched.
    AllOriginsRaw,
    /// Wraps the target body in a JSON envelope.
    AllOriginsGet,
    /// Reader service addressed by path.
    JinaReader,
}

impl Proxy {
    /// Every proxy, in the order they are tried.
    pub const ALL: &'static [Proxy] = &[Proxy::AllOriginsRaw, Proxy::AllOriginsGet, Proxy::JinaReader];

    pub fn name(&self) -> &'static str {
        match self {
            Proxy::AllOriginsRaw => "allorigins raw",
            Proxy::AllOriginsGet => "allorigins get",
            Proxy::JinaReader => "r.jina.ai",
        }
    }

    /// URL that fetches `target` through this proxy.
    pub fn build_url(&self, target: &str) -> String {
        match self {
            Proxy::AllOriginsRaw => format!(
                "https://api.allorigins.win/raw?url={}",
                urlencoding::encode(target)
            ),
            Proxy::AllOriginsGet => format!(
                "https://api.allorigins.win/get?url={}",
                urlencoding::encode(target)
            ),
            Proxy::JinaReader => {
                let bare = target
                    .strip_prefix("https://")
                    .or_else(|| target.strip_prefix("http://"))
                    .unwrap_or(target);
                format!("https://r.jina.ai/http://{bare}")
            }
        }
    }

    /// Pull the relayed page out of a proxy response body. An envelope
    /// that isn't JSON relays nothing.
    pub fn unwrap_body(&self, body: &str) -> ProxyContent {
        self.relay(body, false)
    }

    /// Like `unwrap_body`, but an envelope that isn't JSON is shown as
    /// the raw body so diagnostics can tell what the proxy sent.
    pub fn inspect_body(&self, body: &str) -> ProxyContent {
        self.relay(body, true)
    }

    fn relay(&self, body: &str, keep_raw: bool) -> ProxyContent {
        match self {
            Proxy::AllOriginsGet => unwrap_envelope(body, keep_raw),
            Proxy::AllOriginsRaw | Proxy::JinaReader => ProxyContent {
                content: body.to_string(),
                warning: None,
            },
        }
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Relayed page plus anything worth flagging about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyContent {
    pub content: String,
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    contents: Option<String>,
    #[serde(default)]
    status: Option<EnvelopeStatus>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeStatus {
    #[serde(default)]
    http_code: Option<u16>,
}

fn unwrap_envelope(body: &str, keep_raw: bool) -> ProxyContent {
    match serde_json::from_str::<Envelope>(body) {
        Ok(env) => ProxyContent {
            content: env.contents.unwrap_or_default(),
            warning: env
                .status
                .and_then(|s| s.http_code)
                .filter(|code| *code != 0)
                .map(|code| format!("HTTP {code}")),
        },
        Err(e) => ProxyContent {
            content: if keep_raw { body.to_string() } else { String::new() },
            warning: Some(format!("JSON parse error: {e}")),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "https://www.calottery.com/en/scratchers?x=1&y=2";

    #[test]
    fn test_order_and_names() {
        let names: Vec<&str> = Proxy::ALL.iter().map(Proxy::name).collect();
        assert_eq!(names, vec!["allorigins raw", "allorigins get", "r.jina.ai"]);
    }

    #[test]
    fn test_allorigins_urls_encode_target() {
        assert_eq!(
            Proxy::AllOriginsRaw.build_url(TARGET),
            "https://api.allorigins.win/raw?url=https%3A%2F%2Fwww.calottery.com%2Fen%2Fscratchers%3Fx%3D1%26y%3D2"
        );
        assert!(Proxy::AllOriginsGet
            .build_url(TARGET)
            .starts_with("https://api.allorigins.win/get?url=https%3A%2F%2F"));
    }

    #[test]
    fn test_jina_url_drops_scheme() {
        assert_eq!(
            Proxy::JinaReader.build_url("https://example.com/a"),
            "https://r.jina.ai/http://example.com/a"
        );
        assert_eq!(
            Proxy::JinaReader.build_url("http://example.com/a"),
            "https://r.jina.ai/http://example.com/a"
        );
    }

    #[test]
    fn test_envelope_contents_and_status() {
        let body = r#"{"contents": "<html>ok</html>", "status": {"http_code": 200, "url": "x"}}"#;
        let c = Proxy::AllOriginsGet.unwrap_body(body);
        assert_eq!(c.content, "<html>ok</html>");
        assert_eq!(c.warning.as_deref(), Some("HTTP 200"));
    }

    #[test]
    fn test_envelope_without_status() {
        let c = Proxy::AllOriginsGet.unwrap_body(r#"{"contents": "x"}"#);
        assert_eq!(c.content, "x");
        assert!(c.warning.is_none());
    }

    #[test]
    fn test_envelope_parse_error() {
        let c = Proxy::AllOriginsGet.unwrap_body("<html>not json</html>");
        assert!(c.content.is_empty());
        assert!(c.warning.unwrap().starts_with("JSON parse error:"));
    }

    #[test]
    fn test_inspect_keeps_raw_body_of_bad_envelope() {
        let c = Proxy::AllOriginsGet.inspect_body("<html>rate limited</html>");
        assert_eq!(c.content, "<html>rate limited</html>");
        assert!(c.warning.unwrap().starts_with("JSON parse error:"));

        let ok = Proxy::AllOriginsGet.inspect_body(r#"{"contents": "x"}"#);
        assert_eq!(ok, Proxy::AllOriginsGet.unwrap_body(r#"{"contents": "x"}"#));
    }

    #[test]
    fn test_raw_proxies_pass_through() {
        let c = Proxy::JinaReader.unwrap_body("plain text");
        assert_eq!(c.content, "plain text");
        assert!(c.warning.is_none());
    }
}
