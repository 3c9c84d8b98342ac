//! Scratcher links on a listing page.
//!
//! Only anchors whose href contains `/scratchers/<price>` are kept. Price,
//! game number and a fallback name are read from the URL slug, e.g.
//! `/scratchers/$5/lucky-7s-1523` → `$5`, `1523`, `lucky 7s`.

use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

use crate::comparator::by_price_then_name;
use crate::numeric::parse_currency_or_count;
use crate::types::ScratcherError;

struct Patterns {
    anchor: Regex,
    href: Regex,
    scratcher_path: Regex,
    tag: Regex,
    state_word: Regex,
    game_number: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        anchor: Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("anchor pattern compiles"),
        href: Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("href pattern compiles"),
        scratcher_path: Regex::new(r"(?i)/scratchers/\$?([0-9]+)").expect("path pattern compiles"),
        tag: Regex::new(r"<[^>]*>").expect("tag pattern compiles"),
        state_word: Regex::new(r"(?i)\bca(?:lifornia)?\b").expect("state pattern compiles"),
        game_number: Regex::new(r"^\d{3,}$").expect("game number pattern compiles"),
    })
}

const UNKNOWN_PRICE: &str = "—";

/// Fields derivable from a scratcher URL alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    /// `"$<n>"`, or `"—"` when the URL carries no price.
    pub price: String,
    pub game_number: Option<String>,
    pub name_from_slug: String,
}

/// One scratcher found on a listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    pub price: String,
    pub name: String,
    pub url: String,
    pub game_number: Option<String>,
}

impl ListingEntry {
    pub fn price_value(&self) -> f64 {
        parse_currency_or_count(&self.price)
    }
}

fn normalize_name(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Read price, game number and a slug-derived name from a scratcher URL.
pub fn parse_game_info_from_url(url: &str) -> GameInfo {
    let p = patterns();

    let price = p
        .scratcher_path
        .captures(url)
        .map(|c| format!("${}", &c[1]))
        .unwrap_or_else(|| UNKNOWN_PRICE.to_string());

    let slug = url.split('/').filter(|s| !s.is_empty()).last().unwrap_or("");
    let mut parts: Vec<&str> = slug.split('-').collect();
    let game_number = parts
        .last()
        .filter(|last| p.game_number.is_match(last))
        .map(|last| last.to_string());
    if game_number.is_some() {
        parts.pop();
    }

    let name_from_slug = normalize_name(&p.state_word.replace_all(&parts.join(" "), ""));

    GameInfo {
        price,
        game_number,
        name_from_slug,
    }
}

/// Collect scratcher links from listing HTML, resolved against `base_url`
/// and de-duplicated by absolute URL (first occurrence wins).
pub fn extract_listing(html: &str, base_url: &str) -> Result<Vec<ListingEntry>, ScratcherError> {
    let base = Url::parse(base_url).map_err(|e| ScratcherError::InvalidUrl(format!("{base_url}: {e}")))?;
    let p = patterns();

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for caps in p.anchor.captures_iter(html) {
        let Some(href) = p
            .href
            .captures(&caps[1])
            .and_then(|h| h.get(1).or_else(|| h.get(2)))
            .map(|m| decode_entities(m.as_str()))
        else {
            continue;
        };
        if !href.contains("/scratchers/") || !p.scratcher_path.is_match(&href) {
            continue;
        }

        let Ok(absolute) = base.join(&href) else {
            debug!(href = %href, "Skipping unresolvable scratcher link");
            continue;
        };
        let absolute = absolute.to_string();
        if !seen.insert(absolute.clone()) {
            continue;
        }

        let info = parse_game_info_from_url(&absolute);
        let text = normalize_name(&decode_entities(&p.tag.replace_all(&caps[2], " ")));
        let name = [text, info.name_from_slug]
            .into_iter()
            .find(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown scratcher".to_string());
        let name = match &info.game_number {
            Some(n) => format!("{name} ({n})"),
            None => name,
        };

        entries.push(ListingEntry {
            price: info.price,
            name,
            url: absolute,
            game_number: info.game_number,
        });
    }

    debug!(entries = entries.len(), "Listing links extracted");
    Ok(entries)
}

/// Cheapest first, then alphabetical.
pub fn sort_listing(entries: &mut [ListingEntry]) {
    entries.sort_by(|a, b| by_price_then_name(a.price_value(), &a.name, b.price_value(), &b.name));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
