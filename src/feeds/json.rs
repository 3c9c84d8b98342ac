//! Structured game feeds.
//!
//! Feeds disagree on field names (`prize` / `prizeAmount` / `label`,
//! `remaining` / `prizesRemaining`, ...) and on whether values arrive as
//! numbers or display strings. Serde aliases absorb the naming; `FlexValue`
//! absorbs the typing. Documents may be a bare array of games or an object
//! wrapping one under `games`, `data` or `scratchers`.
//!
//! Games are decoded one at a time: a record that still fails to decode is
//! skipped with a warning and the rest of the feed survives.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::comparator::GameListing;
use crate::numeric::{format_number, parse_currency_or_count, parse_odds_value};
use crate::types::{EstimateInput, EstimateOptions, PrizeTierInput, ScratcherError};

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// A value some feeds send as a number and others as display text.
/// Anything else (booleans, objects, arrays) lands in `Other` and reads as
/// missing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlexValue {
    Number(f64),
    Text(String),
    Other(Value),
}

impl FlexValue {
    /// Count or currency amount; text goes through the lenient parser.
    pub fn as_amount(&self) -> f64 {
        match self {
            FlexValue::Number(n) if n.is_finite() && *n > 0.0 => *n,
            FlexValue::Number(_) | FlexValue::Other(_) => 0.0,
            FlexValue::Text(s) => parse_currency_or_count(s),
        }
    }

    /// Amount that may legitimately be negative (published EV).
    pub fn as_signed_amount(&self) -> Option<f64> {
        match self {
            FlexValue::Number(n) => Some(*n).filter(|v| v.is_finite()),
            FlexValue::Text(s) => {
                if !s.chars().any(|c| c.is_ascii_digit()) {
                    return None;
                }
                let magnitude = parse_currency_or_count(s);
                let negative = s.trim_start().starts_with('-') || s.contains("-$");
                Some(if negative { -magnitude } else { magnitude })
            }
            FlexValue::Other(_) => None,
        }
    }

    /// "1 in N" text; bare numbers are taken as N.
    pub fn as_odds_text(&self) -> String {
        match self {
            FlexValue::Number(n) => format!("1 in {n}"),
            FlexValue::Text(s) => s.clone(),
            FlexValue::Other(_) => String::new(),
        }
    }

    /// Prize label; bare numbers become dollar amounts.
    pub fn as_label(&self) -> String {
        match self {
            FlexValue::Number(n) => format!("${}", format_number(*n)),
            FlexValue::Text(s) => s.trim().to_string(),
            FlexValue::Other(_) => String::new(),
        }
    }

    /// Identifier text; whole numbers print without a fraction.
    pub fn as_identifier(&self) -> String {
        match self {
            FlexValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            FlexValue::Number(n) => n.to_string(),
            FlexValue::Text(s) => s.trim().to_string(),
            FlexValue::Other(_) => String::new(),
        }
    }

    /// N of a "1 in N" figure; `None` when absent or unusable.
    pub fn as_odds_value(&self) -> Option<f64> {
        let n = match self {
            FlexValue::Number(n) => *n,
            FlexValue::Text(s) => parse_odds_value(s),
            FlexValue::Other(_) => 0.0,
        };
        Some(n).filter(|n| n.is_finite() && *n > 0.0)
    }
}

/// One prize row of a feed game.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedTier {
    #[serde(
        default,
        alias = "prize",
        alias = "prizeAmount",
        alias = "prize_amount"
    )]
    pub label: Option<FlexValue>,
    #[serde(default, alias = "oddsText", alias = "odds_text")]
    pub odds: Option<FlexValue>,
    #[serde(
        default,
        alias = "prizesRemaining",
        alias = "prizes_remaining",
        alias = "remainingCount",
        alias = "remaining_count",
        alias = "unclaimed"
    )]
    pub remaining: Option<FlexValue>,
    #[serde(
        default,
        alias = "totalPrizes",
        alias = "total_prizes",
        alias = "totalCount",
        alias = "total_count",
        alias = "initial",
        alias = "printed"
    )]
    pub total: Option<FlexValue>,
}

impl FeedTier {
    fn to_input(&self) -> PrizeTierInput {
        let amount = |v: &Option<FlexValue>| v.as_ref().map(FlexValue::as_amount).unwrap_or(0.0);
        PrizeTierInput {
            label: self.label.as_ref().map(FlexValue::as_label).unwrap_or_default(),
            odds_text: self.odds.as_ref().map(FlexValue::as_odds_text).unwrap_or_default(),
            remaining: amount(&self.remaining),
            total: amount(&self.total),
        }
    }
}

/// One game record of a feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedGame {
    #[serde(default, alias = "gameName", alias = "game_name")]
    pub name: Option<FlexValue>,
    #[serde(default, alias = "gameNumber", alias = "gameId", alias = "game_id")]
    pub game_number: Option<FlexValue>,
    #[serde(
        default,
        alias = "ticketPrice",
        alias = "ticket_price",
        alias = "ticketCost",
        alias = "ticket_cost",
        alias = "cost"
    )]
    pub price: Option<FlexValue>,
    #[serde(
        default,
        alias = "prizeTiers",
        alias = "prize_tiers",
        alias = "prizes",
        alias = "prizeTable"
    )]
    pub tiers: Option<Vec<FeedTier>>,
    #[serde(
        default,
        alias = "cashOdds",
        alias = "cash_odds",
        alias = "claimedCashOdds"
    )]
    pub claimed_cash_odds: Option<FlexValue>,
    #[serde(default, alias = "overallOdds", alias = "overall_odds")]
    pub claimed_overall_odds: Option<FlexValue>,
    #[serde(
        default,
        alias = "expectedValue",
        alias = "expected_value",
        alias = "ev"
    )]
    pub claimed_expected_value: Option<FlexValue>,
    #[serde(default, alias = "link", alias = "detailUrl")]
    pub url: Option<FlexValue>,
}

impl FeedGame {
    /// Normalize into the comparator's listing shape.
    pub fn into_listing(self, options: EstimateOptions) -> GameListing {
        GameListing {
            name: self
                .name
                .as_ref()
                .map(|n| n.as_identifier().split_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unknown scratcher".to_string()),
            game_number: self
                .game_number
                .as_ref()
                .map(FlexValue::as_identifier)
                .filter(|n| !n.is_empty()),
            url: self
                .url
                .as_ref()
                .map(FlexValue::as_identifier)
                .filter(|u| !u.is_empty()),
            input: EstimateInput {
                ticket_cost: self.price.as_ref().map(FlexValue::as_amount).unwrap_or(0.0),
                prize_tiers: self
                    .tiers
                    .iter()
                    .flatten()
                    .map(FeedTier::to_input)
                    .collect(),
                options,
            },
            claimed_cash_odds: self.claimed_cash_odds.as_ref().and_then(FlexValue::as_odds_value),
            claimed_overall_odds: self
                .claimed_overall_odds
                .as_ref()
                .and_then(FlexValue::as_odds_value),
            claimed_expected_value: self
                .claimed_expected_value
                .as_ref()
                .and_then(FlexValue::as_signed_amount),
        }
    }
}

/// Keys a wrapper object may hold its games under, in lookup order.
const WRAPPER_KEYS: &[&str] = &["games", "data", "scratchers"];

fn game_records(doc: Value) -> Option<Vec<Value>> {
    match doc {
        Value::Array(games) => Some(games),
        Value::Object(mut map) => WRAPPER_KEYS.iter().find_map(|key| match map.remove(*key) {
            Some(Value::Array(games)) => Some(games),
            _ => None,
        }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse a feed document into listings, applying `options` to every game.
///
/// Fails only when the document is not JSON or holds no games array.
/// Individual records that don't decode are skipped.
pub fn parse_feed(json: &str, options: EstimateOptions) -> Result<Vec<GameListing>, ScratcherError> {
    let doc: Value = serde_json::from_str(json)
        .map_err(|e| ScratcherError::Feed(format!("unrecognized game feed: {e}")))?;

    let records = game_records(doc).ok_or_else(|| {
        ScratcherError::Feed(
            "unrecognized game feed: expected an array of games or an object with `games`, `data` or `scratchers`".into(),
        )
    })?;

    let total = records.len();
    let listings: Vec<GameListing> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<FeedGame>(record) {
            Ok(game) => Some(game.into_listing(options)),
            Err(e) => {
                warn!(index, error = %e, "Skipping undecodable game record");
                None
            }
        })
        .collect();

    debug!(games = listings.len(), skipped = total - listings.len(), "Game feed parsed");
    Ok(listings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
