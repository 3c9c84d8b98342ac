//! Calculated vs claimed odds and EV, for a listing of many games.
//!
//! Each game runs through the same estimator with its own prize table;
//! the results sit next to whatever odds/EV the game publisher claims.
//! Cash odds count cash prizes only. Overall odds also count free-ticket
//! prizes.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, info};

use crate::estimator;
use crate::numeric::{format_currency, format_number};
use crate::types::{EstimateInput, EstimateOutput};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One game from a structured feed, already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameListing {
    pub name: String,
    pub game_number: Option<String>,
    pub url: Option<String>,
    pub input: EstimateInput,
    /// Published "1 in N" cash odds, as N.
    pub claimed_cash_odds: Option<f64>,
    /// Published "1 in N" overall odds, as N.
    pub claimed_overall_odds: Option<f64>,
    /// Published expected value, if any.
    pub claimed_expected_value: Option<f64>,
}

impl GameListing {
    pub fn price(&self) -> f64 {
        self.input.ticket_cost
    }

    /// Name with the game number appended, when known.
    pub fn display_name(&self) -> String {
        match &self.game_number {
            Some(n) if !n.is_empty() => format!("{} ({n})", self.name),
            _ => self.name.clone(),
        }
    }
}

/// Side-by-side result for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameComparison {
    pub name: String,
    pub game_number: Option<String>,
    pub url: Option<String>,
    pub price: f64,
    pub estimate: EstimateOutput,
    /// Remaining prizes of every tier, free tickets included.
    pub remaining_winning_prizes: f64,
    /// Remaining prizes of cash tiers only.
    pub remaining_cash_prizes: f64,
    pub calculated_cash_odds: Option<f64>,
    pub claimed_cash_odds: Option<f64>,
    pub cash_odds_delta: Option<f64>,
    pub calculated_overall_odds: Option<f64>,
    pub claimed_overall_odds: Option<f64>,
    pub overall_odds_delta: Option<f64>,
    pub claimed_expected_value: Option<f64>,
    pub expected_value_delta: Option<f64>,
}

impl fmt::Display for GameComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let odds = |v: Option<f64>| {
            v.map(|n| format!("1 in {}", format_number(n)))
                .unwrap_or_else(|| "—".into())
        };
        let money = |v: Option<f64>| v.map(format_currency).unwrap_or_else(|| "—".into());

        write!(
            f,
            "{} {} | cash odds {} vs claimed {} ({}) | overall odds {} vs claimed {} ({}) | EV {} vs claimed {} ({})",
            format_currency(self.price),
            self.name,
            odds(self.calculated_cash_odds),
            odds(self.claimed_cash_odds),
            format_delta(self.cash_odds_delta),
            odds(self.calculated_overall_odds),
            odds(self.claimed_overall_odds),
            format_delta(self.overall_odds_delta),
            money(self.estimate.net_expected_value),
            money(self.claimed_expected_value),
            format_delta(self.expected_value_delta),
        )
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// `(calculated - claimed) / |claimed|`; `None` when claimed is 0 or
/// either side is non-finite.
pub fn relative_delta(calculated: f64, claimed: f64) -> Option<f64> {
    if !calculated.is_finite() || !claimed.is_finite() || claimed == 0.0 {
        return None;
    }
    Some((calculated - claimed) / claimed.abs())
}

fn optional_delta(calculated: Option<f64>, claimed: Option<f64>) -> Option<f64> {
    relative_delta(calculated?, claimed?)
}

/// Signed percentage, or a dash when the delta is undefined.
pub fn format_delta(delta: Option<f64>) -> String {
    match delta {
        Some(d) if d.is_finite() => format!("{:+.1}%", d * 100.0),
        _ => "—".to_string(),
    }
}

/// `total / prizes`, or `None` without a total or any prizes left.
fn odds_against(total_remaining_tickets: Option<f64>, prizes: f64) -> Option<f64> {
    match total_remaining_tickets {
        Some(total) if prizes > 0.0 => Some(total / prizes).filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Run the estimator for one game and line it up with the claimed figures.
pub fn compare_game(game: &GameListing) -> GameComparison {
    let estimate = estimator::estimate(&game.input);

    let remaining_winning_prizes: f64 = estimate.tiers.iter().map(|t| t.remaining).sum();
    let remaining_cash_prizes: f64 = estimate
        .tiers
        .iter()
        .filter(|t| !t.free_ticket)
        .map(|t| t.remaining)
        .sum();

    let calculated_cash_odds = odds_against(estimate.total_remaining_tickets, remaining_cash_prizes);
    let calculated_overall_odds =
        odds_against(estimate.total_remaining_tickets, remaining_winning_prizes);

    let cash_odds_delta = optional_delta(calculated_cash_odds, game.claimed_cash_odds);
    let overall_odds_delta = optional_delta(calculated_overall_odds, game.claimed_overall_odds);
    let expected_value_delta =
        optional_delta(estimate.net_expected_value, game.claimed_expected_value);

    debug!(
        game = %game.name,
        remaining_winning_prizes,
        remaining_cash_prizes,
        calculated_cash_odds = ?calculated_cash_odds,
        claimed_cash_odds = ?game.claimed_cash_odds,
        "Game compared"
    );

    GameComparison {
        name: game.display_name(),
        game_number: game.game_number.clone(),
        url: game.url.clone(),
        price: game.price(),
        estimate,
        remaining_winning_prizes,
        remaining_cash_prizes,
        calculated_cash_odds,
        claimed_cash_odds: game.claimed_cash_odds,
        cash_odds_delta,
        calculated_overall_odds,
        claimed_overall_odds: game.claimed_overall_odds,
        overall_odds_delta,
        claimed_expected_value: game.claimed_expected_value,
        expected_value_delta,
    }
}

/// Compare every game, ordered by price then name.
pub fn compare_games(games: &[GameListing]) -> Vec<GameComparison> {
    let mut out: Vec<GameComparison> = games.iter().map(compare_game).collect();
    out.sort_by(|a, b| by_price_then_name(a.price, &a.name, b.price, &b.name));

    let estimated = out.iter().filter(|c| c.estimate.is_estimated()).count();
    info!(games = out.len(), estimated, "Listing comparison complete");

    out
}

/// Listing order: cheaper tickets first, then alphabetical ignoring case.
pub fn by_price_then_name(price_a: f64, name_a: &str, price_b: f64, name_b: &str) -> Ordering {
    price_a
        .total_cmp(&price_b)
        .then_with(|| name_a.to_lowercase().cmp(&name_b.to_lowercase()))
        .then_with(|| name_a.cmp(name_b))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
