//! Detail-page rows.
//!
//! The page scraper hands over text cells exactly as displayed ("$5",
//! "1 in 4.12", "1,200"). This adapter resolves them into numbers.

use serde::{Deserialize, Serialize};

use crate::comparator::GameListing;
use crate::numeric::{parse_currency_or_count, parse_odds_value};
use crate::types::{EstimateInput, EstimateOptions, PrizeTierInput};

/// One prize-table row as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    pub prize: String,
    pub odds: String,
    pub remaining: String,
    pub initial: String,
}

impl DetailRow {
    pub fn new(prize: &str, odds: &str, remaining: &str, initial: &str) -> Self {
        Self {
            prize: prize.to_string(),
            odds: odds.to_string(),
            remaining: remaining.to_string(),
            initial: initial.to_string(),
        }
    }
}

/// Text fields scraped from one ticket's detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPage {
    pub name: String,
    pub cost: String,
    pub game_number: String,
    pub overall_odds: String,
    pub cash_odds: String,
    pub rows: Vec<DetailRow>,
}

impl DetailPage {
    pub fn ticket_cost(&self) -> f64 {
        parse_currency_or_count(&self.cost)
    }

    /// N from the published cash odds; `None` when absent.
    pub fn claimed_cash_odds(&self) -> Option<f64> {
        Some(parse_odds_value(&self.cash_odds)).filter(|n| *n > 0.0)
    }

    /// N from the published overall odds; `None` when absent.
    pub fn claimed_overall_odds(&self) -> Option<f64> {
        Some(parse_odds_value(&self.overall_odds)).filter(|n| *n > 0.0)
    }

    /// Rows up to the first one without a prize cell.
    pub fn prize_rows(&self) -> impl Iterator<Item = &DetailRow> {
        self.rows.iter().take_while(|r| !r.prize.trim().is_empty())
    }

    pub fn to_input(&self, options: EstimateOptions) -> EstimateInput {
        EstimateInput {
            ticket_cost: self.ticket_cost(),
            prize_tiers: self
                .prize_rows()
                .map(|r| PrizeTierInput {
                    label: r.prize.trim().to_string(),
                    odds_text: r.odds.trim().to_string(),
                    remaining: parse_currency_or_count(&r.remaining),
                    total: parse_currency_or_count(&r.initial),
                })
                .collect(),
            options,
        }
    }

    /// Normalize into the comparator's listing shape.
    pub fn into_listing(self, url: Option<String>, options: EstimateOptions) -> GameListing {
        let input = self.to_input(options);
        let claimed_cash_odds = self.claimed_cash_odds();
        let claimed_overall_odds = self.claimed_overall_odds();
        let game_number = Some(self.game_number.trim().to_string()).filter(|n| !n.is_empty());
        let name = self.name.split_whitespace().collect::<Vec<_>>().join(" ");

        GameListing {
            name,
            game_number,
            url,
            input,
            claimed_cash_odds,
            claimed_overall_odds,
            claimed_expected_value: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
