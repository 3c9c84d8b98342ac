//! Shared types for the scratcher EV estimator.
//!
//! The wire contracts (`EstimateInput` / `EstimateOutput`) are what the
//! acquisition and rendering collaborators exchange with the estimator.
//! `TicketContext` is the normalized, immutable view the estimator
//! actually computes over.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::numeric::{self, format_currency, format_number};

// ---------------------------------------------------------------------------
// Estimator input
// ---------------------------------------------------------------------------

/// Toggles applied to a single computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateOptions {
    /// When false, prizes worth more than $0 and under $500 add nothing to EV.
    #[serde(default = "default_true")]
    pub include_small_prizes: bool,
    /// Withhold `tax_rate_percent` from every cash prize.
    #[serde(default)]
    pub apply_tax: bool,
    /// Tax rate as a percentage (0–100).
    #[serde(default)]
    pub tax_rate_percent: f64,
}

fn default_true() -> bool {
    true
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            include_small_prizes: true,
            apply_tax: false,
            tax_rate_percent: 0.0,
        }
    }
}

impl EstimateOptions {
    /// Tax rate as a fraction. Out-of-range and non-finite percentages are
    /// clamped into 0–100 first.
    pub fn tax_rate(&self) -> f64 {
        if !self.tax_rate_percent.is_finite() {
            return 0.0;
        }
        self.tax_rate_percent.clamp(0.0, 100.0) / 100.0
    }
}

/// One row of a ticket's prize table, as handed over by a feed adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeTierInput {
    pub label: String,
    #[serde(default)]
    pub odds_text: String,
    #[serde(default)]
    pub remaining: f64,
    #[serde(default)]
    pub total: f64,
}

impl PrizeTierInput {
    pub fn new(label: &str, odds_text: &str, remaining: f64, total: f64) -> Self {
        Self {
            label: label.to_string(),
            odds_text: odds_text.to_string(),
            remaining,
            total,
        }
    }
}

/// Everything one estimate needs: a price, a prize table and the toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateInput {
    pub ticket_cost: f64,
    #[serde(default)]
    pub prize_tiers: Vec<PrizeTierInput>,
    #[serde(default)]
    pub options: EstimateOptions,
}

impl EstimateInput {
    /// The built-in $5 example ticket.
    pub fn example() -> Self {
        Self {
            ticket_cost: 5.0,
            prize_tiers: vec![
                PrizeTierInput::new("Ticket", "1 in 6.00", 1200.0, 3000.0),
                PrizeTierInput::new("$10", "1 in 12.00", 600.0, 1500.0),
                PrizeTierInput::new("$25", "1 in 60.00", 110.0, 300.0),
                PrizeTierInput::new("$50", "1 in 250.00", 30.0, 90.0),
                PrizeTierInput::new("$500", "1 in 2000.00", 4.0, 12.0),
                PrizeTierInput::new("$10,000", "1 in 20000.00", 1.0, 3.0),
            ],
            options: EstimateOptions::default(),
        }
    }

    /// Same ticket, different toggles.
    pub fn with_options(mut self, options: EstimateOptions) -> Self {
        self.options = options;
        self
    }
}

// ---------------------------------------------------------------------------
// Normalized context
// ---------------------------------------------------------------------------

/// A prize tier with its numeric fields resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PrizeTier {
    pub label: String,
    pub odds_text: String,
    pub remaining_count: f64,
    pub total_count: f64,
    /// Cash value: the ticket price for free-ticket tiers, the parsed label otherwise.
    pub value: f64,
    /// N from "1 in N"; 0 means unknown.
    pub odds_value: f64,
    pub is_free_ticket: bool,
}

impl PrizeTier {
    /// Resolve a raw tier against the ticket price.
    pub fn resolve(raw: &PrizeTierInput, ticket_cost: f64) -> Self {
        let is_free_ticket = numeric::is_ticket_label(&raw.label);
        let value = if is_free_ticket {
            ticket_cost
        } else {
            numeric::parse_currency_or_count(&raw.label)
        };

        Self {
            label: raw.label.clone(),
            odds_text: raw.odds_text.clone(),
            remaining_count: numeric::non_negative(raw.remaining),
            total_count: numeric::non_negative(raw.total),
            value,
            odds_value: numeric::parse_odds_value(&raw.odds_text),
            is_free_ticket,
        }
    }
}

/// Immutable input to one estimator run. Built fresh per calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketContext {
    pub ticket_cost: f64,
    pub prize_tiers: Vec<PrizeTier>,
    pub options: EstimateOptions,
}

impl TicketContext {
    pub fn from_input(input: &EstimateInput) -> Self {
        let ticket_cost = numeric::non_negative(input.ticket_cost);
        Self {
            ticket_cost,
            prize_tiers: input
                .prize_tiers
                .iter()
                .map(|raw| PrizeTier::resolve(raw, ticket_cost))
                .collect(),
            options: input.options,
        }
    }
}

// ---------------------------------------------------------------------------
// Estimator output
// ---------------------------------------------------------------------------

/// How the remaining-ticket total was reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TotalsStrategy {
    /// Scaled from the free-ticket tier's printed count and odds.
    Anchor {
        #[serde(rename = "initialTotalTickets")]
        initial_total_tickets: f64,
        #[serde(rename = "remainingRatio")]
        remaining_ratio: f64,
    },
    /// Median of per-tier `remaining × odds` estimates.
    Median {
        /// Tiers that produced a nonzero estimate.
        #[serde(rename = "usableTiers")]
        usable_tiers: usize,
    },
}

impl fmt::Display for TotalsStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalsStrategy::Anchor {
                initial_total_tickets,
                remaining_ratio,
            } => write!(
                f,
                "anchor ({} printed × {:.4} remaining)",
                format_number(*initial_total_tickets),
                remaining_ratio
            ),
            TotalsStrategy::Median { usable_tiers } => {
                write!(f, "median of {usable_tiers} tier estimates")
            }
        }
    }
}

/// Per-tier arithmetic, exposed so the renderer can show its work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBreakdown {
    pub label: String,
    pub value: f64,
    pub odds_value: f64,
    pub remaining: f64,
    /// Prize is a replacement ticket rather than cash.
    pub free_ticket: bool,
    pub probability: f64,
    pub adjusted_value: f64,
    pub contribution: f64,
    #[serde(rename = "excludedUnder500")]
    pub excluded_under_500: bool,
    pub tax_applied: bool,
}

/// Result of one estimator run. Always produced, even on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateOutput {
    pub ticket_cost: f64,
    pub total_remaining_tickets: Option<f64>,
    pub gross_expected_value: Option<f64>,
    pub net_expected_value: Option<f64>,
    pub strategy: Option<TotalsStrategy>,
    pub tiers: Vec<TierBreakdown>,
    pub options: EstimateOptions,
    pub failure_reason: Option<String>,
}

impl EstimateOutput {
    /// Whether a remaining-ticket total could be reconstructed.
    pub fn is_estimated(&self) -> bool {
        self.failure_reason.is_none() && self.total_remaining_tickets.is_some()
    }
}

impl fmt::Display for EstimateOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.failure_reason, self.net_expected_value) {
            (Some(reason), _) => write!(f, "EV unavailable: {reason}"),
            (None, Some(net)) => write!(
                f,
                "EV net={} gross={} cost={} | tickets={} via {}",
                format_currency(net),
                format_currency(self.gross_expected_value.unwrap_or(0.0)),
                format_currency(self.ticket_cost),
                format_number(self.total_remaining_tickets.unwrap_or(0.0)),
                self.strategy
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".into()),
            ),
            (None, None) => write!(f, "EV unavailable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum ScratcherError {
    #[error("Cannot estimate ticket totals: no usable free-ticket tier and no tier with both odds and remaining counts")]
    CannotEstimateTotals,

    #[error("Fetch failed. Tried {attempts} proxies. {details}")]
    FetchFailed { attempts: usize, details: String },

    #[error("HTTP {0}")]
    Http(u16),

    #[error("{0}")]
    EmptyContent(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
