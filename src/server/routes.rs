//! Estimate API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ServerState>` and is
//! read-only: every request carries or derives its own options.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::comparator::{compare_games, GameComparison};
use crate::estimator::estimate;
use crate::feeds::json::parse_feed;
use crate::types::{EstimateInput, EstimateOptions, EstimateOutput};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServerState {
    /// Options used when a request doesn't supply its own.
    pub defaults: EstimateOptions,
}

impl ServerState {
    pub fn new(defaults: EstimateOptions) -> Self {
        Self { defaults }
    }
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query string toggles for the example ticket. Missing fields fall back to
/// the server defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsQuery {
    pub include_small_prizes: Option<bool>,
    pub apply_tax: Option<bool>,
    pub tax_rate_percent: Option<f64>,
}

impl OptionsQuery {
    pub fn resolve(&self, defaults: EstimateOptions) -> EstimateOptions {
        EstimateOptions {
            include_small_prizes: self.include_small_prizes.unwrap_or(defaults.include_small_prizes),
            apply_tax: self.apply_tax.unwrap_or(defaults.apply_tax),
            tax_rate_percent: self.tax_rate_percent.unwrap_or(defaults.tax_rate_percent),
        }
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// POST /api/estimate
///
/// An estimate that can't reconstruct totals is still a 200; the body
/// carries `failureReason`.
pub async fn post_estimate(Json(input): Json<EstimateInput>) -> Json<EstimateOutput> {
    debug!(tiers = input.prize_tiers.len(), cost = input.ticket_cost, "Estimate requested");
    Json(estimate(&input))
}

/// POST /api/compare
///
/// Body is a game feed document; server defaults apply to every game.
pub async fn post_compare(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Vec<GameComparison>>, (StatusCode, String)> {
    let games = parse_feed(&body, state.defaults).map_err(|e| {
        warn!(error = %e, "Rejected game feed");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;
    Ok(Json(compare_games(&games)))
}

/// GET /api/example
pub async fn get_example(
    State(state): State<AppState>,
    Query(query): Query<OptionsQuery>,
) -> Json<EstimateOutput> {
    let options = query.resolve(state.defaults);
    Json(estimate(&EstimateInput::example().with_options(options)))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(defaults: EstimateOptions) -> AppState {
        Arc::new(ServerState::new(defaults))
    }

    #[test]
    fn test_query_falls_back_to_defaults() {
        let defaults = EstimateOptions {
            include_small_prizes: false,
            apply_tax: true,
            tax_rate_percent: 30.0,
        };
        let q = OptionsQuery {
            tax_rate_percent: Some(10.0),
            ..OptionsQuery::default()
        };
        let opts = q.resolve(defaults);
        assert!(!opts.include_small_prizes);
        assert!(opts.apply_tax);
        assert_eq!(opts.tax_rate_percent, 10.0);
    }

    #[tokio::test]
    async fn test_post_estimate_example() {
        let Json(out) = post_estimate(Json(EstimateInput::example())).await;
        assert!(out.is_estimated());
        assert!((out.total_remaining_tickets.unwrap() - 7200.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_get_example_uses_state_defaults() {
        let state = state_with(EstimateOptions {
            include_small_prizes: true,
            apply_tax: true,
            tax_rate_percent: 50.0,
        });
        let Json(out) = get_example(State(state), Query(OptionsQuery::default())).await;
        assert!(out.options.apply_tax);
        let ticket = out.tiers.iter().find(|t| t.label == "Ticket").unwrap();
        assert!(!ticket.tax_applied);
        let ten = out.tiers.iter().find(|t| t.label == "$10").unwrap();
        assert!((ten.adjusted_value - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_post_compare_rejects_garbage() {
        let state = state_with(EstimateOptions::default());
        let err = post_compare(State(state), "not json".into()).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1.contains("unrecognized game feed"));
    }
}
