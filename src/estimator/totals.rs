//! Remaining-ticket reconstruction.
//!
//! Two heuristics, tried in order:
//! 1. Anchor: the free-ticket tier's printed count × its odds estimates the
//!    original print run, scaled by that tier's unclaimed fraction.
//! 2. Median: each tier's `remaining × odds` is an independent estimate of
//!    the remaining pool; the median is robust to a few bad odds strings.
//!
//! The anchor result is accepted even when it disagrees with the median.

use tracing::debug;

use crate::numeric::median;
use crate::types::{PrizeTier, TotalsStrategy};

/// Reconstructed remaining-ticket total for one game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TicketTotals {
    pub total_remaining_tickets: f64,
    pub strategy: TotalsStrategy,
}

fn usable(total: f64) -> bool {
    total.is_finite() && total > 0.0
}

/// Reconstruct the remaining-ticket pool. `None` when neither strategy
/// yields a positive finite total.
pub fn reconstruct(tiers: &[PrizeTier]) -> Option<TicketTotals> {
    anchor_estimate(tiers).or_else(|| median_estimate(tiers))
}

/// Anchor strategy over the first free-ticket tier.
pub fn anchor_estimate(tiers: &[PrizeTier]) -> Option<TicketTotals> {
    let anchor = tiers.iter().find(|t| t.is_free_ticket)?;

    if anchor.total_count <= 0.0 || anchor.odds_value <= 0.0 {
        debug!(
            label = %anchor.label,
            total = anchor.total_count,
            odds = anchor.odds_value,
            "Free-ticket tier lacks total or odds, skipping anchor"
        );
        return None;
    }

    let initial_total_tickets = anchor.total_count * anchor.odds_value;
    let remaining_ratio = anchor.remaining_count / anchor.total_count;
    let total_remaining_tickets = initial_total_tickets * remaining_ratio;

    if !usable(total_remaining_tickets) {
        debug!(
            initial_total_tickets,
            remaining_ratio, "Anchor produced no remaining tickets"
        );
        return None;
    }

    debug!(
        label = %anchor.label,
        initial_total_tickets,
        remaining_ratio,
        total_remaining_tickets,
        "Totals from free-ticket anchor"
    );

    Some(TicketTotals {
        total_remaining_tickets,
        strategy: TotalsStrategy::Anchor {
            initial_total_tickets,
            remaining_ratio,
        },
    })
}

/// A single tier's view of the remaining pool: `remaining × odds`, or 0
/// when either side is unknown.
pub fn tier_estimate(tier: &PrizeTier) -> f64 {
    if tier.remaining_count > 0.0 && tier.odds_value > 0.0 {
        tier.remaining_count * tier.odds_value
    } else {
        0.0
    }
}

/// Median of every tier's estimate, zeros included.
pub fn median_estimate(tiers: &[PrizeTier]) -> Option<TicketTotals> {
    let estimates: Vec<f64> = tiers.iter().map(tier_estimate).collect();
    let total_remaining_tickets = median(&estimates);

    if !usable(total_remaining_tickets) {
        debug!(tiers = tiers.len(), "Median fallback produced no remaining tickets");
        return None;
    }

    let usable_tiers = estimates.iter().filter(|e| **e > 0.0).count();
    debug!(
        usable_tiers,
        total_remaining_tickets, "Totals from median of tier estimates"
    );

    Some(TicketTotals {
        total_remaining_tickets,
        strategy: TotalsStrategy::Median { usable_tiers },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
