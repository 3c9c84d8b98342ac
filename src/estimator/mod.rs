//! EV estimator: ticket-total reconstruction, value adjustment and
//! probability-weighted aggregation.
//!
//! A pure function of one `TicketContext`: no I/O, no shared state.
//! It never fails past its own boundary; when totals cannot be
//! reconstructed the output carries a `failure_reason` instead.

pub mod adjust;
pub mod totals;

use tracing::{debug, info, warn};

use crate::numeric::{format_currency, format_number};
use crate::types::{EstimateInput, EstimateOutput, ScratcherError, TicketContext, TierBreakdown};
use adjust::adjust_value;

/// Estimate EV for a raw input.
pub fn estimate(input: &EstimateInput) -> EstimateOutput {
    estimate_context(&TicketContext::from_input(input))
}

/// Estimate EV for an already-normalized context.
///
/// Steps:
/// 1. Reconstruct the remaining-ticket pool (anchor, then median).
/// 2. Adjust each tier's value (small-prize exclusion, then tax).
/// 3. Weight each adjusted value by `remaining / total_remaining_tickets`.
/// 4. Sum contributions into gross EV and subtract the ticket price.
pub fn estimate_context(ctx: &TicketContext) -> EstimateOutput {
    let totals = totals::reconstruct(&ctx.prize_tiers);
    let denominator = totals.map(|t| t.total_remaining_tickets).unwrap_or(0.0);

    let tiers: Vec<TierBreakdown> = ctx
        .prize_tiers
        .iter()
        .map(|tier| {
            let adjusted = adjust_value(tier, &ctx.options);
            let probability = win_probability(tier.remaining_count, denominator);
            let contribution = probability * adjusted.value;

            debug!(
                label = %tier.label,
                value = tier.value,
                adjusted = adjusted.value,
                probability,
                contribution,
                "Tier weighed"
            );

            TierBreakdown {
                label: tier.label.clone(),
                value: tier.value,
                odds_value: tier.odds_value,
                remaining: tier.remaining_count,
                free_ticket: tier.is_free_ticket,
                probability,
                adjusted_value: adjusted.value,
                contribution,
                excluded_under_500: adjusted.excluded_under_500,
                tax_applied: adjusted.tax_applied,
            }
        })
        .collect();

    let Some(totals) = totals else {
        let reason = ScratcherError::CannotEstimateTotals.to_string();
        warn!(tiers = tiers.len(), reason = %reason, "Estimate failed");
        return EstimateOutput {
            ticket_cost: ctx.ticket_cost,
            total_remaining_tickets: None,
            gross_expected_value: None,
            net_expected_value: None,
            strategy: None,
            tiers,
            options: ctx.options,
            failure_reason: Some(reason),
        };
    };

    let gross: f64 = tiers.iter().map(|t| t.contribution).sum();
    let net = gross - ctx.ticket_cost;

    info!(
        total_remaining_tickets = totals.total_remaining_tickets,
        strategy = %totals.strategy,
        gross = format!("${gross:.4}"),
        net = format!("${net:.4}"),
        "Estimate complete"
    );

    EstimateOutput {
        ticket_cost: ctx.ticket_cost,
        total_remaining_tickets: Some(totals.total_remaining_tickets),
        gross_expected_value: Some(gross),
        net_expected_value: Some(net),
        strategy: Some(totals.strategy),
        tiers,
        options: ctx.options,
        failure_reason: None,
    }
}

/// `remaining / total`, clamped to [0, 1]; 0 for an unusable denominator.
pub fn win_probability(remaining: f64, total_remaining_tickets: f64) -> f64 {
    if !total_remaining_tickets.is_finite() || total_remaining_tickets <= 0.0 {
        return 0.0;
    }
    let p = remaining / total_remaining_tickets;
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

impl EstimateOutput {
    /// Multi-line result block for display.
    pub fn summary(&self, name: &str) -> String {
        let ev = self
            .net_expected_value
            .map(format_currency)
            .unwrap_or_else(|| "n/a".into());
        let tickets = self
            .total_remaining_tickets
            .map(format_number)
            .unwrap_or_else(|| "n/a".into());

        let mut out = format!(
            "Name: {name}\nTicket cost: {}\nExpected value: {ev}\nTotal remaining tickets: {tickets}",
            format_currency(self.ticket_cost),
        );
        if let Some(reason) = &self.failure_reason {
            out.push_str(&format!("\nError: {reason}"));
        }
        out
    }

    /// One-line description of the toggles behind this estimate.
    pub fn adjustments_text(&self) -> String {
        let small = if self.options.include_small_prizes {
            "include"
        } else {
            "exclude"
        };
        let tax = if self.options.apply_tax {
            format!("apply {}% tax", format_number(self.options.tax_rate() * 100.0))
        } else {
            "no tax applied".to_string()
        };
        format!("Adjustments: {small} prizes under $500; {tax}.")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
