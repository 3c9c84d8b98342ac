//! Prize value adjustments applied before probability weighting.
//!
//! Small-prize exclusion runs first, tax second, so an excluded tier
//! stays at 0 and is never reported as taxed.

use crate::types::{EstimateOptions, PrizeTier};

/// Prizes strictly below this value count as "small".
pub const SMALL_PRIZE_THRESHOLD: f64 = 500.0;

/// A tier's value after the toggles have been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustedValue {
    pub value: f64,
    pub excluded_under_500: bool,
    pub tax_applied: bool,
}

/// Apply small-prize exclusion and then tax to a tier's base value.
///
/// Free-ticket tiers are exempt from tax: the prize is a replacement
/// ticket, not cash. They can still be excluded as a small prize.
pub fn adjust_value(tier: &PrizeTier, options: &EstimateOptions) -> AdjustedValue {
    let excluded_under_500 = !options.include_small_prizes
        && tier.value > 0.0
        && tier.value < SMALL_PRIZE_THRESHOLD;

    let mut value = if excluded_under_500 { 0.0 } else { tier.value };

    let tax_applied = options.apply_tax && value > 0.0 && !tier.is_free_ticket;
    if tax_applied {
        value *= 1.0 - options.tax_rate();
    }

    AdjustedValue {
        value,
        excluded_under_500,
        tax_applied,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
