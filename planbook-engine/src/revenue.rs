//! Revenue annualization.
//!
//! Each line annualizes independently of every other line:
//! - Recurring lines are monthly run rates, annualized at ×12;
//!   Services and One-time lines are entered as annual totals.
//! - Existing recurring business nets churn out and upsell in,
//!   compounding multiplicatively.
//! - Pipeline deals are weighted by their win probability.
//! - Existing non-recurring business passes through unadjusted.
//!
//! Percentage inputs are validated to [0, 100] at the ingestion points
//! (CSV loaders, the bridge's field edits) before a line reaches these
//! functions, which keeps every result non-negative.

use crate::calendar::MONTHS_PER_YEAR;
use crate::types::{DealStage, RevenueKind, RevenueLine};

/// Undiscounted annual figure: volume × price, annualized by cadence.
pub fn base_revenue(line: &RevenueLine) -> f64 {
    let cadence = match line.kind {
        RevenueKind::Recurring => MONTHS_PER_YEAR,
        RevenueKind::Services | RevenueKind::OneTime => 1.0,
    };
    line.units * line.unit_price * cadence
}

/// Annualized revenue for one line after stage adjustments.
pub fn annual_revenue(line: &RevenueLine) -> f64 {
    let base = base_revenue(line);
    match (&line.stage, line.kind) {
        (DealStage::Existing { retention }, RevenueKind::Recurring) => {
            // Churn and upsell compound multiplicatively: 10% churn with
            // 10% upsell nets slightly below flat, not exactly flat.
            base * (1.0 - retention.churn_pct / 100.0) * (1.0 + retention.upsell_pct / 100.0)
        }
        (DealStage::Pipeline { win_probability_pct }, _) => {
            base * win_probability_pct / 100.0
        }
        // Existing services and one-time contracts are already final figures.
        (DealStage::Existing { .. }, _) => base,
    }
}

/// Sum of `annual_revenue` over the whole ledger.
pub fn total_revenue(lines: &[RevenueLine]) -> f64 {
    lines.iter().map(annual_revenue).sum()
}
