//! Ledger rollups and derived figures.
//!
//! Pure re-derivation from the snapshot on every call. Nothing here
//! caches, so an edited line is reflected the moment the next read runs.

use crate::calendar::MONTHS_PER_YEAR;
use crate::cogs::{annual_cost, gross_margin_pct, gross_profit, total_cogs};
use crate::headcount::{prorated_cost, total_headcount_cost};
use crate::revenue::{annual_revenue, total_revenue};
use crate::types::{BudgetSummary, ComputedLine, LedgerSnapshot, LedgerValues};

/// Annualized non-salary opex across all departments. Every line is a
/// monthly run rate, one-time lines included.
pub fn total_nonsalary_opex(snapshot: &LedgerSnapshot) -> f64 {
    snapshot
        .opex
        .iter()
        .map(|l| l.monthly_cost * MONTHS_PER_YEAR)
        .sum()
}

/// Capex at full one-time cost; nothing is amortized at this level.
pub fn total_capex(snapshot: &LedgerSnapshot) -> f64 {
    snapshot.capex.iter().map(|c| c.cost).sum()
}

/// Fold the five ledgers into the income-statement summary.
///
/// Headcount merges into total opex as a virtual line alongside the
/// department-level non-salary spend. Capex stays out of net income;
/// it is a cash-flow figure in this model, reported but not deducted.
pub fn compute_summary(snapshot: &LedgerSnapshot) -> BudgetSummary {
    let total_revenue = total_revenue(&snapshot.revenue);
    let total_cogs = total_cogs(&snapshot.cogs, &snapshot.cadence);
    let gross_profit = gross_profit(total_revenue, total_cogs);
    let total_headcount_cost = total_headcount_cost(&snapshot.employees, snapshot.year);
    let total_opex = total_nonsalary_opex(snapshot) + total_headcount_cost;

    BudgetSummary {
        total_revenue,
        total_cogs,
        gross_profit,
        gross_margin_pct: gross_margin_pct(total_revenue, total_cogs),
        total_headcount_cost,
        total_opex,
        total_capex: total_capex(snapshot),
        net_income: gross_profit - total_opex,
    }
}

/// Per-line computed values for the ledgers that derive one: annual
/// revenue per revenue line, annual cost per COGS line, prorated cost
/// per employee.
pub fn line_values(snapshot: &LedgerSnapshot) -> LedgerValues {
    LedgerValues {
        revenue: snapshot
            .revenue
            .iter()
            .map(|l| ComputedLine {
                id: l.id.clone(),
                label: l.client.clone(),
                amount: annual_revenue(l),
            })
            .collect(),
        cogs: snapshot
            .cogs
            .iter()
            .map(|l| ComputedLine {
                id: l.id.clone(),
                label: l.product.clone(),
                amount: annual_cost(l, &snapshot.cadence),
            })
            .collect(),
        headcount: snapshot
            .employees
            .iter()
            .map(|e| ComputedLine {
                id: e.id.clone(),
                label: e.name.clone(),
                amount: prorated_cost(e, snapshot.year),
            })
            .collect(),
    }
}
