//! Budget review classification.
//!
//! Walks a ledger snapshot and raises typed findings with a computed
//! dollar impact:
//! - At-risk pipeline: big weighted revenue riding on a long-shot deal.
//!   Impact = the weighted revenue currently baked into the plan.
//! - Churn exposure: existing recurring business shedding a large slice.
//!   Impact = annualized base × churn%.
//! - Opex above baseline: a line well past its AI comparison value.
//!   Impact = annualized overage versus the baseline.
//! - Compensation creep: raise + bonus lifting comp far past base salary.
//!   Impact = the lift in annual comp.
//! - Inverted dates: termination precedes start inside the plan year.
//!   Impact 0 — the engine already costs these at zero; the finding
//!   exists so the bad record reaches a human.
//! - Large capex outlay: a single purchase big enough to call out.

use crate::revenue::{annual_revenue, base_revenue};
use crate::headcount::{active_months, annual_comp};
use crate::types::{
    BudgetFinding, DealStage, FindingKind, LedgerSnapshot, RevenueKind, Severity,
};

/// Review thresholds. Defaults match the reference planning review;
/// every value is overridable.
#[derive(Clone, Debug)]
pub struct ReviewConfig {
    /// Win probability at or below this flags a pipeline deal.
    pub at_risk_win_pct: f64,
    /// Weighted revenue below this is too small to flag.
    pub at_risk_min_weighted: f64,
    /// Churn at or above this flags an existing recurring line.
    pub churn_alert_pct: f64,
    /// Monthly cost this far past the AI baseline (in percent) flags
    /// an opex line.
    pub baseline_overage_pct: f64,
    /// Raise + bonus lift beyond this share of base salary flags an
    /// employee.
    pub comp_lift_pct: f64,
    /// Single capex purchases at or above this are called out.
    pub large_capex_floor: f64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            at_risk_win_pct: 25.0,
            at_risk_min_weighted: 10_000.0,
            churn_alert_pct: 20.0,
            baseline_overage_pct: 15.0,
            comp_lift_pct: 20.0,
            large_capex_floor: 100_000.0,
        }
    }
}

fn finding(
    kind: FindingKind,
    department: &str,
    line_id: &str,
    dollar_impact: f64,
    confidence: f64,
    severity: Severity,
    signals: &[&str],
) -> BudgetFinding {
    BudgetFinding {
        id: format!("{kind:?}-{line_id}"),
        kind,
        department: department.to_string(),
        line_ids: vec![line_id.to_string()],
        dollar_impact,
        confidence,
        severity,
        priority_score: None,
        urgency_score: None,
        active_signals: signals.iter().map(|s| s.to_string()).collect(),
    }
}

/// Classify the whole snapshot. Order is ledger order; scoring and
/// selection downstream decide what actually surfaces.
pub fn classify_snapshot(snapshot: &LedgerSnapshot, config: &ReviewConfig) -> Vec<BudgetFinding> {
    let mut findings = Vec::new();

    for line in &snapshot.revenue {
        match &line.stage {
            // --- At-Risk Pipeline ---
            // Weighted revenue is in the plan, but the deal is a long shot.
            DealStage::Pipeline {
                win_probability_pct,
            } => {
                let weighted = annual_revenue(line);
                if *win_probability_pct <= config.at_risk_win_pct
                    && weighted >= config.at_risk_min_weighted
                {
                    let severity = if *win_probability_pct <= config.at_risk_win_pct / 2.0 {
                        Severity::Critical
                    } else {
                        Severity::Elevated
                    };
                    findings.push(finding(
                        FindingKind::AtRiskPipeline,
                        "Sales",
                        &line.id,
                        weighted,
                        0.85,
                        severity,
                        &["low_win_probability", "material_weighted_revenue"],
                    ));
                }
            }
            // --- Churn Exposure ---
            // Only recurring business can churn; the annualized base times
            // the churn rate is what the plan already writes off.
            DealStage::Existing { retention } => {
                if line.kind == RevenueKind::Recurring
                    && retention.churn_pct >= config.churn_alert_pct
                {
                    let lost = base_revenue(line) * retention.churn_pct / 100.0;
                    let severity = if retention.churn_pct >= config.churn_alert_pct * 2.0 {
                        Severity::Critical
                    } else {
                        Severity::Elevated
                    };
                    findings.push(finding(
                        FindingKind::ChurnExposure,
                        "Sales",
                        &line.id,
                        lost,
                        0.9,
                        severity,
                        &["high_churn"],
                    ));
                }
            }
        }
    }

    // --- Opex Above Baseline ---
    // The AI baseline never enters a total; its whole job is this check.
    for line in &snapshot.opex {
        if line.ai_baseline > 0.0 {
            let overage_pct = (line.monthly_cost - line.ai_baseline) / line.ai_baseline * 100.0;
            if overage_pct >= config.baseline_overage_pct {
                let annual_overage = (line.monthly_cost - line.ai_baseline) * 12.0;
                findings.push(finding(
                    FindingKind::OpexAboveBaseline,
                    &line.department,
                    &line.id,
                    annual_overage,
                    0.75,
                    Severity::Elevated,
                    &["above_ai_baseline"],
                ));
            }
        }
    }

    for e in &snapshot.employees {
        // --- Inverted Dates ---
        // Termination before start inside the plan year. The proration
        // routine already costs this at zero; surface the record itself.
        if let Some(term) = e.termination_date {
            if snapshot.year.contains(term)
                && snapshot.year.contains(e.start_date)
                && active_months(e, snapshot.year) <= 0
            {
                findings.push(finding(
                    FindingKind::InvertedDates,
                    &e.department,
                    &e.id,
                    0.0,
                    1.0,
                    Severity::Critical,
                    &["termination_before_start"],
                ));
            }
        }

        // --- Compensation Creep ---
        // Lift = comp minus base salary; raise and bonus compound, so the
        // lift can exceed the sum of the two percentages.
        let lift = annual_comp(e) - e.annual_salary;
        if e.annual_salary > 0.0 && lift / e.annual_salary * 100.0 >= config.comp_lift_pct {
            findings.push(finding(
                FindingKind::CompensationCreep,
                &e.department,
                &e.id,
                lift,
                0.8,
                Severity::Elevated,
                &["raise_bonus_lift"],
            ));
        }
    }

    // --- Large Capex Outlay ---
    for item in &snapshot.capex {
        if item.cost >= config.large_capex_floor {
            findings.push(finding(
                FindingKind::LargeCapexOutlay,
                "Capex",
                &item.id,
                item.cost,
                0.95,
                Severity::Elevated,
                &["large_single_purchase"],
            ));
        }
    }

    findings
}
