//! Chart-shaped data for the presentation layer.
//!
//! The charting component consumes `{labels, datasets}`; these builders
//! stop at that boundary. No colors, axes, or rendering options here.

use serde::Serialize;

use crate::headcount::prorated_cost;
use crate::ledger_loader::group_by_department;
use crate::revenue::annual_revenue;
use crate::types::{BudgetSummary, LedgerSnapshot};

#[derive(Clone, Debug, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Annualized revenue per line, labeled by client.
pub fn revenue_by_line(snapshot: &LedgerSnapshot) -> ChartData {
    ChartData {
        labels: snapshot.revenue.iter().map(|l| l.client.clone()).collect(),
        datasets: vec![Dataset {
            label: "Annual revenue".into(),
            data: snapshot.revenue.iter().map(annual_revenue).collect(),
        }],
    }
}

/// Annualized spend per department: non-salary opex and prorated
/// headcount side by side.
pub fn opex_by_department(snapshot: &LedgerSnapshot) -> ChartData {
    let groups = group_by_department(&snapshot.opex);
    let mut labels: Vec<String> = groups.iter().map(|(d, _)| d.clone()).collect();

    // Departments that only appear in the headcount ledger still get a bar.
    for e in &snapshot.employees {
        if !labels.contains(&e.department) {
            labels.push(e.department.clone());
        }
    }
    labels.sort();

    let nonsalary: Vec<f64> = labels
        .iter()
        .map(|dept| {
            snapshot
                .opex
                .iter()
                .filter(|l| l.department == *dept)
                .map(|l| l.monthly_cost * 12.0)
                .sum()
        })
        .collect();
    let headcount: Vec<f64> = labels
        .iter()
        .map(|dept| {
            snapshot
                .employees
                .iter()
                .filter(|e| e.department == *dept)
                .map(|e| prorated_cost(e, snapshot.year))
                .sum()
        })
        .collect();

    ChartData {
        labels,
        datasets: vec![
            Dataset {
                label: "Non-salary opex".into(),
                data: nonsalary,
            },
            Dataset {
                label: "Headcount".into(),
                data: headcount,
            },
        ],
    }
}

/// Income-statement waterfall: revenue down to net income, with costs
/// as negative magnitudes.
pub fn summary_waterfall(summary: &BudgetSummary) -> ChartData {
    ChartData {
        labels: vec![
            "Revenue".into(),
            "COGS".into(),
            "Gross profit".into(),
            "Opex".into(),
            "Net income".into(),
        ],
        datasets: vec![Dataset {
            label: "Amount".into(),
            data: vec![
                summary.total_revenue,
                -summary.total_cogs,
                summary.gross_profit,
                -summary.total_opex,
                summary.net_income,
            ],
        }],
    }
}
