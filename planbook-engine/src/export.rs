//! Ledger export to CSV rows.
//!
//! The inverse of the loaders: typed lines flatten back into the same
//! record shapes the loaders read, so an exported file round-trips. This
//! is the whole export surface; workbook styling and download plumbing
//! belong to the presentation layer.

use serde::Serialize;

use crate::ledger_loader::{CapexRecord, CogsRecord, EmployeeRecord, OpexRecord, RevenueRecord};
use crate::types::{CapexItem, CogsLine, DealStage, Employee, OpexLine, RevenueLine};

impl From<&RevenueLine> for RevenueRecord {
    fn from(line: &RevenueLine) -> Self {
        let (churn_pct, upsell_pct, win_probability_pct) = match &line.stage {
            DealStage::Existing { retention } => (retention.churn_pct, retention.upsell_pct, 0.0),
            DealStage::Pipeline {
                win_probability_pct,
            } => (0.0, 0.0, *win_probability_pct),
        };
        Self {
            id: line.id.clone(),
            client: line.client.clone(),
            status: line.stage.status_label().to_string(),
            kind: line.kind.to_string(),
            units: line.units,
            unit_price: line.unit_price,
            churn_pct,
            upsell_pct,
            win_probability_pct,
        }
    }
}

impl From<&CogsLine> for CogsRecord {
    fn from(line: &CogsLine) -> Self {
        Self {
            id: line.id.clone(),
            product: line.product.clone(),
            vendor: line.vendor.clone(),
            cost_per_unit: line.cost_per_unit,
            forecasted_units: line.forecasted_units,
        }
    }
}

impl From<&OpexLine> for OpexRecord {
    fn from(line: &OpexLine) -> Self {
        Self {
            id: line.id.clone(),
            department: line.department.clone(),
            category: line.category.clone(),
            monthly_cost: line.monthly_cost,
            expense_type: line.expense_type.to_string(),
            ai_baseline: line.ai_baseline,
        }
    }
}

impl From<&Employee> for EmployeeRecord {
    fn from(e: &Employee) -> Self {
        Self {
            id: e.id.clone(),
            name: e.name.clone(),
            title: e.title.clone(),
            department: e.department.clone(),
            annual_salary: e.annual_salary,
            raise_pct: e.raise_pct,
            bonus_pct: e.bonus_pct,
            status: e.status.to_string(),
            start_date: e.start_date.format("%Y-%m-%d").to_string(),
            termination_date: e
                .termination_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<&CapexItem> for CapexRecord {
    fn from(item: &CapexItem) -> Self {
        Self {
            id: item.id.clone(),
            asset: item.asset.clone(),
            cost: item.cost,
            purchase_date: item.purchase_date.format("%Y-%m-%d").to_string(),
            useful_life_years: item.useful_life_years,
        }
    }
}

fn write_rows<T: Serialize>(rows: impl Iterator<Item = T>) -> Result<String, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| format!("CSV write error: {e}"))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| format!("CSV write error: {e}"))?;
    String::from_utf8(bytes).map_err(|e| format!("CSV write error: {e}"))
}

pub fn revenue_to_csv(lines: &[RevenueLine]) -> Result<String, String> {
    write_rows(lines.iter().map(RevenueRecord::from))
}

pub fn cogs_to_csv(lines: &[CogsLine]) -> Result<String, String> {
    write_rows(lines.iter().map(CogsRecord::from))
}

pub fn opex_to_csv(lines: &[OpexLine]) -> Result<String, String> {
    write_rows(lines.iter().map(OpexRecord::from))
}

pub fn headcount_to_csv(employees: &[Employee]) -> Result<String, String> {
    write_rows(employees.iter().map(EmployeeRecord::from))
}

pub fn capex_to_csv(items: &[CapexItem]) -> Result<String, String> {
    write_rows(items.iter().map(CapexRecord::from))
}
