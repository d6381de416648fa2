//! The ledger book — owned state plus field-level mutation.
//!
//! All five ledgers live here behind an `update_field` API that takes
//! raw form text. Numeric fields coerce unparseable input to 0 before
//! any range check runs, so `NaN` can never enter the book; percentage
//! fields and structural invariants are then enforced with typed
//! errors. Reads recompute from scratch — the book holds no derived
//! state at all.

use chrono::NaiveDate;

use planbook_engine::numeric::{parse_or_zero, valid_pct};
use planbook_engine::rollup;
use planbook_engine::types::{
    BudgetSummary, DealStage, EmployeeStatus, ExpenseType, LedgerSnapshot, LedgerValues,
    RevenueKind,
};
use planbook_engine::FiscalYear;

use crate::error::{BridgeError, BridgeResult};
use crate::ops::LedgerName;

pub struct LedgerBook {
    snapshot: LedgerSnapshot,
}

impl LedgerBook {
    pub fn new(snapshot: LedgerSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &LedgerSnapshot {
        &self.snapshot
    }

    /// The rollup, re-derived from current ledger state on every call.
    pub fn summary(&self) -> BudgetSummary {
        rollup::compute_summary(&self.snapshot)
    }

    pub fn line_values(&self) -> LedgerValues {
        rollup::line_values(&self.snapshot)
    }

    pub fn set_fiscal_year(&mut self, year: i32) {
        self.snapshot.year = FiscalYear(year);
    }

    /// Swap a revenue line's stage wholesale. The new stage arrives
    /// complete, so churn/upsell and win probability can never coexist
    /// on a line.
    pub fn set_deal_stage(&mut self, line_id: &str, stage: DealStage) -> BridgeResult<()> {
        match &stage {
            DealStage::Existing { retention } => {
                check_pct("churn_pct", retention.churn_pct)?;
                check_pct("upsell_pct", retention.upsell_pct)?;
            }
            DealStage::Pipeline {
                win_probability_pct,
            } => check_pct("win_probability_pct", *win_probability_pct)?,
        }
        let line = self
            .snapshot
            .revenue
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| BridgeError::UnknownLine {
                ledger: "revenue".into(),
                line_id: line_id.to_string(),
            })?;
        line.stage = stage;
        Ok(())
    }

    /// Replace one field on one line from raw form text.
    pub fn update_field(
        &mut self,
        ledger: LedgerName,
        line_id: &str,
        field: &str,
        raw: &str,
    ) -> BridgeResult<()> {
        match ledger {
            LedgerName::Revenue => self.update_revenue(line_id, field, raw),
            LedgerName::Cogs => self.update_cogs(line_id, field, raw),
            LedgerName::Opex => self.update_opex(line_id, field, raw),
            LedgerName::Headcount => self.update_employee(line_id, field, raw),
            LedgerName::Capex => self.update_capex(line_id, field, raw),
        }
    }

    fn update_revenue(&mut self, line_id: &str, field: &str, raw: &str) -> BridgeResult<()> {
        let line = self
            .snapshot
            .revenue
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| unknown_line(LedgerName::Revenue, line_id))?;
        match field {
            "client" => line.client = raw.to_string(),
            "units" => line.units = non_negative("units", raw)?,
            "unit_price" => line.unit_price = non_negative("unit_price", raw)?,
            "kind" => line.kind = parse_revenue_kind(raw)?,
            "churn_pct" | "upsell_pct" => match &mut line.stage {
                DealStage::Existing { retention } => {
                    let value = percent(field, raw)?;
                    if field == "churn_pct" {
                        retention.churn_pct = value;
                    } else {
                        retention.upsell_pct = value;
                    }
                }
                DealStage::Pipeline { .. } => {
                    return Err(BridgeError::FieldNotApplicable {
                        field: field.to_string(),
                        stage: "Pipeline".into(),
                    })
                }
            },
            "win_probability_pct" => match &mut line.stage {
                DealStage::Pipeline {
                    win_probability_pct,
                } => *win_probability_pct = percent(field, raw)?,
                DealStage::Existing { .. } => {
                    return Err(BridgeError::FieldNotApplicable {
                        field: field.to_string(),
                        stage: "Existing".into(),
                    })
                }
            },
            "status" => {
                return Err(BridgeError::InvalidValue {
                    field: "status".into(),
                    reason: "stage moves go through SetDealStage".into(),
                })
            }
            other => return Err(unknown_field(LedgerName::Revenue, other)),
        }
        Ok(())
    }

    fn update_cogs(&mut self, line_id: &str, field: &str, raw: &str) -> BridgeResult<()> {
        let line = self
            .snapshot
            .cogs
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| unknown_line(LedgerName::Cogs, line_id))?;
        match field {
            "product" => line.product = raw.to_string(),
            "vendor" => line.vendor = raw.to_string(),
            "cost_per_unit" => line.cost_per_unit = non_negative("cost_per_unit", raw)?,
            "forecasted_units" => line.forecasted_units = non_negative("forecasted_units", raw)?,
            other => return Err(unknown_field(LedgerName::Cogs, other)),
        }
        Ok(())
    }

    fn update_opex(&mut self, line_id: &str, field: &str, raw: &str) -> BridgeResult<()> {
        let line = self
            .snapshot
            .opex
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| unknown_line(LedgerName::Opex, line_id))?;
        match field {
            "department" => line.department = raw.to_string(),
            "category" => line.category = raw.to_string(),
            "monthly_cost" => line.monthly_cost = non_negative("monthly_cost", raw)?,
            "ai_baseline" => line.ai_baseline = non_negative("ai_baseline", raw)?,
            "expense_type" => line.expense_type = parse_expense_type(raw)?,
            other => return Err(unknown_field(LedgerName::Opex, other)),
        }
        Ok(())
    }

    fn update_employee(&mut self, line_id: &str, field: &str, raw: &str) -> BridgeResult<()> {
        let e = self
            .snapshot
            .employees
            .iter_mut()
            .find(|e| e.id == line_id)
            .ok_or_else(|| unknown_line(LedgerName::Headcount, line_id))?;
        match field {
            "name" => e.name = raw.to_string(),
            "title" => e.title = raw.to_string(),
            "department" => e.department = raw.to_string(),
            "annual_salary" => e.annual_salary = non_negative("annual_salary", raw)?,
            "raise_pct" => e.raise_pct = percent("raise_pct", raw)?,
            "bonus_pct" => e.bonus_pct = percent("bonus_pct", raw)?,
            "status" => e.status = parse_employee_status(raw)?,
            "start_date" => e.start_date = date_value("start_date", raw)?,
            // An inverted pair is accepted here: the engine costs it at
            // zero and the review layer surfaces the record.
            "termination_date" => {
                e.termination_date = if raw.trim().is_empty() {
                    None
                } else {
                    Some(date_value("termination_date", raw)?)
                }
            }
            other => return Err(unknown_field(LedgerName::Headcount, other)),
        }
        Ok(())
    }

    fn update_capex(&mut self, line_id: &str, field: &str, raw: &str) -> BridgeResult<()> {
        let item = self
            .snapshot
            .capex
            .iter_mut()
            .find(|i| i.id == line_id)
            .ok_or_else(|| unknown_line(LedgerName::Capex, line_id))?;
        match field {
            "asset" => item.asset = raw.to_string(),
            "cost" => item.cost = non_negative("cost", raw)?,
            "purchase_date" => item.purchase_date = date_value("purchase_date", raw)?,
            "useful_life_years" => {
                let years = parse_or_zero(raw) as u32;
                if years == 0 {
                    return Err(BridgeError::InvalidValue {
                        field: "useful_life_years".into(),
                        reason: "must be at least 1".into(),
                    });
                }
                item.useful_life_years = years;
            }
            other => return Err(unknown_field(LedgerName::Capex, other)),
        }
        Ok(())
    }
}

fn unknown_line(ledger: LedgerName, line_id: &str) -> BridgeError {
    BridgeError::UnknownLine {
        ledger: ledger.to_string(),
        line_id: line_id.to_string(),
    }
}

fn unknown_field(ledger: LedgerName, field: &str) -> BridgeError {
    BridgeError::UnknownField {
        ledger: ledger.to_string(),
        field: field.to_string(),
    }
}

/// Coerce, then require a non-negative amount.
fn non_negative(field: &str, raw: &str) -> BridgeResult<f64> {
    let value = parse_or_zero(raw);
    if value < 0.0 {
        return Err(BridgeError::InvalidValue {
            field: field.to_string(),
            reason: format!("{value} must be non-negative"),
        });
    }
    Ok(value)
}

/// Coerce, then require the [0, 100] band. Unparseable text lands on 0,
/// which is in band; genuinely out-of-range numbers are rejected, never
/// silently clamped.
fn percent(field: &str, raw: &str) -> BridgeResult<f64> {
    let value = parse_or_zero(raw);
    check_pct(field, value)?;
    Ok(value)
}

fn check_pct(field: &str, value: f64) -> BridgeResult<()> {
    if !valid_pct(value) {
        return Err(BridgeError::InvalidValue {
            field: field.to_string(),
            reason: format!("{value} out of range [0, 100]"),
        });
    }
    Ok(())
}

fn date_value(field: &str, raw: &str) -> BridgeResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| BridgeError::InvalidValue {
        field: field.to_string(),
        reason: format!("'{raw}' is not a YYYY-MM-DD date"),
    })
}

fn parse_revenue_kind(raw: &str) -> BridgeResult<RevenueKind> {
    match raw.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
        "recurring" => Ok(RevenueKind::Recurring),
        "services" => Ok(RevenueKind::Services),
        "onetime" => Ok(RevenueKind::OneTime),
        _ => Err(BridgeError::InvalidValue {
            field: "kind".into(),
            reason: format!("'{raw}' is not a revenue type"),
        }),
    }
}

fn parse_expense_type(raw: &str) -> BridgeResult<ExpenseType> {
    match raw.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
        "recurring" => Ok(ExpenseType::Recurring),
        "onetime" => Ok(ExpenseType::OneTime),
        _ => Err(BridgeError::InvalidValue {
            field: "expense_type".into(),
            reason: format!("'{raw}' is not an expense type"),
        }),
    }
}

fn parse_employee_status(raw: &str) -> BridgeResult<EmployeeStatus> {
    match raw.trim().to_lowercase().replace([' ', '_'], "").as_str() {
        "active" => Ok(EmployeeStatus::Active),
        "newhire" => Ok(EmployeeStatus::NewHire),
        _ => Err(BridgeError::InvalidValue {
            field: "status".into(),
            reason: format!("'{raw}' is not an employee status"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planbook_engine::types::{Employee, Retention, RevenueLine};

    fn book() -> LedgerBook {
        LedgerBook::new(LedgerSnapshot {
            year: FiscalYear(2025),
            revenue: vec![
                RevenueLine {
                    id: "rev-1".into(),
                    client: "Acme".into(),
                    kind: RevenueKind::Recurring,
                    stage: DealStage::Existing {
                        retention: Retention {
                            churn_pct: 10.0,
                            upsell_pct: 20.0,
                        },
                    },
                    units: 100.0,
                    unit_price: 500.0,
                },
                RevenueLine {
                    id: "rev-2".into(),
                    client: "Prospect".into(),
                    kind: RevenueKind::Recurring,
                    stage: DealStage::Pipeline {
                        win_probability_pct: 50.0,
                    },
                    units: 50.0,
                    unit_price: 450.0,
                },
            ],
            employees: vec![Employee {
                id: "emp-1".into(),
                name: "Jordan Reyes".into(),
                annual_salary: 150_000.0,
                raise_pct: 5.0,
                bonus_pct: 10.0,
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                ..Employee::default()
            }],
            ..LedgerSnapshot::default()
        })
    }

    #[test]
    fn garbage_numeric_input_reads_back_as_zero() {
        let mut b = book();
        b.update_field(LedgerName::Revenue, "rev-1", "units", "abc")
            .unwrap();
        assert_eq!(b.snapshot().revenue[0].units, 0.0);
        // The rollup sees the coerced value, not NaN.
        assert!(b.summary().total_revenue.is_finite());
    }

    #[test]
    fn summary_reacts_to_every_edit() {
        let mut b = book();
        let before = b.summary();
        b.update_field(LedgerName::Revenue, "rev-1", "units", "200")
            .unwrap();
        let after = b.summary();
        assert!(after.total_revenue > before.total_revenue);

        b.update_field(LedgerName::Headcount, "emp-1", "bonus_pct", "0")
            .unwrap();
        assert!(b.summary().total_headcount_cost < after.total_headcount_cost);
    }

    #[test]
    fn out_of_range_percent_is_a_typed_error() {
        let mut b = book();
        let err = b
            .update_field(LedgerName::Revenue, "rev-1", "churn_pct", "150")
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidValue { .. }));
        // The line is untouched.
        match &b.snapshot().revenue[0].stage {
            DealStage::Existing { retention } => assert_eq!(retention.churn_pct, 10.0),
            _ => panic!("stage changed"),
        }
    }

    #[test]
    fn churn_on_a_pipeline_line_is_not_applicable() {
        let mut b = book();
        let err = b
            .update_field(LedgerName::Revenue, "rev-2", "churn_pct", "15")
            .unwrap_err();
        assert!(matches!(err, BridgeError::FieldNotApplicable { .. }));
    }

    #[test]
    fn win_probability_only_exists_on_pipeline_lines() {
        let mut b = book();
        assert!(b
            .update_field(LedgerName::Revenue, "rev-2", "win_probability_pct", "75")
            .is_ok());
        let err = b
            .update_field(LedgerName::Revenue, "rev-1", "win_probability_pct", "75")
            .unwrap_err();
        assert!(matches!(err, BridgeError::FieldNotApplicable { .. }));
    }

    #[test]
    fn unknown_line_and_field_are_named_errors() {
        let mut b = book();
        assert!(matches!(
            b.update_field(LedgerName::Revenue, "rev-99", "units", "1"),
            Err(BridgeError::UnknownLine { .. })
        ));
        assert!(matches!(
            b.update_field(LedgerName::Revenue, "rev-1", "margin", "1"),
            Err(BridgeError::UnknownField { .. })
        ));
    }

    #[test]
    fn status_edits_are_redirected_to_set_deal_stage() {
        let mut b = book();
        let err = b
            .update_field(LedgerName::Revenue, "rev-1", "status", "Pipeline")
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidValue { .. }));
    }

    #[test]
    fn set_deal_stage_swaps_adjustments_atomically() {
        let mut b = book();
        b.set_deal_stage(
            "rev-1",
            DealStage::Pipeline {
                win_probability_pct: 30.0,
            },
        )
        .unwrap();
        match &b.snapshot().revenue[0].stage {
            DealStage::Pipeline {
                win_probability_pct,
            } => assert_eq!(*win_probability_pct, 30.0),
            _ => panic!("stage not swapped"),
        }
        // The old churn field is gone with the old stage.
        assert!(matches!(
            b.update_field(LedgerName::Revenue, "rev-1", "churn_pct", "5"),
            Err(BridgeError::FieldNotApplicable { .. })
        ));
    }

    #[test]
    fn set_deal_stage_rejects_out_of_range_probability() {
        let mut b = book();
        let err = b
            .set_deal_stage(
                "rev-1",
                DealStage::Pipeline {
                    win_probability_pct: 120.0,
                },
            )
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidValue { .. }));
    }

    #[test]
    fn termination_before_start_is_accepted_and_costs_zero() {
        let mut b = book();
        b.update_field(LedgerName::Headcount, "emp-1", "termination_date", "2025-02-01")
            .unwrap();
        assert_eq!(b.summary().total_headcount_cost, 0.0);
        // Clearing it restores the proration.
        b.update_field(LedgerName::Headcount, "emp-1", "termination_date", "")
            .unwrap();
        assert!((b.summary().total_headcount_cost - 144_375.0).abs() < 1e-9);
    }

    #[test]
    fn fiscal_year_moves_reprorate_headcount() {
        let mut b = book();
        assert!((b.summary().total_headcount_cost - 144_375.0).abs() < 1e-9);
        // In 2026 the March 2025 start is a prior-year start: full year.
        b.set_fiscal_year(2026);
        assert!((b.summary().total_headcount_cost - 173_250.0).abs() < 1e-9);
    }

    #[test]
    fn currency_formatted_input_parses() {
        let mut b = book();
        b.update_field(LedgerName::Headcount, "emp-1", "annual_salary", "$175,000")
            .unwrap();
        assert_eq!(b.snapshot().employees[0].annual_salary, 175_000.0);
    }
}
