//! Headcount cost proration.
//!
//! The most boundary-prone routine in the engine. The rules, in order:
//!
//! 1. A start date inside the fiscal year pins the start month; any other
//!    start date means "already here" and pins month 0.
//! 2. A termination date inside the fiscal year pins the end month; no
//!    termination, or termination beyond the year, pins month 11.
//! 3. `active_months = end - start + 1`; zero or negative active months
//!    (an inverted date pair) costs 0 rather than going negative.
//! 4. Raise applies to salary, bonus applies to the raised salary, and
//!    the combined annual figure is split into twelve equal installments
//!    of which only the active months are paid. Raise and bonus are never
//!    prorated separately from salary.
//!
//! The single-year horizon in rules 1–2 is deliberate: a record whose
//! dates fall entirely outside the year is the surrounding review layer's
//! concern, not a case this routine reinterprets.

use crate::calendar::{FiscalYear, LAST_MONTH_INDEX, MONTHS_PER_YEAR};
use crate::types::Employee;

/// Number of months the employee is on payroll within the fiscal year.
/// May be zero or negative for inconsistent date pairs; callers treat
/// anything non-positive as "no cost".
pub fn active_months(employee: &Employee, year: FiscalYear) -> i32 {
    let start_month = if year.contains(employee.start_date) {
        FiscalYear::month_index(employee.start_date)
    } else {
        0
    };
    let end_month = match employee.termination_date {
        Some(d) if year.contains(d) => FiscalYear::month_index(d),
        _ => LAST_MONTH_INDEX,
    };
    end_month - start_month + 1
}

/// Full-year compensation with raise and bonus applied.
pub fn annual_comp(employee: &Employee) -> f64 {
    let adjusted_salary = employee.annual_salary * (1.0 + employee.raise_pct / 100.0);
    let bonus = adjusted_salary * employee.bonus_pct / 100.0;
    adjusted_salary + bonus
}

/// Compensation cost attributable to the fiscal year.
pub fn prorated_cost(employee: &Employee, year: FiscalYear) -> f64 {
    let months = active_months(employee, year);
    if months <= 0 {
        // Inverted date pairs degrade to zero cost, never negative.
        return 0.0;
    }
    annual_comp(employee) / MONTHS_PER_YEAR * months as f64
}

/// Sum of `prorated_cost` over the whole ledger. Zero-month employees
/// contribute 0 but stay in the ledger.
pub fn total_headcount_cost(employees: &[Employee], year: FiscalYear) -> f64 {
    employees.iter().map(|e| prorated_cost(e, year)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmployeeStatus;
    use chrono::NaiveDate;

    const FY: FiscalYear = FiscalYear(2025);

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(
        salary: f64,
        raise: f64,
        bonus: f64,
        start: NaiveDate,
        termination: Option<NaiveDate>,
    ) -> Employee {
        Employee {
            id: "emp-1".into(),
            name: "Jordan Reyes".into(),
            title: "Engineer".into(),
            department: "Engineering".into(),
            annual_salary: salary,
            raise_pct: raise,
            bonus_pct: bonus,
            status: EmployeeStatus::Active,
            start_date: start,
            termination_date: termination,
        }
    }

    #[test]
    fn march_start_no_termination() {
        // salary 150,000, raise 5% → 157,500; bonus 10% → 15,750;
        // comp 173,250; March start → months 2..=11 = 10 active;
        // (173,250 / 12) × 10 = 144,375
        let e = employee(150_000.0, 5.0, 10.0, date(2025, 3, 1), None);
        assert_eq!(active_months(&e, FY), 10);
        assert!((annual_comp(&e) - 173_250.0).abs() < 1e-9);
        assert!((prorated_cost(&e, FY) - 144_375.0).abs() < 1e-9);
    }

    #[test]
    fn prior_year_start_costs_the_full_year() {
        let e = employee(120_000.0, 0.0, 0.0, date(2023, 6, 15), None);
        assert_eq!(active_months(&e, FY), 12);
        assert!((prorated_cost(&e, FY) - 120_000.0).abs() < 1e-9);
    }

    #[test]
    fn in_year_start_and_termination() {
        // April through September = 6 months
        let e = employee(
            96_000.0,
            0.0,
            0.0,
            date(2025, 4, 10),
            Some(date(2025, 9, 20)),
        );
        assert_eq!(active_months(&e, FY), 6);
        assert!((prorated_cost(&e, FY) - 48_000.0).abs() < 1e-9);
    }

    #[test]
    fn termination_in_future_year_runs_through_december() {
        let e = employee(
            60_000.0,
            0.0,
            0.0,
            date(2025, 7, 1),
            Some(date(2026, 2, 1)),
        );
        assert_eq!(active_months(&e, FY), 6);
        assert!((prorated_cost(&e, FY) - 30_000.0).abs() < 1e-9);
    }

    #[test]
    fn inverted_dates_cost_zero() {
        let e = employee(
            150_000.0,
            5.0,
            10.0,
            date(2025, 8, 1),
            Some(date(2025, 3, 1)),
        );
        assert!(active_months(&e, FY) <= 0);
        assert_eq!(prorated_cost(&e, FY), 0.0);
    }

    #[test]
    fn raise_and_bonus_are_not_prorated_separately() {
        // One active month pays exactly comp / 12, raise and bonus included.
        let e = employee(
            150_000.0,
            5.0,
            10.0,
            date(2025, 12, 1),
            None,
        );
        assert_eq!(active_months(&e, FY), 1);
        assert!((prorated_cost(&e, FY) - 173_250.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn december_termination_is_a_full_final_month() {
        let e = employee(
            120_000.0,
            0.0,
            0.0,
            date(2020, 1, 1),
            Some(date(2025, 12, 5)),
        );
        assert_eq!(active_months(&e, FY), 12);
        assert!((prorated_cost(&e, FY) - 120_000.0).abs() < 1e-9);
    }

    #[test]
    fn total_includes_zero_month_employees_at_zero() {
        let active = employee(120_000.0, 0.0, 0.0, date(2024, 1, 1), None);
        let inverted = employee(
            90_000.0,
            0.0,
            0.0,
            date(2025, 10, 1),
            Some(date(2025, 2, 1)),
        );
        let total = total_headcount_cost(&[active, inverted], FY);
        assert!((total - 120_000.0).abs() < 1e-9);
    }
}
