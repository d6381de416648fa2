use async_trait::async_trait;

use crate::review::{classify_snapshot, ReviewConfig};
use crate::calendar::FiscalYear;
use crate::stages::Source;
use crate::types::{BudgetFinding, LedgerSnapshot, ReviewQuery, ReviewScope};

/// Produces `BudgetFinding` candidates by classifying a ledger snapshot.
///
/// The source owns the snapshot it reviews; the query's fiscal year
/// overrides the snapshot's so a review can be run against a different
/// plan year without rebuilding the book.
pub struct LedgerReviewSource {
    snapshot: LedgerSnapshot,
    config: ReviewConfig,
}

impl LedgerReviewSource {
    pub fn new(snapshot: LedgerSnapshot) -> Self {
        Self {
            snapshot,
            config: ReviewConfig::default(),
        }
    }

    pub fn with_config(snapshot: LedgerSnapshot, config: ReviewConfig) -> Self {
        Self { snapshot, config }
    }

    fn is_empty(&self) -> bool {
        self.snapshot.revenue.is_empty()
            && self.snapshot.cogs.is_empty()
            && self.snapshot.opex.is_empty()
            && self.snapshot.employees.is_empty()
            && self.snapshot.capex.is_empty()
    }
}

#[async_trait]
impl Source<ReviewQuery, BudgetFinding> for LedgerReviewSource {
    fn enable(&self, _query: &ReviewQuery) -> bool {
        !self.is_empty()
    }

    async fn fetch(&self, query: &ReviewQuery) -> Result<Vec<BudgetFinding>, String> {
        let mut snapshot = self.snapshot.clone();
        if query.fiscal_year != 0 {
            snapshot.year = FiscalYear(query.fiscal_year);
        }

        let mut findings = classify_snapshot(&snapshot, &self.config);

        // A department review only sees its own slice.
        if let ReviewScope::Department { ref name } = query.scope {
            findings.retain(|f| f.department == *name);
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Employee, FindingKind, OpexLine};
    use chrono::NaiveDate;

    fn query(scope: ReviewScope) -> ReviewQuery {
        ReviewQuery {
            request_id: "test-001".into(),
            requested_by: "cfo".into(),
            scope,
            fiscal_year: 2025,
            min_impact: None,
        }
    }

    fn snapshot_with_two_departments() -> LedgerSnapshot {
        LedgerSnapshot {
            year: FiscalYear(2025),
            opex: vec![OpexLine {
                id: "opex-1".into(),
                department: "Marketing".into(),
                category: "Agencies".into(),
                monthly_cost: 12_000.0,
                expense_type: crate::types::ExpenseType::Recurring,
                ai_baseline: 10_000.0,
            }],
            employees: vec![Employee {
                id: "emp-1".into(),
                name: "Pat".into(),
                department: "Ops".into(),
                annual_salary: 90_000.0,
                start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                termination_date: Some(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()),
                ..Employee::default()
            }],
            ..LedgerSnapshot::default()
        }
    }

    #[tokio::test]
    async fn company_scope_sees_everything() {
        let source = LedgerReviewSource::new(snapshot_with_two_departments());
        let findings = source.fetch(&query(ReviewScope::Company)).await.unwrap();
        assert_eq!(findings.len(), 2);
    }

    #[tokio::test]
    async fn department_scope_filters_findings() {
        let source = LedgerReviewSource::new(snapshot_with_two_departments());
        let findings = source
            .fetch(&query(ReviewScope::Department {
                name: "Ops".into(),
            }))
            .await
            .unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::InvertedDates);
    }

    #[test]
    fn empty_book_disables_the_source() {
        let source = LedgerReviewSource::new(LedgerSnapshot::default());
        assert!(!source.enable(&query(ReviewScope::Company)));
    }
}
