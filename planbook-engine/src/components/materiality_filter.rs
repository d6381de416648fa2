use async_trait::async_trait;

use crate::stages::{Filter, FilterOutcome};
use crate::types::{BudgetFinding, ReviewQuery, Severity};

/// Drops findings below a minimum dollar impact.
///
/// Critical findings always pass: an inverted-date record has zero
/// dollar impact by construction and still has to reach a human.
pub struct MaterialityFilter {
    pub min_dollar_impact: f64,
}

impl MaterialityFilter {
    pub fn new(min_dollar_impact: f64) -> Self {
        Self { min_dollar_impact }
    }
}

impl Default for MaterialityFilter {
    fn default() -> Self {
        Self {
            min_dollar_impact: 100.0,
        }
    }
}

#[async_trait]
impl Filter<ReviewQuery, BudgetFinding> for MaterialityFilter {
    async fn filter(
        &self,
        query: &ReviewQuery,
        candidates: Vec<BudgetFinding>,
    ) -> Result<FilterOutcome<BudgetFinding>, String> {
        let floor = query.min_impact.unwrap_or(self.min_dollar_impact);
        let (kept, dropped): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|f| f.dollar_impact >= floor || f.severity == Severity::Critical);

        Ok(FilterOutcome { kept, dropped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReviewScope;

    fn query(min_impact: Option<f64>) -> ReviewQuery {
        ReviewQuery {
            request_id: "test-001".into(),
            requested_by: "cfo".into(),
            scope: ReviewScope::Company,
            fiscal_year: 2025,
            min_impact,
        }
    }

    #[tokio::test]
    async fn small_findings_drop_and_critical_survive() {
        let filter = MaterialityFilter::new(1_000.0);
        let candidates = vec![
            BudgetFinding {
                id: "big".into(),
                dollar_impact: 24_000.0,
                ..BudgetFinding::default()
            },
            BudgetFinding {
                id: "small".into(),
                dollar_impact: 50.0,
                ..BudgetFinding::default()
            },
            BudgetFinding {
                id: "critical-zero".into(),
                dollar_impact: 0.0,
                severity: Severity::Critical,
                ..BudgetFinding::default()
            },
        ];
        let outcome = filter.filter(&query(None), candidates).await.unwrap();
        let kept: Vec<&str> = outcome.kept.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(kept, vec!["big", "critical-zero"]);
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].id, "small");
    }

    #[tokio::test]
    async fn query_floor_overrides_the_default() {
        let filter = MaterialityFilter::default();
        let candidates = vec![BudgetFinding {
            id: "mid".into(),
            dollar_impact: 5_000.0,
            ..BudgetFinding::default()
        }];
        let outcome = filter
            .filter(&query(Some(10_000.0)), candidates)
            .await
            .unwrap();
        assert!(outcome.kept.is_empty());
        assert_eq!(outcome.dropped.len(), 1);
    }
}
