use crate::stages::Selector;
use crate::types::{BudgetFinding, ReviewQuery};

/// Keeps the top K findings by priority score.
pub struct TopKSelector {
    pub k: usize,
}

impl Default for TopKSelector {
    fn default() -> Self {
        Self { k: 5 }
    }
}

impl Selector<ReviewQuery, BudgetFinding> for TopKSelector {
    fn score(&self, candidate: &BudgetFinding) -> f64 {
        candidate.priority_score.unwrap_or(f64::NEG_INFINITY)
    }

    fn size(&self) -> Option<usize> {
        Some(self.k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReviewScope;

    #[test]
    fn picks_highest_scores_in_order() {
        let selector = TopKSelector { k: 2 };
        let query = ReviewQuery {
            request_id: "test-001".into(),
            requested_by: "cfo".into(),
            scope: ReviewScope::Company,
            fiscal_year: 2025,
            min_impact: None,
        };
        let candidates = vec![
            BudgetFinding {
                id: "low".into(),
                priority_score: Some(1.0),
                ..BudgetFinding::default()
            },
            BudgetFinding {
                id: "high".into(),
                priority_score: Some(10.0),
                ..BudgetFinding::default()
            },
            BudgetFinding {
                id: "mid".into(),
                priority_score: Some(5.0),
                ..BudgetFinding::default()
            },
        ];
        let selected = selector.select(&query, candidates);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].id, "high");
        assert_eq!(selected[1].id, "mid");
    }

    #[test]
    fn nan_scores_never_reach_the_top() {
        let selector = TopKSelector { k: 2 };
        let query = ReviewQuery {
            request_id: "test-002".into(),
            requested_by: "cfo".into(),
            scope: ReviewScope::Company,
            fiscal_year: 2025,
            min_impact: None,
        };
        let candidates = vec![
            BudgetFinding {
                id: "nan".into(),
                priority_score: Some(f64::NAN),
                ..BudgetFinding::default()
            },
            BudgetFinding {
                id: "real".into(),
                priority_score: Some(2.0),
                ..BudgetFinding::default()
            },
        ];
        let selected = selector.select(&query, candidates);
        assert_eq!(selected[0].id, "real");
    }
}
