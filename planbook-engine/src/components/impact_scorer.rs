use async_trait::async_trait;

use crate::stages::Scorer;
use crate::types::{BudgetFinding, ReviewQuery, Severity};

/// Scores findings by dollar impact on a log scale, with a severity
/// multiplier and a confidence weight.
///
/// The log scale keeps a $250k capex item from drowning out every
/// smaller finding; severity and confidence then separate items of
/// similar magnitude.
pub struct ImpactScorer;

#[async_trait]
impl Scorer<ReviewQuery, BudgetFinding> for ImpactScorer {
    async fn score(
        &self,
        _query: &ReviewQuery,
        candidates: &[BudgetFinding],
    ) -> Result<Vec<BudgetFinding>, String> {
        let scored = candidates
            .iter()
            .map(|f| {
                let base_score = (f.dollar_impact + 1.0).ln(); // +1 handles $0 findings
                let severity_multiplier = match f.severity {
                    Severity::Critical => 1.5,
                    Severity::Elevated => 1.0,
                    Severity::Advisory => 0.7,
                };
                BudgetFinding {
                    priority_score: Some(base_score * severity_multiplier * f.confidence),
                    ..BudgetFinding::default()
                }
            })
            .collect();

        Ok(scored)
    }

    fn update(&self, candidate: &mut BudgetFinding, scored: BudgetFinding) {
        candidate.priority_score = scored.priority_score;
    }
}
