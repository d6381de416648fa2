use async_trait::async_trait;

use crate::stages::Hydrator;
use crate::types::{BudgetFinding, ReviewQuery, Severity};

/// Derives an urgency score from a finding's severity.
///
/// Urgency is presentation-facing (how prominently a card renders);
/// priority ordering stays with the scorers.
pub struct UrgencyHydrator;

#[async_trait]
impl Hydrator<ReviewQuery, BudgetFinding> for UrgencyHydrator {
    async fn hydrate(
        &self,
        _query: &ReviewQuery,
        candidates: &[BudgetFinding],
    ) -> Result<Vec<BudgetFinding>, String> {
        let hydrated = candidates
            .iter()
            .map(|f| {
                let urgency = match f.severity {
                    Severity::Critical => Some(0.9),
                    Severity::Elevated => Some(0.6),
                    Severity::Advisory => Some(0.3),
                };
                BudgetFinding {
                    urgency_score: urgency,
                    ..BudgetFinding::default()
                }
            })
            .collect();
        Ok(hydrated)
    }

    fn update(&self, candidate: &mut BudgetFinding, hydrated: BudgetFinding) {
        candidate.urgency_score = hydrated.urgency_score;
    }
}
