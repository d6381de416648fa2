use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::stages::Scorer;
use crate::types::{BudgetFinding, ReviewQuery};

/// Attenuates scores for repeated departments so the digest spreads
/// across the org instead of stacking one department's findings.
///
/// Findings are walked in current-score order; each later appearance of
/// the same department is multiplied by `decay_factor^position`, floored
/// so nothing attenuates to zero.
pub struct DepartmentDiversityScorer {
    pub decay_factor: f64,
    pub floor: f64,
}

impl Default for DepartmentDiversityScorer {
    fn default() -> Self {
        Self {
            decay_factor: 0.7,
            floor: 0.1,
        }
    }
}

impl DepartmentDiversityScorer {
    fn multiplier(&self, position: usize) -> f64 {
        (1.0 - self.floor) * self.decay_factor.powf(position as f64) + self.floor
    }
}

#[async_trait]
impl Scorer<ReviewQuery, BudgetFinding> for DepartmentDiversityScorer {
    async fn score(
        &self,
        _query: &ReviewQuery,
        candidates: &[BudgetFinding],
    ) -> Result<Vec<BudgetFinding>, String> {
        let mut department_counts: HashMap<String, usize> = HashMap::new();
        let mut scored = vec![BudgetFinding::default(); candidates.len()];

        let mut ordered: Vec<(usize, &BudgetFinding)> = candidates.iter().enumerate().collect();
        ordered.sort_by(|(_, a), (_, b)| {
            let a_score = a.priority_score.unwrap_or(f64::NEG_INFINITY);
            let b_score = b.priority_score.unwrap_or(f64::NEG_INFINITY);
            b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
        });

        for (original_idx, candidate) in ordered {
            let entry = department_counts
                .entry(candidate.department.clone())
                .or_insert(0);
            let position = *entry;
            *entry += 1;

            let multiplier = self.multiplier(position);
            scored[original_idx] = BudgetFinding {
                priority_score: candidate.priority_score.map(|s| s * multiplier),
                ..BudgetFinding::default()
            };
        }

        Ok(scored)
    }

    fn update(&self, candidate: &mut BudgetFinding, scored: BudgetFinding) {
        candidate.priority_score = scored.priority_score;
    }
}
