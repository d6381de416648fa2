use async_trait::async_trait;
use std::sync::Arc;

use crate::components::department_diversity_scorer::DepartmentDiversityScorer;
use crate::components::digest_log_side_effect::DigestLogSideEffect;
use crate::components::fiscal_year_hydrator::FiscalYearHydrator;
use crate::components::impact_scorer::ImpactScorer;
use crate::components::ledger_review_source::LedgerReviewSource;
use crate::components::materiality_filter::MaterialityFilter;
use crate::components::top_k_selector::TopKSelector;
use crate::components::urgency_hydrator::UrgencyHydrator;
use crate::pipeline::ReviewPipeline;
use crate::review::ReviewConfig;
use crate::stages::{Filter, Hydrator, QueryHydrator, Scorer, Selector, SideEffect, Source};
use crate::types::{BudgetFinding, LedgerSnapshot, ReviewQuery};

/// The budget review digest pipeline.
///
/// Flow:
/// 1. FiscalYearHydrator fills the default plan year
/// 2. LedgerReviewSource classifies findings from the snapshot
/// 3. UrgencyHydrator derives urgency from severity
/// 4. MaterialityFilter drops findings under the impact floor
/// 5. ImpactScorer assigns priority scores
/// 6. DepartmentDiversityScorer attenuates repeated departments
/// 7. TopKSelector picks the top N
/// 8. DigestLogSideEffect records the run
pub struct ReviewDigestPipeline {
    query_hydrators: Vec<Box<dyn QueryHydrator<ReviewQuery>>>,
    sources: Vec<Box<dyn Source<ReviewQuery, BudgetFinding>>>,
    hydrators: Vec<Box<dyn Hydrator<ReviewQuery, BudgetFinding>>>,
    filters: Vec<Box<dyn Filter<ReviewQuery, BudgetFinding>>>,
    scorers: Vec<Box<dyn Scorer<ReviewQuery, BudgetFinding>>>,
    selector: TopKSelector,
    side_effects: Arc<Vec<Box<dyn SideEffect<ReviewQuery, BudgetFinding>>>>,
}

impl ReviewDigestPipeline {
    /// Pipeline over a ledger snapshot with the default digest size.
    pub fn with_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self::with_snapshot_and_size(snapshot, 5)
    }

    /// Pipeline over a ledger snapshot with a custom digest size.
    pub fn with_snapshot_and_size(snapshot: LedgerSnapshot, result_size: usize) -> Self {
        Self::assemble(snapshot, ReviewConfig::default(), result_size)
    }

    /// Full control over thresholds and digest size.
    pub fn with_config(snapshot: LedgerSnapshot, config: ReviewConfig, result_size: usize) -> Self {
        Self::assemble(snapshot, config, result_size)
    }

    fn assemble(snapshot: LedgerSnapshot, config: ReviewConfig, result_size: usize) -> Self {
        let query_hydrators: Vec<Box<dyn QueryHydrator<ReviewQuery>>> =
            vec![Box::new(FiscalYearHydrator)];

        let sources: Vec<Box<dyn Source<ReviewQuery, BudgetFinding>>> =
            vec![Box::new(LedgerReviewSource::with_config(snapshot, config))];

        let hydrators: Vec<Box<dyn Hydrator<ReviewQuery, BudgetFinding>>> =
            vec![Box::new(UrgencyHydrator)];

        let filters: Vec<Box<dyn Filter<ReviewQuery, BudgetFinding>>> =
            vec![Box::new(MaterialityFilter::default())];

        let scorers: Vec<Box<dyn Scorer<ReviewQuery, BudgetFinding>>> = vec![
            Box::new(ImpactScorer),
            Box::new(DepartmentDiversityScorer::default()),
        ];

        let side_effects: Arc<Vec<Box<dyn SideEffect<ReviewQuery, BudgetFinding>>>> =
            Arc::new(vec![Box::new(DigestLogSideEffect)]);

        Self {
            query_hydrators,
            sources,
            hydrators,
            filters,
            scorers,
            selector: TopKSelector { k: result_size },
            side_effects,
        }
    }
}

#[async_trait]
impl ReviewPipeline<ReviewQuery, BudgetFinding> for ReviewDigestPipeline {
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<ReviewQuery>>] {
        &self.query_hydrators
    }

    fn sources(&self) -> &[Box<dyn Source<ReviewQuery, BudgetFinding>>] {
        &self.sources
    }

    fn hydrators(&self) -> &[Box<dyn Hydrator<ReviewQuery, BudgetFinding>>] {
        &self.hydrators
    }

    fn filters(&self) -> &[Box<dyn Filter<ReviewQuery, BudgetFinding>>] {
        &self.filters
    }

    fn scorers(&self) -> &[Box<dyn Scorer<ReviewQuery, BudgetFinding>>] {
        &self.scorers
    }

    fn selector(&self) -> &dyn Selector<ReviewQuery, BudgetFinding> {
        &self.selector
    }

    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<ReviewQuery, BudgetFinding>>>> {
        Arc::clone(&self.side_effects)
    }
}
