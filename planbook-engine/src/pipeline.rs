//! The review pipeline runner.
//!
//! A concrete pipeline plugs stage implementations into the accessor
//! methods; `execute` runs them in the fixed order. Stage failures are
//! logged and skipped — a broken scorer degrades the ranking, it does
//! not take down the review.

use std::sync::Arc;

use async_trait::async_trait;

use crate::stages::{
    Filter, Hydrator, QueryHydrator, Scorer, Selector, SideEffect, SideEffectInput, Source,
};

/// Anything flowing through the pipeline as a query carries a request id
/// for log correlation.
pub trait HasRequestId {
    fn request_id(&self) -> &str;
}

/// Everything a pipeline run produced, kept around for diagnostics:
/// the full retrieved set, what filters dropped, and the final selection.
pub struct PipelineResult<Q, C> {
    pub query: Arc<Q>,
    pub retrieved: Vec<C>,
    pub dropped: Vec<C>,
    pub selected: Vec<C>,
}

#[async_trait]
pub trait ReviewPipeline<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + HasRequestId + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<Q>>];
    fn sources(&self) -> &[Box<dyn Source<Q, C>>];
    fn hydrators(&self) -> &[Box<dyn Hydrator<Q, C>>];
    fn filters(&self) -> &[Box<dyn Filter<Q, C>>];
    fn scorers(&self) -> &[Box<dyn Scorer<Q, C>>];
    fn selector(&self) -> &dyn Selector<Q, C>;
    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<Q, C>>>>;

    async fn execute(&self, mut query: Q) -> PipelineResult<Q, C> {
        // Query hydration: each hydrator fills the fields it owns.
        for qh in self.query_hydrators() {
            if !qh.enable(&query) {
                continue;
            }
            match qh.hydrate(&query).await {
                Ok(hydrated) => qh.update(&mut query, hydrated),
                Err(e) => log::warn!(
                    "request_id={} query hydrator {} failed: {}",
                    query.request_id(),
                    qh.name(),
                    e
                ),
            }
        }

        // Candidate fetch across all enabled sources.
        let mut candidates: Vec<C> = Vec::new();
        for source in self.sources() {
            if !source.enable(&query) {
                continue;
            }
            match source.fetch(&query).await {
                Ok(mut fetched) => candidates.append(&mut fetched),
                Err(e) => log::warn!(
                    "request_id={} source {} failed: {}",
                    query.request_id(),
                    source.name(),
                    e
                ),
            }
        }
        let retrieved = candidates.clone();

        // Candidate hydration, pairwise by index.
        for hydrator in self.hydrators() {
            if !hydrator.enable(&query) {
                continue;
            }
            match hydrator.hydrate(&query, &candidates).await {
                Ok(hydrated) if hydrated.len() == candidates.len() => {
                    for (candidate, h) in candidates.iter_mut().zip(hydrated) {
                        hydrator.update(candidate, h);
                    }
                }
                Ok(_) => log::warn!(
                    "request_id={} hydrator {} returned a mismatched batch",
                    query.request_id(),
                    hydrator.name()
                ),
                Err(e) => log::warn!(
                    "request_id={} hydrator {} failed: {}",
                    query.request_id(),
                    hydrator.name(),
                    e
                ),
            }
        }

        // Filters run sequentially; dropped candidates accumulate.
        let mut dropped: Vec<C> = Vec::new();
        for filter in self.filters() {
            if !filter.enable(&query) {
                continue;
            }
            let batch = candidates.clone();
            match filter.filter(&query, batch).await {
                Ok(outcome) => {
                    candidates = outcome.kept;
                    dropped.extend(outcome.dropped);
                }
                // A failed filter keeps nothing out; candidates pass through.
                Err(e) => log::warn!(
                    "request_id={} filter {} failed: {}",
                    query.request_id(),
                    filter.name(),
                    e
                ),
            }
        }

        // Scorers, pairwise like hydrators.
        for scorer in self.scorers() {
            if !scorer.enable(&query) {
                continue;
            }
            match scorer.score(&query, &candidates).await {
                Ok(scored) if scored.len() == candidates.len() => {
                    for (candidate, s) in candidates.iter_mut().zip(scored) {
                        scorer.update(candidate, s);
                    }
                }
                Ok(_) => log::warn!(
                    "request_id={} scorer {} returned a mismatched batch",
                    query.request_id(),
                    scorer.name()
                ),
                Err(e) => log::warn!(
                    "request_id={} scorer {} failed: {}",
                    query.request_id(),
                    scorer.name(),
                    e
                ),
            }
        }

        let selected = self.selector().select(&query, candidates);

        let query = Arc::new(query);
        let input = Arc::new(SideEffectInput {
            query: Arc::clone(&query),
            selected: selected.clone(),
        });
        for effect in self.side_effects().iter() {
            if !effect.enable(Arc::clone(&query)) {
                continue;
            }
            if let Err(e) = effect.run(Arc::clone(&input)).await {
                log::warn!(
                    "request_id={} side effect {} failed: {}",
                    query.request_id(),
                    effect.name(),
                    e
                );
            }
        }

        PipelineResult {
            query,
            retrieved,
            dropped,
            selected,
        }
    }
}
