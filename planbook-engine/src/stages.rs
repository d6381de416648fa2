//! Stage contracts for the review pipeline.
//!
//! A pipeline run is: hydrate the query, fetch candidates from sources,
//! hydrate candidates, filter, score, select, then fire side effects.
//! Stages are generic over the query and candidate types; the concrete
//! budget-review stages live in `components`.

use std::sync::Arc;

use async_trait::async_trait;

/// Extract a short type name from the full module path.
/// `"my_crate::some_module::MyType"` becomes `"MyType"`.
pub fn stage_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Query hydrators run before candidate fetching and fill in defaults
/// or derived context on the query itself.
#[async_trait]
pub trait QueryHydrator<Q>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Return a copy of the query with this hydrator's fields filled.
    async fn hydrate(&self, query: &Q) -> Result<Q, String>;

    /// Copy only the fields this hydrator owns back onto the query.
    fn update(&self, query: &mut Q, hydrated: Q);

    fn name(&self) -> &str {
        stage_name(std::any::type_name::<Self>())
    }
}

/// Sources produce the initial candidate set.
#[async_trait]
pub trait Source<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    async fn fetch(&self, query: &Q) -> Result<Vec<C>, String>;

    fn name(&self) -> &str {
        stage_name(std::any::type_name::<Self>())
    }
}

/// Candidate hydrators enrich already-fetched candidates with derived
/// fields, pairwise: `hydrate` computes, `update` copies the owned
/// fields onto the original.
#[async_trait]
pub trait Hydrator<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    async fn hydrate(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, String>;

    fn update(&self, candidate: &mut C, hydrated: C);

    fn name(&self) -> &str {
        stage_name(std::any::type_name::<Self>())
    }
}

/// What a filter kept and what it dropped.
pub struct FilterOutcome<C> {
    pub kept: Vec<C>,
    pub dropped: Vec<C>,
}

/// Filters partition the candidate set; dropped candidates leave the
/// pipeline but stay observable in the result for diagnostics.
#[async_trait]
pub trait Filter<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    async fn filter(&self, query: &Q, candidates: Vec<C>) -> Result<FilterOutcome<C>, String>;

    fn name(&self) -> &str {
        stage_name(std::any::type_name::<Self>())
    }
}

/// Scorers compute score fields pairwise, like hydrators: `score`
/// produces scored copies, `update` copies the owned fields back.
#[async_trait]
pub trait Scorer<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    async fn score(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, String>;

    fn update(&self, candidate: &mut C, scored: C);

    fn name(&self) -> &str {
        stage_name(std::any::type_name::<Self>())
    }
}

/// Selectors sort and truncate after scoring.
pub trait Selector<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// The sort key. Higher is better.
    fn score(&self, candidate: &C) -> f64;

    /// Maximum candidates to keep; `None` means no truncation.
    fn size(&self) -> Option<usize> {
        None
    }

    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Sort descending with NaN pushed to the end, then truncate.
    /// NaN never surfaces as a top candidate, whatever upstream
    /// division produced it.
    fn select(&self, _query: &Q, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| {
            let sa = self.score(a);
            let sb = self.score(b);
            match (sa.is_nan(), sb.is_nan()) {
                (true, true) => std::cmp::Ordering::Equal,
                (true, false) => std::cmp::Ordering::Greater,
                (false, true) => std::cmp::Ordering::Less,
                (false, false) => sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal),
            }
        });
        if let Some(limit) = self.size() {
            sorted.truncate(limit);
        }
        sorted
    }

    fn name(&self) -> &str {
        stage_name(std::any::type_name::<Self>())
    }
}

/// Input handed to side effects after selection.
#[derive(Clone)]
pub struct SideEffectInput<Q, C> {
    pub query: Arc<Q>,
    pub selected: Vec<C>,
}

/// Side effects run after selection and never change the result.
#[async_trait]
pub trait SideEffect<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: Arc<Q>) -> bool {
        true
    }

    async fn run(&self, input: Arc<SideEffectInput<Q, C>>) -> Result<(), String>;

    fn name(&self) -> &str {
        stage_name(std::any::type_name::<Self>())
    }
}
