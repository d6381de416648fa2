use async_trait::async_trait;
use std::sync::Arc;

use crate::stages::{SideEffect, SideEffectInput};
use crate::types::{BudgetFinding, ReviewQuery};

/// Logs the completed digest so operators can correlate review runs.
///
/// In a deployed setup this is where a digest cache or notification
/// fan-out would hang; the pipeline result itself never changes.
pub struct DigestLogSideEffect;

#[async_trait]
impl SideEffect<ReviewQuery, BudgetFinding> for DigestLogSideEffect {
    async fn run(
        &self,
        input: Arc<SideEffectInput<ReviewQuery, BudgetFinding>>,
    ) -> Result<(), String> {
        let total: f64 = input.selected.iter().map(|f| f.dollar_impact).sum();
        log::info!(
            "request_id={} review digest ready: {} findings, ${:.0} total impact",
            input.query.request_id,
            input.selected.len(),
            total
        );
        Ok(())
    }
}
