use async_trait::async_trait;

use crate::stages::QueryHydrator;
use crate::types::ReviewQuery;

/// The plan year reviews default to when the caller leaves it unset.
pub const DEFAULT_FISCAL_YEAR: i32 = 2025;

/// Fills in the default fiscal year when the query carries none.
///
/// In a deployed setup this would resolve "current plan year" from the
/// planning calendar; here the default is a constant.
pub struct FiscalYearHydrator;

#[async_trait]
impl QueryHydrator<ReviewQuery> for FiscalYearHydrator {
    async fn hydrate(&self, query: &ReviewQuery) -> Result<ReviewQuery, String> {
        if query.fiscal_year == 0 {
            Ok(ReviewQuery {
                fiscal_year: DEFAULT_FISCAL_YEAR,
                ..query.clone()
            })
        } else {
            Ok(query.clone())
        }
    }

    fn update(&self, query: &mut ReviewQuery, hydrated: ReviewQuery) {
        query.fiscal_year = hydrated.fiscal_year;
    }
}
