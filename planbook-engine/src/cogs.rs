//! COGS annualization and the gross-margin derivations.
//!
//! Whether a product's unit cost is a monthly or an annual figure is an
//! explicit configuration table, never inferred from the product name.
//! A product missing from the table takes the table's default cadence,
//! so a misclassified new product is a visible config gap rather than a
//! silent string-match miss.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::calendar::MONTHS_PER_YEAR;
use crate::numeric::pct_of;
use crate::types::CogsLine;

/// Billing cadence of a COGS product.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cadence {
    /// Unit cost is per month; annualizes at ×12.
    Monthly,
    /// Unit cost is already an annual lump sum.
    #[default]
    Annual,
}

/// Product → cadence classification, with an explicit default for
/// products nobody has classified yet.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CadenceTable {
    entries: HashMap<String, Cadence>,
    pub default_cadence: Cadence,
}

impl CadenceTable {
    pub fn new(default_cadence: Cadence) -> Self {
        Self {
            entries: HashMap::new(),
            default_cadence,
        }
    }

    pub fn classify(&mut self, product: impl Into<String>, cadence: Cadence) -> &mut Self {
        self.entries.insert(product.into(), cadence);
        self
    }

    pub fn cadence_of(&self, product: &str) -> Cadence {
        self.entries
            .get(product)
            .copied()
            .unwrap_or(self.default_cadence)
    }
}

/// Annualized cost for one line under the supplied cadence table.
pub fn annual_cost(line: &CogsLine, table: &CadenceTable) -> f64 {
    let months = match table.cadence_of(&line.product) {
        Cadence::Monthly => MONTHS_PER_YEAR,
        Cadence::Annual => 1.0,
    };
    line.cost_per_unit * line.forecasted_units * months
}

/// Sum of `annual_cost` over the whole ledger.
pub fn total_cogs(lines: &[CogsLine], table: &CadenceTable) -> f64 {
    lines.iter().map(|l| annual_cost(l, table)).sum()
}

pub fn gross_profit(total_revenue: f64, total_cogs: f64) -> f64 {
    total_revenue - total_cogs
}

/// Gross profit as a percentage of revenue, 0 when revenue is 0.
pub fn gross_margin_pct(total_revenue: f64, total_cogs: f64) -> f64 {
    pct_of(gross_profit(total_revenue, total_cogs), total_revenue)
}
