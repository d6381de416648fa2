use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::FiscalYear;
use crate::cogs::CadenceTable;
use crate::pipeline::HasRequestId;

// ---------------------------------------------------------------------------
// Revenue ledger
// ---------------------------------------------------------------------------

/// Billing shape of a revenue line. Recurring lines are monthly run-rate
/// figures; Services and OneTime lines are already annual totals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevenueKind {
    Recurring,
    Services,
    OneTime,
}

impl fmt::Display for RevenueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevenueKind::Recurring => write!(f, "Recurring"),
            RevenueKind::Services => write!(f, "Services"),
            RevenueKind::OneTime => write!(f, "One-time"),
        }
    }
}

/// Retention adjustments for existing recurring business, both in percent
/// of the annualized base. Only meaningful when the line is Recurring;
/// inert (carried but ignored) on Services and OneTime lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Retention {
    pub churn_pct: f64,
    pub upsell_pct: f64,
}

/// Where a deal stands. The variant decides which adjustment fields exist:
/// a pipeline line cannot carry churn or upsell, and an existing line
/// cannot carry a win probability, so the invalid combinations from the
/// flat form model are unrepresentable here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage")]
pub enum DealStage {
    Existing { retention: Retention },
    Pipeline { win_probability_pct: f64 },
}

impl DealStage {
    /// Short label matching the form-model status values.
    pub fn status_label(&self) -> &'static str {
        match self {
            DealStage::Existing { .. } => "Existing",
            DealStage::Pipeline { .. } => "Pipeline",
        }
    }
}

/// One client or product row in the revenue plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueLine {
    pub id: String,
    pub client: String,
    pub kind: RevenueKind,
    pub stage: DealStage,
    /// Unit volume. Non-negative; the loaders and the bridge reject
    /// negative input before a line reaches the computations.
    pub units: f64,
    /// Price per unit per billing period.
    pub unit_price: f64,
}

impl Default for RevenueLine {
    fn default() -> Self {
        Self {
            id: String::new(),
            client: String::new(),
            kind: RevenueKind::Recurring,
            stage: DealStage::Existing {
                retention: Retention::default(),
            },
            units: 0.0,
            unit_price: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// COGS ledger
// ---------------------------------------------------------------------------

/// Per-product unit cost multiplied out by forecasted volume. The volume
/// is independently editable; nothing links it back to the revenue line
/// for the same product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CogsLine {
    pub id: String,
    pub product: String,
    /// Informational only; never enters a total.
    pub vendor: String,
    pub cost_per_unit: f64,
    pub forecasted_units: f64,
}

impl Default for CogsLine {
    fn default() -> Self {
        Self {
            id: String::new(),
            product: String::new(),
            vendor: String::new(),
            cost_per_unit: 0.0,
            forecasted_units: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Opex ledger
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseType {
    Recurring,
    OneTime,
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseType::Recurring => write!(f, "Recurring"),
            ExpenseType::OneTime => write!(f, "One-Time"),
        }
    }
}

/// A departmental operating expense. Every line is entered as a monthly
/// run rate, one-time lines included, and annualizes at ×12.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpexLine {
    pub id: String,
    pub department: String,
    pub category: String,
    pub monthly_cost: f64,
    pub expense_type: ExpenseType,
    /// AI-suggested market baseline for this line, for comparison only.
    /// Never enters a total; the review layer flags lines far above it.
    pub ai_baseline: f64,
}

impl Default for OpexLine {
    fn default() -> Self {
        Self {
            id: String::new(),
            department: String::new(),
            category: String::new(),
            monthly_cost: 0.0,
            expense_type: ExpenseType::Recurring,
            ai_baseline: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Headcount ledger
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeStatus {
    Active,
    NewHire,
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeStatus::Active => write!(f, "Active"),
            EmployeeStatus::NewHire => write!(f, "New Hire"),
        }
    }
}

/// An employee record. Termination is modeled by setting
/// `termination_date`, never by deleting the record, so the fiscal year
/// an employee exits still prorates their cost correctly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub title: String,
    pub department: String,
    pub annual_salary: f64,
    pub raise_pct: f64,
    pub bonus_pct: f64,
    pub status: EmployeeStatus,
    pub start_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
}

impl Default for Employee {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            title: String::new(),
            department: String::new(),
            annual_salary: 0.0,
            raise_pct: 0.0,
            bonus_pct: 0.0,
            status: EmployeeStatus::Active,
            start_date: NaiveDate::default(),
            termination_date: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Capex ledger
// ---------------------------------------------------------------------------

/// A one-time capital purchase, reported at full cost in the year of
/// purchase. Useful life is informational; nothing amortizes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapexItem {
    pub id: String,
    pub asset: String,
    pub cost: f64,
    pub purchase_date: NaiveDate,
    pub useful_life_years: u32,
}

impl Default for CapexItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            asset: String::new(),
            cost: 0.0,
            purchase_date: NaiveDate::default(),
            useful_life_years: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot and computed output
// ---------------------------------------------------------------------------

/// All five ledgers plus the configuration the computations need. This is
/// the unit the aggregation functions take and the unit the bridge hands
/// out on a Snapshot read.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub year: FiscalYear,
    pub revenue: Vec<RevenueLine>,
    pub cogs: Vec<CogsLine>,
    pub cadence: CadenceTable,
    pub opex: Vec<OpexLine>,
    pub employees: Vec<Employee>,
    pub capex: Vec<CapexItem>,
}

/// The income-statement rollup. Recomputed from the snapshot on every
/// read; never incrementally maintained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total_revenue: f64,
    pub total_cogs: f64,
    pub gross_profit: f64,
    pub gross_margin_pct: f64,
    pub total_headcount_cost: f64,
    pub total_opex: f64,
    pub total_capex: f64,
    pub net_income: f64,
}

/// One line's computed contribution, for display next to the editable row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComputedLine {
    pub id: String,
    pub label: String,
    pub amount: f64,
}

/// Per-line computed values across the three ledgers that have per-line
/// derivations (opex and capex rows display their stored figures as-is).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerValues {
    pub revenue: Vec<ComputedLine>,
    pub cogs: Vec<ComputedLine>,
    pub headcount: Vec<ComputedLine>,
}

// ---------------------------------------------------------------------------
// Review types
// ---------------------------------------------------------------------------

/// The kind of finding the review classifier raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    AtRiskPipeline,
    ChurnExposure,
    OpexAboveBaseline,
    CompensationCreep,
    InvertedDates,
    LargeCapexOutlay,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::AtRiskPipeline => write!(f, "At-Risk Pipeline"),
            FindingKind::ChurnExposure => write!(f, "Churn Exposure"),
            FindingKind::OpexAboveBaseline => write!(f, "Opex Above Baseline"),
            FindingKind::CompensationCreep => write!(f, "Compensation Creep"),
            FindingKind::InvertedDates => write!(f, "Inverted Dates"),
            FindingKind::LargeCapexOutlay => write!(f, "Large Capex Outlay"),
        }
    }
}

/// How loudly a finding should be surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Advisory,
    Elevated,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Advisory => write!(f, "Advisory"),
            Severity::Elevated => write!(f, "Elevated"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

/// A candidate finding flowing through the review pipeline.
#[derive(Clone, Debug, Serialize)]
pub struct BudgetFinding {
    pub id: String,
    pub kind: FindingKind,
    pub department: String,
    pub line_ids: Vec<String>,
    pub dollar_impact: f64,
    pub confidence: f64,
    pub severity: Severity,

    // Scoring fields (populated by scorers and hydrators)
    pub priority_score: Option<f64>,
    pub urgency_score: Option<f64>,

    /// Which classifier signals fired, for diagnostics.
    pub active_signals: Vec<String>,
}

impl Default for BudgetFinding {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: FindingKind::AtRiskPipeline,
            department: String::new(),
            line_ids: Vec::new(),
            dollar_impact: 0.0,
            confidence: 0.0,
            severity: Severity::Advisory,
            priority_score: None,
            urgency_score: None,
            active_signals: Vec::new(),
        }
    }
}

/// Whose review this is: the whole company, or one department's slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewScope {
    Company,
    Department { name: String },
}

/// Query from whoever is running the budget review.
#[derive(Clone, Debug)]
pub struct ReviewQuery {
    pub request_id: String,
    pub requested_by: String,
    pub scope: ReviewScope,
    /// 0 means "unset"; the fiscal-year hydrator fills the default.
    pub fiscal_year: i32,
    pub min_impact: Option<f64>,
}

impl HasRequestId for ReviewQuery {
    fn request_id(&self) -> &str {
        &self.request_id
    }
}
