//! Ledger operations — the complete vocabulary of valid edits.
//!
//! Form input gets parsed into exactly one of these variants. If it
//! doesn't parse, the edit is rejected: no partial execution, no
//! half-updated line. The enum is exhaustive, so adding an operation
//! forces a handler everywhere the compiler can see.

use std::fmt;

use serde::{Deserialize, Serialize};

use planbook_engine::types::DealStage;

/// Which of the five ledgers an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerName {
    Revenue,
    Cogs,
    Opex,
    Headcount,
    Capex,
}

impl fmt::Display for LedgerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerName::Revenue => write!(f, "revenue"),
            LedgerName::Cogs => write!(f, "cogs"),
            LedgerName::Opex => write!(f, "opex"),
            LedgerName::Headcount => write!(f, "headcount"),
            LedgerName::Capex => write!(f, "capex"),
        }
    }
}

/// Every valid operation against the ledger book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "params")]
pub enum LedgerOp {
    // ========================================
    // READS (never mutate, always safe)
    // ========================================
    /// Full copy of the five ledgers plus configuration.
    Snapshot,

    /// The income-statement rollup, recomputed from current state.
    Summary,

    /// Per-line computed values for display next to the editable rows.
    LineValues,

    // ========================================
    // MUTATIONS (validated, audited)
    // ========================================
    /// Replace one field on one line. The value arrives as the raw form
    /// text; numeric fields coerce unparseable input to 0, percentage
    /// fields are then range-checked.
    UpdateField {
        ledger: LedgerName,
        line_id: String,
        field: String,
        value: String,
    },

    /// Move a revenue line between Existing and Pipeline. Carries the
    /// complete new stage so the adjustment fields swap atomically.
    SetDealStage { line_id: String, stage: DealStage },

    /// Move the planning horizon to a different fiscal year.
    SetFiscalYear { year: i32 },
}

impl LedgerOp {
    /// Read-only operations never change the book.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            LedgerOp::Snapshot | LedgerOp::Summary | LedgerOp::LineValues
        )
    }

    /// Does this operation modify ledger state?
    pub fn is_mutation(&self) -> bool {
        !self.is_read_only()
    }

    /// Human-readable description for the audit log.
    pub fn describe(&self) -> String {
        match self {
            LedgerOp::Snapshot => "Full ledger snapshot".into(),
            LedgerOp::Summary => "Budget summary".into(),
            LedgerOp::LineValues => "Per-line computed values".into(),
            LedgerOp::UpdateField {
                ledger,
                line_id,
                field,
                value,
            } => format!("Set {ledger}.{line_id}.{field} = '{value}'"),
            LedgerOp::SetDealStage { line_id, stage } => {
                format!("Move {line_id} to {}", stage.status_label())
            }
            LedgerOp::SetFiscalYear { year } => format!("Set fiscal year to {year}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planbook_engine::types::Retention;

    #[test]
    fn parse_update_field() {
        let json = r#"{
            "op": "UpdateField",
            "params": {
                "ledger": "revenue",
                "line_id": "rev-1",
                "field": "units",
                "value": "120"
            }
        }"#;
        let op: LedgerOp = serde_json::from_str(json).unwrap();
        assert!(op.is_mutation());
        assert!(!op.is_read_only());
    }

    #[test]
    fn parse_summary_read() {
        let json = r#"{"op": "Summary"}"#;
        let op: LedgerOp = serde_json::from_str(json).unwrap();
        assert!(op.is_read_only());
    }

    #[test]
    fn parse_set_deal_stage() {
        let json = r#"{
            "op": "SetDealStage",
            "params": {
                "line_id": "rev-3",
                "stage": {"stage": "Pipeline", "win_probability_pct": 60.0}
            }
        }"#;
        let op: LedgerOp = serde_json::from_str(json).unwrap();
        match op {
            LedgerOp::SetDealStage { ref stage, .. } => {
                assert_eq!(
                    *stage,
                    DealStage::Pipeline {
                        win_probability_pct: 60.0
                    }
                );
            }
            _ => panic!("wrong variant"),
        }
        assert!(op.is_mutation());
    }

    #[test]
    fn invalid_op_is_rejected() {
        let json = r#"{"op": "DropAllLedgers", "params": {}}"#;
        let result: Result<LedgerOp, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_ledger_name_is_rejected() {
        let json = r#"{
            "op": "UpdateField",
            "params": {
                "ledger": "payroll",
                "line_id": "x",
                "field": "y",
                "value": "1"
            }
        }"#;
        let result: Result<LedgerOp, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn all_ops_described() {
        let ops = vec![
            LedgerOp::Snapshot,
            LedgerOp::Summary,
            LedgerOp::LineValues,
            LedgerOp::UpdateField {
                ledger: LedgerName::Opex,
                line_id: "opex-1".into(),
                field: "monthly_cost".into(),
                value: "5000".into(),
            },
            LedgerOp::SetDealStage {
                line_id: "rev-1".into(),
                stage: DealStage::Existing {
                    retention: Retention::default(),
                },
            },
            LedgerOp::SetFiscalYear { year: 2026 },
        ];
        for op in &ops {
            assert!(!op.describe().is_empty(), "empty description for {op:?}");
        }
    }
}
