//! Desk protocol — request parsing, execution, and response formatting.
//!
//! The enforcement path for every edit:
//! 1. Form text → parse into a `LedgerOp` (reject if invalid)
//! 2. Validate parameters (reject if out of bounds)
//! 3. Apply against the ledger book
//! 4. Recompute the summary and return it in the same response
//! 5. Append an audit entry
//!
//! Step 4 is what makes an edit atomic from the consumer's side: the
//! mutation and the totals it produced arrive together, so no reader
//! ever pairs old totals with a new line.

use serde::{Deserialize, Serialize};

use planbook_engine::types::{BudgetSummary, LedgerSnapshot, LedgerValues};

use crate::book::LedgerBook;
use crate::error::{BridgeError, BridgeResult};
use crate::ops::{LedgerName, LedgerOp};

/// Earliest plan year the desk will move to.
const MIN_FISCAL_YEAR: i32 = 2000;
/// Latest plan year the desk will move to.
const MAX_FISCAL_YEAR: i32 = 2100;

/// A request from the form layer to the ledger desk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsRequest {
    /// The operation to perform.
    pub operation: LedgerOp,

    /// Request ID for tracking.
    pub request_id: String,

    /// Optional context: which screen or control produced the edit.
    pub context: Option<String>,
}

/// The operation's structured result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OpResult {
    SnapshotResult {
        snapshot: LedgerSnapshot,
    },
    SummaryResult {
        summary: BudgetSummary,
    },
    LineValuesResult {
        values: LedgerValues,
    },
    UpdatedResult {
        ledger: LedgerName,
        line_id: String,
        field: String,
    },
    StageChangedResult {
        line_id: String,
    },
    FiscalYearResult {
        year: i32,
    },
}

/// A response from the desk. Every response carries the summary as of
/// the moment the operation completed.
#[derive(Debug, Clone, Serialize)]
pub struct OpsResponse {
    pub result: OpResult,
    pub request_id: String,
    pub read_only: bool,
    pub summary: BudgetSummary,
}

/// Audit log entry, one per processed request.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub seq: u64,
    pub request_id: String,
    pub operation: String,
    pub was_mutation: bool,
    pub success: bool,
    pub error: Option<String>,
}

/// The desk — owns the book and runs the protocol against it.
pub struct Desk {
    book: LedgerBook,
    /// Audit log of all processed requests.
    pub audit_log: Vec<AuditEntry>,
    seq: u64,
}

impl Desk {
    pub fn new(book: LedgerBook) -> Self {
        Self {
            book,
            audit_log: Vec::new(),
            seq: 0,
        }
    }

    pub fn book(&self) -> &LedgerBook {
        &self.book
    }

    /// Parse raw form output into a validated request.
    ///
    /// First line of defense: text that doesn't parse into a valid
    /// operation never touches the book.
    pub fn parse_request(&self, raw_json: &str) -> BridgeResult<OpsRequest> {
        let request: OpsRequest = serde_json::from_str(raw_json)
            .map_err(|e| BridgeError::UnknownOperation(format!("failed to parse request: {e}")))?;
        self.validate_operation(&request.operation)?;
        Ok(request)
    }

    /// Validate operation parameters that don't need the book.
    fn validate_operation(&self, op: &LedgerOp) -> BridgeResult<()> {
        if let LedgerOp::SetFiscalYear { year } = op {
            if !(MIN_FISCAL_YEAR..=MAX_FISCAL_YEAR).contains(year) {
                return Err(BridgeError::InvalidParameter {
                    op: "SetFiscalYear".into(),
                    reason: format!("year={year} outside [{MIN_FISCAL_YEAR}, {MAX_FISCAL_YEAR}]"),
                });
            }
        }
        // Field-level and stage-level checks live in the book, next to
        // the state they protect.
        Ok(())
    }

    /// Process a validated request: apply, audit, respond.
    pub fn process(&mut self, request: &OpsRequest) -> BridgeResult<OpsResponse> {
        self.validate_operation(&request.operation)?;

        let result = self.apply(&request.operation);

        self.seq += 1;
        self.audit_log.push(AuditEntry {
            seq: self.seq,
            request_id: request.request_id.clone(),
            operation: request.operation.describe(),
            was_mutation: request.operation.is_mutation(),
            success: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        });

        if request.operation.is_mutation() {
            log::info!(
                "request_id={} {}: {}",
                request.request_id,
                if result.is_ok() { "applied" } else { "rejected" },
                request.operation.describe()
            );
        }

        Ok(OpsResponse {
            result: result?,
            request_id: request.request_id.clone(),
            read_only: request.operation.is_read_only(),
            summary: self.book.summary(),
        })
    }

    fn apply(&mut self, op: &LedgerOp) -> BridgeResult<OpResult> {
        match op {
            LedgerOp::Snapshot => Ok(OpResult::SnapshotResult {
                snapshot: self.book.snapshot().clone(),
            }),
            LedgerOp::Summary => Ok(OpResult::SummaryResult {
                summary: self.book.summary(),
            }),
            LedgerOp::LineValues => Ok(OpResult::LineValuesResult {
                values: self.book.line_values(),
            }),
            LedgerOp::UpdateField {
                ledger,
                line_id,
                field,
                value,
            } => {
                self.book.update_field(*ledger, line_id, field, value)?;
                Ok(OpResult::UpdatedResult {
                    ledger: *ledger,
                    line_id: line_id.clone(),
                    field: field.clone(),
                })
            }
            LedgerOp::SetDealStage { line_id, stage } => {
                self.book.set_deal_stage(line_id, stage.clone())?;
                Ok(OpResult::StageChangedResult {
                    line_id: line_id.clone(),
                })
            }
            LedgerOp::SetFiscalYear { year } => {
                self.book.set_fiscal_year(*year);
                Ok(OpResult::FiscalYearResult { year: *year })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planbook_engine::types::{DealStage, Retention, RevenueKind, RevenueLine};
    use planbook_engine::FiscalYear;

    fn desk() -> Desk {
        Desk::new(LedgerBook::new(LedgerSnapshot {
            year: FiscalYear(2025),
            revenue: vec![RevenueLine {
                id: "rev-1".into(),
                client: "Acme".into(),
                kind: RevenueKind::Recurring,
                stage: DealStage::Existing {
                    retention: Retention {
                        churn_pct: 10.0,
                        upsell_pct: 20.0,
                    },
                },
                units: 100.0,
                unit_price: 500.0,
            }],
            ..LedgerSnapshot::default()
        }))
    }

    fn request(op: LedgerOp) -> OpsRequest {
        OpsRequest {
            operation: op,
            request_id: "req-001".into(),
            context: None,
        }
    }

    #[test]
    fn parse_valid_request() {
        let d = desk();
        let json = r#"{
            "operation": {"op": "Summary"},
            "request_id": "req-001",
            "context": "budget screen"
        }"#;
        assert!(d.parse_request(json).is_ok());
    }

    #[test]
    fn reject_non_json() {
        let d = desk();
        assert!(d.parse_request("not json at all").is_err());
    }

    #[test]
    fn reject_absurd_fiscal_year() {
        let d = desk();
        let result = d.validate_operation(&LedgerOp::SetFiscalYear { year: 12 });
        assert!(matches!(result, Err(BridgeError::InvalidParameter { .. })));
    }

    #[test]
    fn every_response_carries_the_current_summary() {
        let mut d = desk();

        let read = d.process(&request(LedgerOp::Summary)).unwrap();
        assert!((read.summary.total_revenue - 648_000.0).abs() < 1e-6);

        let edit = d
            .process(&request(LedgerOp::UpdateField {
                ledger: LedgerName::Revenue,
                line_id: "rev-1".into(),
                field: "units".into(),
                value: "200".into(),
            }))
            .unwrap();
        // The mutation and the totals it produced arrive together.
        assert!(!edit.read_only);
        assert!((edit.summary.total_revenue - 1_296_000.0).abs() < 1e-6);
    }

    #[test]
    fn coercion_round_trip_through_the_protocol() {
        let mut d = desk();
        d.process(&request(LedgerOp::UpdateField {
            ledger: LedgerName::Revenue,
            line_id: "rev-1".into(),
            field: "unit_price".into(),
            value: "abc".into(),
        }))
        .unwrap();

        let snap = d.process(&request(LedgerOp::Snapshot)).unwrap();
        match snap.result {
            OpResult::SnapshotResult { snapshot } => {
                assert_eq!(snapshot.revenue[0].unit_price, 0.0)
            }
            _ => panic!("wrong result variant"),
        }
        assert_eq!(snap.summary.total_revenue, 0.0);
    }

    #[test]
    fn failed_edits_are_audited_and_leave_state_alone() {
        let mut d = desk();
        let result = d.process(&request(LedgerOp::UpdateField {
            ledger: LedgerName::Revenue,
            line_id: "rev-1".into(),
            field: "churn_pct".into(),
            value: "500".into(),
        }));
        assert!(result.is_err());

        assert_eq!(d.audit_log.len(), 1);
        assert!(!d.audit_log[0].success);
        assert!(d.audit_log[0].error.as_ref().unwrap().contains("churn_pct"));
        // Book unchanged.
        assert!((d.book().summary().total_revenue - 648_000.0).abs() < 1e-6);
    }

    #[test]
    fn audit_log_tracks_reads_and_mutations() {
        let mut d = desk();
        d.process(&request(LedgerOp::Summary)).unwrap();
        d.process(&request(LedgerOp::SetFiscalYear { year: 2026 }))
            .unwrap();

        assert_eq!(d.audit_log.len(), 2);
        assert!(!d.audit_log[0].was_mutation);
        assert!(d.audit_log[1].was_mutation);
        assert_eq!(d.audit_log[1].seq, 2);
    }

    #[test]
    fn full_round_trip() {
        let mut d = desk();
        let json = r#"{
            "operation": {
                "op": "UpdateField",
                "params": {
                    "ledger": "revenue",
                    "line_id": "rev-1",
                    "field": "upsell_pct",
                    "value": "25"
                }
            },
            "request_id": "rt-001",
            "context": null
        }"#;
        let req = d.parse_request(json).unwrap();
        let resp = d.process(&req).unwrap();

        assert_eq!(resp.request_id, "rt-001");
        assert!(!resp.read_only);
        // 600,000 × 0.9 × 1.25
        assert!((resp.summary.total_revenue - 675_000.0).abs() < 1e-6);
    }
}
