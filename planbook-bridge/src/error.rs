//! Bridge error types.
//!
//! Every failure mode has a named variant. No stringly-typed errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Unknown ledger: {0}")]
    UnknownLedger(String),

    #[error("No line '{line_id}' in the {ledger} ledger")]
    UnknownLine { ledger: String, line_id: String },

    #[error("The {ledger} ledger has no field '{field}'")]
    UnknownField { ledger: String, field: String },

    #[error("Field '{field}' does not apply to a {stage} line")]
    FieldNotApplicable { field: String, stage: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid parameter for {op}: {reason}")]
    InvalidParameter { op: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
