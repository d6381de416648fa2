//! planbook-bridge — the constraint layer between editable forms and
//! the budget engine.
//!
//! The UI emits text. This bridge parses that text into exactly one of
//! a small set of valid ledger operations, applies it against the
//! ledger book, and returns a structured result carrying the freshly
//! recomputed summary.
//!
//! The type system does the guarding:
//! - Every operation is an enum variant with validated parameters
//! - Every response is a structured type, not free-form text
//! - An invalid operation is rejected at parse time, not mid-mutation
//! - A mutation and the summary it produces travel in one response, so
//!   no consumer can observe a half-updated book

pub mod book;
pub mod error;
pub mod ops;
pub mod protocol;

pub use book::LedgerBook;
pub use error::{BridgeError, BridgeResult};
pub use ops::{LedgerName, LedgerOp};
pub use protocol::{AuditEntry, Desk, OpResult, OpsRequest, OpsResponse};
