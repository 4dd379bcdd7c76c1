//! `corep-engine` - field-update reconciliation and scenario diffs for the
//! COREP Own Funds report.
//!
//! Pure engine crate: receives validated or wire-level updates, owns the
//! canonical report state. No CLI, network or file IO.

pub mod diff;
pub mod engine;
pub mod error;
pub mod field;
pub mod model;
pub mod update;

pub use engine::ReportSession;
pub use error::ReconcileError;
pub use field::FieldId;
pub use model::{AuditRecord, BaselineSnapshot, BaselineToggle, FieldDelta, ReportState, UpdateSource};
pub use update::{FieldUpdate, MAX_AMOUNT};
