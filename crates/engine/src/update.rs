//! Typed field updates and validation of collaborator payloads.

use corep_protocol::WireFieldUpdate;

use crate::error::ReconcileError;
use crate::field::FieldId;
use crate::model::{AuditRecord, UpdateSource};

/// Rule reference recorded for edits typed into the table.
pub const MANUAL_RULE_REF: &str = "Manual Override";

/// Reasoning recorded for edits typed into the table.
pub const MANUAL_REASONING: &str = "Value entered directly in the report table";

/// Largest accepted magnitude, in report units. Any two accepted amounts
/// have a finite difference, so deltas never overflow.
pub const MAX_AMOUNT: f64 = 1e15;

/// A validated update, ready for reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub field_id: FieldId,
    /// `None` requests that the field return to unset.
    pub value: Option<f64>,
    pub rule_ref: String,
    pub reasoning: String,
    pub source_page: Option<String>,
    pub source: UpdateSource,
}

impl FieldUpdate {
    /// Synthetic update for a direct cell edit.
    pub fn manual(field_id: FieldId, value: Option<f64>) -> Self {
        Self {
            field_id,
            value,
            rule_ref: MANUAL_RULE_REF.to_string(),
            reasoning: MANUAL_REASONING.to_string(),
            source_page: None,
            source: UpdateSource::Manual,
        }
    }

    /// Validate a collaborator payload.
    ///
    /// Missing keys are checked before the identifier is looked up, so a
    /// payload without `value` is `MalformedInput` even if its field is
    /// unknown.
    pub fn from_wire(wire: &WireFieldUpdate, source: UpdateSource) -> Result<Self, ReconcileError> {
        let raw_id = match wire.field_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(ReconcileError::MalformedInput("missing field_id".into())),
        };
        let raw_value = wire
            .value
            .as_ref()
            .ok_or_else(|| ReconcileError::MalformedInput(format!("{raw_id}: missing value")))?;
        let value = parse_value(raw_id, raw_value)?;
        let field_id = FieldId::parse(raw_id)?;

        Ok(Self {
            field_id,
            value,
            rule_ref: wire.rule_ref.clone().unwrap_or_default(),
            reasoning: wire.reasoning.clone().unwrap_or_default(),
            source_page: wire.source_page.clone().filter(|p| !p.trim().is_empty()),
            source,
        })
    }

    /// Reject amounts that are non-finite or beyond [`MAX_AMOUNT`].
    pub fn check_amount(&self) -> Result<(), ReconcileError> {
        match self.value {
            Some(v) => check_amount(self.field_id.as_str(), v).map(|_| ()),
            None => Ok(()),
        }
    }

    pub(crate) fn audit_record(&self) -> AuditRecord {
        AuditRecord {
            field_id: self.field_id,
            rule_ref: self.rule_ref.clone(),
            reasoning: self.reasoning.clone(),
            source_page: self.source_page.clone(),
            source: self.source,
        }
    }
}

fn parse_value(raw_id: &str, value: &serde_json::Value) -> Result<Option<f64>, ReconcileError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(v) => check_amount(raw_id, v).map(Some),
            None => Err(ReconcileError::MalformedInput(format!("{raw_id}: value {n} is not a finite amount"))),
        },
        other => Err(ReconcileError::MalformedInput(format!(
            "{raw_id}: value must be a number or null, got {other}"
        ))),
    }
}

fn check_amount(raw_id: &str, value: f64) -> Result<f64, ReconcileError> {
    if !value.is_finite() {
        return Err(ReconcileError::MalformedInput(format!("{raw_id}: value {value} is not a finite amount")));
    }
    if value.abs() > MAX_AMOUNT {
        return Err(ReconcileError::MalformedInput(format!(
            "{raw_id}: value {value} exceeds the {MAX_AMOUNT:e} limit"
        )));
    }
    Ok(value)
}
