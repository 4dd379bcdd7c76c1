use corep_protocol::WireFieldUpdate;

use crate::error::ReconcileError;
use crate::field::FieldId;
use crate::model::{AuditRecord, BaselineSnapshot, BaselineToggle, ReportState, UpdateSource};
use crate::update::FieldUpdate;

/// Session-scoped owner of the report state, the audit slot and the
/// optional baseline. All mutation goes through the methods below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSession {
    state: ReportState,
    audit: Option<AuditRecord>,
    baseline: Option<BaselineSnapshot>,
}

impl ReportSession {
    /// Empty session: every field unset, no audit, no baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a session from persisted parts.
    pub fn from_parts(
        state: ReportState,
        audit: Option<AuditRecord>,
        baseline: Option<BaselineSnapshot>,
    ) -> Self {
        Self { state, audit, baseline }
    }

    pub fn state(&self) -> &ReportState {
        &self.state
    }

    pub fn audit(&self) -> Option<&AuditRecord> {
        self.audit.as_ref()
    }

    pub fn baseline(&self) -> Option<&BaselineSnapshot> {
        self.baseline.as_ref()
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    /// Apply one validated update. Last write wins: the field takes the new
    /// value and the audit slot is replaced, whatever the previous source.
    /// Amounts beyond `MAX_AMOUNT` are rejected without touching state.
    pub fn apply(&mut self, update: FieldUpdate) -> Result<(), ReconcileError> {
        update.check_amount().inspect_err(|e| {
            log::warn!("rejected {} update: {e}", update.source);
        })?;
        log::debug!(
            "apply {} = {:?} (source={}, rule={:?})",
            update.field_id,
            update.value,
            update.source,
            update.rule_ref
        );
        self.state.write(update.field_id, update.value);
        self.audit = Some(update.audit_record());
        Ok(())
    }

    /// Validate a collaborator payload, then apply it. On rejection nothing
    /// is touched.
    pub fn apply_wire(&mut self, wire: &WireFieldUpdate, source: UpdateSource) -> Result<(), ReconcileError> {
        let update = FieldUpdate::from_wire(wire, source).inspect_err(|e| {
            log::warn!("rejected {source} update: {e}");
        })?;
        self.apply(update)
    }

    /// Direct cell edit.
    pub fn apply_manual(&mut self, field: FieldId, value: Option<f64>) -> Result<(), ReconcileError> {
        self.apply(FieldUpdate::manual(field, value))
    }

    /// Reset every field, drop the audit record and the baseline. Idempotent.
    pub fn clear(&mut self) {
        log::debug!("clear session");
        self.state = ReportState::new();
        self.audit = None;
        self.baseline = None;
    }

    // -----------------------------------------------------------------------
    // Baseline
    // -----------------------------------------------------------------------

    /// Capture the current state as the baseline. An existing baseline is
    /// replaced and returned.
    pub fn lock_baseline(&mut self) -> Option<BaselineSnapshot> {
        log::debug!("lock baseline (replacing={})", self.baseline.is_some());
        self.baseline.replace(BaselineSnapshot::capture(&self.state))
    }

    /// Discard the baseline, returning it. No-op when none is locked.
    pub fn unlock_baseline(&mut self) -> Option<BaselineSnapshot> {
        log::debug!("unlock baseline (present={})", self.baseline.is_some());
        self.baseline.take()
    }

    /// Lock when unlocked, unlock when locked.
    pub fn toggle_baseline(&mut self) -> BaselineToggle {
        if self.unlock_baseline().is_some() {
            BaselineToggle::Unlocked
        } else {
            self.lock_baseline();
            BaselineToggle::Locked
        }
    }
}
