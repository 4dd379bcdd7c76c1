//! Scenario deltas against the locked baseline.
//!
//! Pure functions over `ReportState` + `BaselineSnapshot`; the session
//! methods at the bottom are thin wrappers. No rounding: the delta is the
//! exact signed `f64` difference, zero included.

use crate::engine::ReportSession;
use crate::field::FieldId;
use crate::model::{BaselineSnapshot, FieldDelta, ReportState};

/// `current - baseline` for one field, unset counting as zero.
/// Without a baseline the answer is 0.
pub fn field_delta(state: &ReportState, baseline: Option<&BaselineSnapshot>, field: FieldId) -> f64 {
    match baseline {
        Some(b) => state.numeric(field) - b.numeric(field),
        None => 0.0,
    }
}

/// One entry per catalogue field, canonical order. `None` without a baseline.
pub fn all_deltas(state: &ReportState, baseline: Option<&BaselineSnapshot>) -> Option<Vec<FieldDelta>> {
    let baseline = baseline?;
    Some(
        FieldId::ALL
            .into_iter()
            .map(|field| FieldDelta {
                field,
                current: state.get(field),
                baseline: baseline.state().get(field),
                delta: state.numeric(field) - baseline.numeric(field),
            })
            .collect(),
    )
}

impl ReportSession {
    pub fn diff(&self, field: FieldId) -> f64 {
        field_delta(self.state(), self.baseline(), field)
    }

    pub fn deltas(&self) -> Option<Vec<FieldDelta>> {
        all_deltas(self.state(), self.baseline())
    }

    /// Fields whose value moved since the baseline was locked.
    pub fn changed_fields(&self) -> Vec<FieldId> {
        self.deltas()
            .unwrap_or_default()
            .into_iter()
            .filter(FieldDelta::is_visible)
            .map(|d| d.field)
            .collect()
    }
}
