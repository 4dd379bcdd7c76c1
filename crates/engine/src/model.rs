use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::FieldId;

// ---------------------------------------------------------------------------
// Report state
// ---------------------------------------------------------------------------

/// Canonical field values. A field absent from the map is unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportState {
    values: BTreeMap<FieldId, f64>,
}

impl ReportState {
    /// All fields unset.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: FieldId) -> Option<f64> {
        self.values.get(&field).copied()
    }

    /// Value used for arithmetic: unset counts as zero.
    pub fn numeric(&self, field: FieldId) -> f64 {
        self.get(field).unwrap_or(0.0)
    }

    pub fn is_set(&self, field: FieldId) -> bool {
        self.values.contains_key(&field)
    }

    /// True when every field is unset.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Every catalogue field in canonical order, set or not.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, Option<f64>)> + '_ {
        FieldId::ALL.into_iter().map(|f| (f, self.get(f)))
    }

    pub(crate) fn write(&mut self, field: FieldId, value: Option<f64>) {
        match value {
            Some(v) => {
                self.values.insert(field, v);
            }
            None => {
                self.values.remove(&field);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Where an update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    /// Inferred from an analyst's chat message.
    Chat,
    /// Inferred from an uploaded document.
    Upload,
    /// Typed directly into the report table.
    Manual,
}

impl std::fmt::Display for UpdateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::Upload => write!(f, "upload"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Provenance of the most recently applied update. Single slot: each
/// successful reconciliation replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub field_id: FieldId,
    pub rule_ref: String,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_page: Option<String>,
    pub source: UpdateSource,
}

impl AuditRecord {
    /// False means system-derived, with no document behind it.
    pub fn is_document_sourced(&self) -> bool {
        self.source_page.is_some()
    }
}

// ---------------------------------------------------------------------------
// Baseline
// ---------------------------------------------------------------------------

/// Frozen copy of the report at lock time. Exposes no mutators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselineSnapshot {
    captured: ReportState,
}

impl BaselineSnapshot {
    pub(crate) fn capture(state: &ReportState) -> Self {
        Self { captured: state.clone() }
    }

    pub fn state(&self) -> &ReportState {
        &self.captured
    }

    pub fn numeric(&self, field: FieldId) -> f64 {
        self.captured.numeric(field)
    }
}

/// Outcome of a baseline toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineToggle {
    Locked,
    Unlocked,
}

// ---------------------------------------------------------------------------
// Deltas
// ---------------------------------------------------------------------------

/// Per-field comparison against the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldDelta {
    pub field: FieldId,
    pub current: Option<f64>,
    pub baseline: Option<f64>,
    pub delta: f64,
}

impl FieldDelta {
    /// Projections suppress zero deltas.
    pub fn is_visible(&self) -> bool {
        self.delta != 0.0
    }
}
