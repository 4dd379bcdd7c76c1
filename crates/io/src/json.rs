// JSON export of the Own Funds table

use serde::Serialize;

use corep_engine::diff::field_delta;
use corep_engine::{BaselineSnapshot, FieldId, ReportState};

use crate::{ExportOptions, IoError};

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    currency: &'a str,
    unit: &'a str,
    baseline_locked: bool,
    rows: Vec<ExportRow>,
}

#[derive(Debug, Serialize)]
struct ExportRow {
    field_id: &'static str,
    label: &'static str,
    risk_weight: &'static str,
    /// `null` while the field is unset.
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delta: Option<f64>,
}

/// Same rows as the CSV export, as a pretty-printed JSON object.
pub fn serialize(
    state: &ReportState,
    baseline: Option<&BaselineSnapshot>,
    opts: &ExportOptions,
) -> Result<String, IoError> {
    let rows = FieldId::ALL
        .into_iter()
        .map(|field| ExportRow {
            field_id: field.as_str(),
            label: field.export_label(),
            risk_weight: field.risk_weight(),
            value: state.get(field),
            delta: baseline.map(|_| field_delta(state, baseline, field)),
        })
        .collect();

    let doc = ExportDocument {
        currency: &opts.currency,
        unit: &opts.unit_suffix,
        baseline_locked: baseline.is_some(),
        rows,
    };

    let mut text = serde_json::to_string_pretty(&doc).map_err(|e| IoError::Export(e.to_string()))?;
    text.push('\n');
    Ok(text)
}
