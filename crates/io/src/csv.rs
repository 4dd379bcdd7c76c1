// CSV export of the Own Funds table

use corep_engine::diff::field_delta;
use corep_engine::{BaselineSnapshot, FieldId, ReportState};

use crate::{ExportOptions, IoError};

/// Render the report as delimited text: a header row, then one row per
/// catalogue field in template order. The delta column only exists while a
/// baseline is locked.
pub fn serialize(
    state: &ReportState,
    baseline: Option<&BaselineSnapshot>,
    opts: &ExportOptions,
) -> Result<String, IoError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(opts.delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    let unit = opts.unit_label();
    let mut header = vec![
        "Exposure Class".to_string(),
        "Risk Weight".to_string(),
        format!("Value ({unit})"),
    ];
    if baseline.is_some() {
        header.push(format!("Change vs Baseline ({unit})"));
    }
    writer.write_record(&header).map_err(|e| IoError::Export(e.to_string()))?;

    for field in FieldId::ALL {
        let mut record = vec![
            field.export_label().to_string(),
            field.risk_weight().to_string(),
            format_amount(state.numeric(field), &opts.unit_suffix),
        ];
        if baseline.is_some() {
            record.push(format_delta(field_delta(state, baseline, field), &opts.unit_suffix));
        }
        writer.write_record(&record).map_err(|e| IoError::Export(e.to_string()))?;
    }

    let bytes = writer.into_inner().map_err(|e| IoError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| IoError::Export(e.to_string()))
}

/// Shortest round-trip form plus unit: `10m`, `7.5m`, `0m`.
pub fn format_amount(value: f64, unit_suffix: &str) -> String {
    // -0.0 would print as "-0"
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}{unit_suffix}")
}

/// Signed delta: `+5m`, `-2.5m`, `0m`.
pub fn format_delta(delta: f64, unit_suffix: &str) -> String {
    if delta > 0.0 {
        format!("+{delta}{unit_suffix}")
    } else {
        format_amount(delta, unit_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corep_engine::ReportSession;

    fn session_with(sovereign: Option<f64>, retail: Option<f64>) -> ReportSession {
        let mut session = ReportSession::new();
        session.apply_manual(FieldId::SovereignExposure, sovereign).unwrap();
        session.apply_manual(FieldId::RetailExposure, retail).unwrap();
        session
    }

    #[test]
    fn test_no_baseline_omits_delta_column() {
        let session = session_with(Some(10.0), None);
        let out = serialize(session.state(), session.baseline(), &ExportOptions::default()).unwrap();
        assert_eq!(
            out,
            "Exposure Class,Risk Weight,Value (GBP m)\n\
             Central Governments,0%,10m\n\
             Retail Exposures,75%,0m\n"
        );
    }

    #[test]
    fn test_baseline_adds_signed_delta() {
        let mut session = session_with(Some(10.0), Some(7.5));
        session.lock_baseline();
        session.apply_manual(FieldId::SovereignExposure, Some(15.0)).unwrap();
        session.apply_manual(FieldId::RetailExposure, Some(5.0)).unwrap();

        let out = serialize(session.state(), session.baseline(), &ExportOptions::default()).unwrap();
        assert_eq!(
            out,
            "Exposure Class,Risk Weight,Value (GBP m),Change vs Baseline (GBP m)\n\
             Central Governments,0%,15m,+5m\n\
             Retail Exposures,75%,5m,-2.5m\n"
        );
    }

    #[test]
    fn test_zero_delta_has_no_sign() {
        let mut session = session_with(Some(10.0), None);
        session.lock_baseline();
        let out = serialize(session.state(), session.baseline(), &ExportOptions::default()).unwrap();
        assert!(out.contains("Central Governments,0%,10m,0m\n"));
        assert!(out.contains("Retail Exposures,75%,0m,0m\n"));
    }

    #[test]
    fn test_custom_delimiter_and_unit() {
        let session = session_with(Some(1.25), Some(2.0));
        let opts = ExportOptions {
            delimiter: b';',
            currency: "EUR".into(),
            unit_suffix: String::new(),
        };
        let out = serialize(session.state(), session.baseline(), &opts).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Exposure Class;Risk Weight;Value (EUR)"));
        assert_eq!(lines.next(), Some("Central Governments;0%;1.25"));
        assert_eq!(lines.next(), Some("Retail Exposures;75%;2"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let mut session = session_with(Some(3.0), Some(4.0));
        session.lock_baseline();
        session.apply_manual(FieldId::RetailExposure, Some(1.0)).unwrap();
        let opts = ExportOptions::default();
        let a = serialize(session.state(), session.baseline(), &opts).unwrap();
        let b = serialize(session.state(), session.baseline(), &opts).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_amount(-0.0, "m"), "0m");
        assert_eq!(format_amount(1e6, "m"), "1000000m");
        assert_eq!(format_delta(0.5, ""), "+0.5");
        assert_eq!(format_delta(-3.0, "m"), "-3m");
    }
}
