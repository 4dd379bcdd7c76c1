//! Commands that read or edit the report session directly.

use std::io::Read;

use corep_engine::{
    AuditRecord, BaselineToggle, FieldId, ReconcileError, ReportSession, UpdateSource,
};
use corep_io::csv::{format_amount, format_delta};
use corep_protocol::{AnalysisResponse, WireFieldUpdate};

use crate::{BaselineAction, CliError, Context, SourceArg};

impl From<SourceArg> for UpdateSource {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Chat => UpdateSource::Chat,
            SourceArg::Upload => UpdateSource::Upload,
        }
    }
}

// ── fields ──────────────────────────────────────────────────────────

pub fn cmd_fields() -> Result<(), CliError> {
    for field in FieldId::ALL {
        println!("{:<24} {:<6} {}", field.as_str(), field.risk_weight(), field.display_label());
    }
    Ok(())
}

// ── show ────────────────────────────────────────────────────────────

pub fn cmd_show(ctx: &Context, json: bool) -> Result<(), CliError> {
    let session = ctx.load_session()?;
    if json {
        println!("{}", show_json(&session));
    } else {
        print!("{}", render_table(&session, &ctx.settings.export.unit_suffix, &ctx.settings.export.currency));
    }
    Ok(())
}

fn show_json(session: &ReportSession) -> serde_json::Value {
    let fields: Vec<serde_json::Value> = FieldId::ALL
        .into_iter()
        .map(|field| {
            let mut row = serde_json::json!({
                "field_id": field.as_str(),
                "label": field.display_label(),
                "risk_weight": field.risk_weight(),
                "value": session.state().get(field),
            });
            if session.has_baseline() {
                row["delta"] = serde_json::json!(session.diff(field));
            }
            row
        })
        .collect();

    serde_json::json!({
        "fields": fields,
        "baseline_locked": session.has_baseline(),
        "audit": session.audit(),
    })
}

fn render_table(session: &ReportSession, unit: &str, currency: &str) -> String {
    let mut out = String::new();
    out.push_str("COREP: Own Funds (C 01.00)\n\n");
    out.push_str(&format!(
        "{:<34} {:<12} {:<16} {}\n",
        "Exposure Class",
        "Risk Weight",
        format!("Value ({currency})"),
        if session.has_baseline() { "Change" } else { "" }
    ));

    let highlighted = session.audit().map(|a| a.field_id);
    for (field, value) in session.state().iter() {
        let marker = if highlighted == Some(field) { "*" } else { " " };
        let value = value.map(|v| format_amount(v, unit)).unwrap_or_else(|| "-".to_string());
        // Zero deltas are suppressed in the projection
        let delta = session
            .deltas()
            .and_then(|ds| ds.into_iter().find(|d| d.field == field))
            .filter(|d| d.is_visible())
            .map(|d| format_delta(d.delta, unit))
            .unwrap_or_default();
        out.push_str(&format!(
            "{marker}{:<33} {:<12} {:<16} {delta}\n",
            field.display_label(),
            field.risk_weight(),
            value,
        ));
    }

    out.push('\n');
    out.push_str(if session.has_baseline() { "Baseline: locked\n" } else { "Baseline: none\n" });
    out.push('\n');
    out.push_str(&render_audit(session.audit()));
    out
}

fn render_audit(audit: Option<&AuditRecord>) -> String {
    let Some(audit) = audit else {
        return "Audit trail: no updates yet.\n".to_string();
    };
    let source = match &audit.source_page {
        Some(page) => format!("{} (page {page})", audit.source),
        None => format!("{} (no document source)", audit.source),
    };
    format!(
        "Audit trail\n  Field updated: {}\n  Rule applied:  {}\n  Reasoning:     {}\n  Source:        {}\n",
        audit.field_id, audit.rule_ref, audit.reasoning, source
    )
}

// ── apply ───────────────────────────────────────────────────────────

pub fn cmd_apply(ctx: &Context, payload: &str, source: SourceArg) -> Result<(), CliError> {
    let text = if payload == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::args(format!("cannot read stdin: {e}")))?;
        buf
    } else {
        payload.to_string()
    };

    let response = parse_payload(&text)?;
    apply_response(ctx, response, source.into())
}

/// Accept either a bare field update or a full assistant response.
fn parse_payload(text: &str) -> Result<AnalysisResponse, CliError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| CliError::reconcile(ReconcileError::MalformedInput(format!("invalid JSON: {e}"))))?;

    let malformed = |e: serde_json::Error| CliError::reconcile(ReconcileError::MalformedInput(e.to_string()));
    if value.get("response_text").is_some() {
        serde_json::from_value(value).map_err(malformed)
    } else {
        let update: WireFieldUpdate = serde_json::from_value(value).map_err(malformed)?;
        Ok(AnalysisResponse {
            response_text: String::new(),
            data_update: Some(update),
        })
    }
}

/// Print the collaborator's prose, then reconcile its update (if any).
/// The session file is only rewritten after a successful apply.
pub fn apply_response(ctx: &Context, response: AnalysisResponse, source: UpdateSource) -> Result<(), CliError> {
    if !response.response_text.is_empty() {
        println!("{}", response.response_text);
    }
    let Some(update) = response.data_update else {
        tracing::info!("response carried no field update");
        return Ok(());
    };

    let session = ctx.update_session(|session| {
        session.apply_wire(&update, source).map_err(CliError::reconcile)?;
        Ok(session.clone())
    })?;

    if let Some(audit) = session.audit() {
        let value = session
            .state()
            .get(audit.field_id)
            .map(|v| format_amount(v, &ctx.settings.export.unit_suffix))
            .unwrap_or_else(|| "unset".to_string());
        println!("updated {} = {} ({})", audit.field_id, value, audit.rule_ref);
    }
    Ok(())
}

// ── set ─────────────────────────────────────────────────────────────

pub fn cmd_set(ctx: &Context, field_id: &str, value: &str) -> Result<(), CliError> {
    let field = FieldId::parse(field_id).map_err(CliError::reconcile)?;
    let value = parse_amount(value)?;

    ctx.update_session(|session| session.apply_manual(field, value).map_err(CliError::reconcile))?;

    match value {
        Some(v) => println!("updated {} = {} (manual)", field, format_amount(v, &ctx.settings.export.unit_suffix)),
        None => println!("updated {} = unset (manual)", field),
    }
    Ok(())
}

fn parse_amount(raw: &str) -> Result<Option<f64>, CliError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("unset") {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(CliError::args(format!("invalid amount '{raw}'"))
            .with_hint("use a plain number like 12.5, or 'unset'")),
    }
}

// ── baseline ────────────────────────────────────────────────────────

pub fn cmd_baseline(ctx: &Context, action: BaselineAction) -> Result<(), CliError> {
    if let BaselineAction::Status = action {
        let status = if ctx.load_session()?.has_baseline() { "locked" } else { "none" };
        println!("baseline: {status}");
        return Ok(());
    }

    let message = ctx.update_session(|session| {
        Ok(match action {
            BaselineAction::Toggle | BaselineAction::Status => match session.toggle_baseline() {
                BaselineToggle::Locked => "baseline locked",
                BaselineToggle::Unlocked => "baseline unlocked",
            },
            BaselineAction::Lock => match session.lock_baseline() {
                Some(_) => "baseline replaced",
                None => "baseline locked",
            },
            BaselineAction::Unlock => match session.unlock_baseline() {
                Some(_) => "baseline unlocked",
                None => "no baseline to unlock",
            },
        })
    })?;
    println!("{message}");
    Ok(())
}

// ── diff ────────────────────────────────────────────────────────────

pub fn cmd_diff(ctx: &Context, field_id: Option<&str>, json: bool) -> Result<(), CliError> {
    let fields: Vec<FieldId> = match field_id {
        Some(id) => vec![FieldId::parse(id).map_err(CliError::reconcile)?],
        None => FieldId::ALL.to_vec(),
    };
    let session = ctx.load_session()?;
    if !session.has_baseline() {
        tracing::warn!("no baseline locked; all deltas are 0");
    }

    if json {
        let deltas: Vec<serde_json::Value> = fields
            .iter()
            .map(|f| serde_json::json!({ "field_id": f.as_str(), "delta": session.diff(*f) }))
            .collect();
        println!(
            "{}",
            serde_json::json!({ "baseline_locked": session.has_baseline(), "deltas": deltas })
        );
        return Ok(());
    }

    let unit = &ctx.settings.export.unit_suffix;
    for field in fields {
        println!("{:<24} {}", field.as_str(), format_delta(session.diff(field), unit));
    }
    Ok(())
}

// ── clear ───────────────────────────────────────────────────────────

pub fn cmd_clear(ctx: &Context) -> Result<(), CliError> {
    ctx.update_session(|session| {
        session.clear();
        Ok(())
    })?;
    println!("session cleared");
    Ok(())
}
