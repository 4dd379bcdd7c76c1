//! `corep ask` / `corep upload` - collaborator round trips.
//!
//! The request runs to completion before the session file is even read, so
//! an abandoned or failed call never touches the report.

use std::path::Path;
use std::time::Duration;

use corep_assistant::{Assistant, HttpAssistant};
use corep_engine::UpdateSource;

use crate::report::apply_response;
use crate::{CliError, Context};

fn assistant(ctx: &Context) -> Result<HttpAssistant, CliError> {
    let settings = &ctx.settings.assistant;
    HttpAssistant::new(&settings.endpoint, Duration::from_secs(settings.timeout_secs))
        .map_err(CliError::assistant)
}

pub fn cmd_ask(ctx: &Context, query: &str) -> Result<(), CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::args("empty message"));
    }
    let response = assistant(ctx)?.analyze(query).map_err(CliError::assistant)?;
    apply_response(ctx, response, UpdateSource::Chat)
}

pub fn cmd_upload(ctx: &Context, file: &Path) -> Result<(), CliError> {
    if !file.is_file() {
        return Err(CliError::args(format!("{}: no such file", file.display())));
    }
    let response = assistant(ctx)?.upload(file).map_err(CliError::assistant)?;
    apply_response(ctx, response, UpdateSource::Upload)
}
