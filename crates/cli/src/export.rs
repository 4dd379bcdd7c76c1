//! `corep export` - serialise the report for downstream consumers.

use std::path::{Path, PathBuf};

use corep_io::{ExportFormat, ExportOptions};

use crate::{CliError, Context, FormatArg};

pub fn cmd_export(
    ctx: &Context,
    output: Option<PathBuf>,
    format: FormatArg,
    fingerprint: bool,
) -> Result<(), CliError> {
    let export = &ctx.settings.export;
    let opts = ExportOptions {
        delimiter: export.delimiter_byte().map_err(CliError::config)?,
        currency: export.currency.clone(),
        unit_suffix: export.unit_suffix.clone(),
    };
    let format = match format {
        FormatArg::Csv => ExportFormat::Csv,
        FormatArg::Json => ExportFormat::Json,
    };

    let session = ctx.load_session()?;
    let output = output.unwrap_or_else(|| default_output(&export.filename, format));

    if output.as_os_str() == "-" {
        let text = corep_io::serialize(&session, format, &opts).map_err(CliError::io)?;
        print!("{text}");
        if fingerprint {
            eprintln!("{}", corep_io::fingerprint(text.as_bytes()));
        }
        return Ok(());
    }

    let text = corep_io::export(&session, &output, format, &opts).map_err(CliError::io)?;
    eprintln!("wrote {}", output.display());
    if fingerprint {
        println!("{}", corep_io::fingerprint(text.as_bytes()));
    }
    Ok(())
}

/// Configured file name, with the extension matching the format.
fn default_output(filename: &str, format: ExportFormat) -> PathBuf {
    let ext = match format {
        ExportFormat::Csv => "csv",
        ExportFormat::Json => "json",
    };
    Path::new(filename).with_extension(ext)
}
