// File I/O operations: report export and session persistence

pub mod csv;
pub mod error;
pub mod json;
pub mod session;

pub use error::IoError;

/// Session file format version.
/// Increment when the schema changes in a way that old versions can't read.
pub const SESSION_FILE_VERSION: u32 = 1;

use std::path::Path;

use corep_engine::ReportSession;

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Presentation knobs shared by every export format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub delimiter: u8,
    pub currency: String,
    pub unit_suffix: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            currency: "GBP".to_string(),
            unit_suffix: "m".to_string(),
        }
    }
}

impl ExportOptions {
    /// Unit in column headers, e.g. "GBP m".
    pub fn unit_label(&self) -> String {
        if self.unit_suffix.is_empty() {
            self.currency.clone()
        } else {
            format!("{} {}", self.currency, self.unit_suffix)
        }
    }
}

/// Serialise the session's report (with deltas when a baseline is locked).
pub fn serialize(session: &ReportSession, format: ExportFormat, opts: &ExportOptions) -> Result<String, IoError> {
    match format {
        ExportFormat::Csv => csv::serialize(session.state(), session.baseline(), opts),
        ExportFormat::Json => json::serialize(session.state(), session.baseline(), opts),
    }
}

/// Serialise and write to `path`.
pub fn export(session: &ReportSession, path: &Path, format: ExportFormat, opts: &ExportOptions) -> Result<String, IoError> {
    let text = serialize(session, format, opts)?;
    std::fs::write(path, &text).map_err(|e| IoError::file(path, e))?;
    log::debug!("exported {} bytes to {}", text.len(), path.display());
    Ok(text)
}

/// Content hash of an export, e.g. `sha256:ab12…`.
pub fn fingerprint(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    format!("sha256:{:x}", Sha256::digest(bytes))
}
