//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (unspecified)                               |
//! | 2    | CLI usage error (bad args, unparseable value)             |
//! | 3    | Update names a field outside the report catalogue         |
//! | 4    | Update payload is malformed (missing field_id/value)      |
//! | 5    | Assistant backend call failed (network, HTTP, bad reply)  |
//! | 6    | Session or export file could not be read/written          |
//! | 7    | Settings file is invalid                                  |
//!
//! Every non-zero exit leaves the persisted session exactly as it was.

use corep_assistant::AssistantError;
use corep_engine::ReconcileError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Update referenced an unknown field identifier.
pub const EXIT_UNKNOWN_FIELD: u8 = 3;

/// Update payload missing `field_id` or `value`, or value unusable.
pub const EXIT_MALFORMED_INPUT: u8 = 4;

/// Chat or upload collaborator did not complete successfully.
pub const EXIT_COLLABORATOR: u8 = 5;

/// Session file or export file IO failure.
pub const EXIT_IO: u8 = 6;

/// Settings file could not be loaded.
pub const EXIT_CONFIG: u8 = 7;

/// Map a reconciliation rejection to its exit code.
pub fn reconcile_exit_code(err: &ReconcileError) -> u8 {
    match err {
        ReconcileError::UnknownField(_) => EXIT_UNKNOWN_FIELD,
        ReconcileError::MalformedInput(_) => EXIT_MALFORMED_INPUT,
    }
}

/// Every assistant failure is a collaborator failure; the variant only
/// changes the hint.
pub fn assistant_exit_code(_err: &AssistantError) -> u8 {
    EXIT_COLLABORATOR
}
