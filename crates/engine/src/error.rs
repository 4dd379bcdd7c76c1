use std::fmt;

/// Rejection of an incoming field update. State is never mutated when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The update names a field identifier outside the report catalogue.
    UnknownField(String),
    /// The payload is missing a required key or carries an unusable value.
    MalformedInput(String),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField(id) => write!(f, "unknown field: {id}"),
            Self::MalformedInput(msg) => write!(f, "malformed update: {msg}"),
        }
    }
}

impl std::error::Error for ReconcileError {}
