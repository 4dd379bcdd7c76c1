use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum IoError {
    /// Reading or writing a file failed.
    File { path: PathBuf, message: String },
    /// Building the export text failed.
    Export(String),
    /// A session file could not be decoded.
    SessionParse { path: PathBuf, message: String },
    /// A session file was written by an incompatible version.
    SessionVersion { path: PathBuf, found: u32 },
}

impl IoError {
    pub(crate) fn file(path: &std::path::Path, err: impl fmt::Display) -> Self {
        Self::File { path: path.to_path_buf(), message: err.to_string() }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Export(msg) => write!(f, "export failed: {msg}"),
            Self::SessionParse { path, message } => {
                write!(f, "{}: invalid session file: {message}", path.display())
            }
            Self::SessionVersion { path, found } => write!(
                f,
                "{}: session file version {found} is not supported (expected {})",
                path.display(),
                crate::SESSION_FILE_VERSION
            ),
        }
    }
}

impl std::error::Error for IoError {}
