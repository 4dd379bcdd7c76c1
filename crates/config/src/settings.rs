// Application settings
// Loaded from ~/.config/corep/settings.toml

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `assistant.endpoint`.
pub const ASSISTANT_URL_ENV: &str = "COREP_ASSISTANT_URL";

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file exists but could not be read.
    Read { path: PathBuf, message: String },
    /// TOML parse / deserialization error.
    Parse { path: PathBuf, message: String },
    /// A value parsed but is unusable.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Parse { path, message } => write!(f, "invalid settings in {}: {message}", path.display()),
            Self::Invalid(msg) => write!(f, "invalid setting: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// `~/.config/corep`, or `./.corep` when no config directory exists.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("corep"))
        .unwrap_or_else(|| PathBuf::from(".corep"))
}

/// Assistant backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Base URL of the inference backend
    pub endpoint: String,

    /// Whole-request timeout; inference can be slow
    pub timeout_secs: u64,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
            timeout_secs: 120,
        }
    }
}

const ALLOWED_DELIMITERS: &[u8] = b",;|\t";

/// Export presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// File name used when no output path is given
    pub filename: String,

    /// Single-character field separator
    pub delimiter: String,

    pub currency: String,

    /// Appended to every amount ("m" = millions)
    pub unit_suffix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            filename: "corep_own_funds_report.csv".to_string(),
            delimiter: ",".to_string(),
            currency: "GBP".to_string(),
            unit_suffix: "m".to_string(),
        }
    }
}

impl ExportSettings {
    /// The delimiter as a single byte. Only separators that can never occur
    /// in a label, risk weight or amount are accepted, so no cell is quoted.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        let byte = match self.delimiter.as_bytes() {
            [b] if ALLOWED_DELIMITERS.contains(b) => *b,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "export.delimiter must be one of ',' ';' '|' or a tab, got {:?}",
                    self.delimiter
                )))
            }
        };
        let sep = byte as char;
        if self.currency.contains(sep) || self.unit_suffix.contains(sep) {
            return Err(ConfigError::Invalid(format!(
                "export.currency and export.unit_suffix must not contain the delimiter {:?}",
                self.delimiter
            )));
        }
        Ok(byte)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Session file; defaults to `<config dir>/session.json`
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub assistant: AssistantSettings,
    pub export: ExportSettings,
    pub session: SessionSettings,
}

impl Settings {
    /// Default settings file location.
    pub fn path() -> PathBuf {
        config_dir().join("settings.toml")
    }

    /// Load from `path` (or the default location). A missing file yields
    /// defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_path = Self::path();
        let path = path.unwrap_or(&default_path);
        let mut settings = if path.exists() {
            let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            Self::from_toml(path, &text)?
        } else {
            Self::default()
        };
        settings.apply_env(std::env::var(ASSISTANT_URL_ENV).ok());
        Ok(settings)
    }

    fn from_toml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.export.delimiter_byte()?;
        Ok(settings)
    }

    fn apply_env(&mut self, assistant_url: Option<String>) {
        if let Some(url) = assistant_url.filter(|u| !u.trim().is_empty()) {
            self.assistant.endpoint = url;
        }
    }

    /// Effective session file location.
    pub fn session_path(&self) -> PathBuf {
        self.session
            .path
            .clone()
            .unwrap_or_else(|| config_dir().join("session.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.assistant.endpoint, "http://localhost:8000");
        assert_eq!(s.export.filename, "corep_own_funds_report.csv");
        assert_eq!(s.export.delimiter_byte().unwrap(), b',');
        assert!(s.session_path().ends_with("session.json"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let s = Settings::from_toml(
            Path::new("settings.toml"),
            "[export]\ndelimiter = \";\"\n[session]\npath = \"/tmp/s.json\"\n",
        )
        .unwrap();
        assert_eq!(s.export.delimiter_byte().unwrap(), b';');
        assert_eq!(s.export.currency, "GBP");
        assert_eq!(s.assistant.timeout_secs, 120);
        assert_eq!(s.session_path(), PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn test_bad_delimiter_rejected() {
        let err = Settings::from_toml(Path::new("settings.toml"), "[export]\ndelimiter = \";;\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        // Characters that occur inside cells ("0%", "7.5m", labels)
        for bad in ["%", ".", " ", "m", "5", "+", "-", "\"", ""] {
            let export = ExportSettings { delimiter: bad.to_string(), ..Default::default() };
            assert!(export.delimiter_byte().is_err(), "accepted {bad:?}");
        }
        let err = Settings::from_toml(Path::new("settings.toml"), "[export]\ndelimiter = \"%\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let export = ExportSettings { unit_suffix: "m;".into(), delimiter: ";".into(), ..Default::default() };
        assert!(export.delimiter_byte().is_err());
    }

    #[test]
    fn test_allowed_delimiters() {
        for (text, byte) in [(",", b','), (";", b';'), ("|", b'|'), ("\t", b'\t')] {
            let export = ExportSettings { delimiter: text.to_string(), ..Default::default() };
            assert_eq!(export.delimiter_byte().unwrap(), byte);
        }
    }

    #[test]
    fn test_invalid_toml() {
        let err = Settings::from_toml(Path::new("settings.toml"), "[assistant\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_override() {
        let mut s = Settings::default();
        s.apply_env(Some("http://backend:9000".into()));
        assert_eq!(s.assistant.endpoint, "http://backend:9000");
        s.apply_env(Some("  ".into()));
        assert_eq!(s.assistant.endpoint, "http://backend:9000");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[assistant]\ntimeout_secs = 5\n").unwrap();
        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.assistant.timeout_secs, 5);

        let missing = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(missing.export, ExportSettings::default());
    }
}
