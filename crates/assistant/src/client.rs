//! Assistant HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).

use std::path::Path;
use std::time::Duration;

use corep_protocol::{
    AnalysisResponse, ANALYZE_PATH, ANALYZE_QUERY_PARAM, UPLOAD_FILE_FIELD, UPLOAD_PATH,
};

/// A collaborator call that did not complete. Every variant leaves the
/// report untouched.
#[derive(Debug)]
pub enum AssistantError {
    /// Connection refused, DNS, timeout
    Network(String),
    /// Non-success HTTP status with response body
    Http(u16, String),
    /// Response body is not an `AnalysisResponse`
    Parse(String),
    /// Local file could not be read for upload
    Io(String),
}

impl std::fmt::Display for AssistantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssistantError::Network(msg) => write!(f, "Network error: {}", msg),
            AssistantError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            AssistantError::Parse(msg) => write!(f, "Parse error: {}", msg),
            AssistantError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for AssistantError {}

/// Chat and upload inference. Implemented over HTTP by [`HttpAssistant`];
/// tests and offline tooling can supply their own.
pub trait Assistant {
    /// Interpret a natural-language message.
    fn analyze(&self, query: &str) -> Result<AnalysisResponse, AssistantError>;

    /// Extract an update from a document.
    fn upload(&self, path: &Path) -> Result<AnalysisResponse, AssistantError>;
}

/// Assistant backend client (blocking).
#[derive(Clone)]
pub struct HttpAssistant {
    http: reqwest::blocking::Client,
    api_base: String,
}

impl HttpAssistant {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, AssistantError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("corep/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AssistantError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn read_response(response: reqwest::blocking::Response) -> Result<AnalysisResponse, AssistantError> {
        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AssistantError::Http(status, body));
        }

        let body = response.text().map_err(|e| AssistantError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| AssistantError::Parse(e.to_string()))
    }
}

impl Assistant for HttpAssistant {
    fn analyze(&self, query: &str) -> Result<AnalysisResponse, AssistantError> {
        let url = format!("{}{}", self.api_base, ANALYZE_PATH);
        log::debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .query(&[(ANALYZE_QUERY_PARAM, query)])
            .send()
            .map_err(|e| AssistantError::Network(e.to_string()))?;
        Self::read_response(response)
    }

    fn upload(&self, path: &Path) -> Result<AnalysisResponse, AssistantError> {
        let url = format!("{}{}", self.api_base, UPLOAD_PATH);
        let form = reqwest::blocking::multipart::Form::new()
            .file(UPLOAD_FILE_FIELD, path)
            .map_err(|e| AssistantError::Io(format!("{}: {}", path.display(), e)))?;
        log::debug!("POST {url} ({})", path.display());
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| AssistantError::Network(e.to_string()))?;
        Self::read_response(response)
    }
}
