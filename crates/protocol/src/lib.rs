//! COREP Assistant Protocol - v1 Frozen Wire Format
//!
//! This crate defines the canonical types exchanged with the assistant
//! backend (chat inference and document-upload inference). Both endpoints
//! answer with the same JSON shape: free text for the analyst plus an
//! optional structured field update.
//!
//! The types here are deliberately permissive: every field of a
//! [`WireFieldUpdate`] is optional so that a malformed payload can still be
//! decoded and then rejected by validation with a precise message, instead
//! of failing inside serde with a generic one.
//!
//! # Usage
//!
//! ```ignore
//! use corep_protocol::AnalysisResponse;
//!
//! let response: AnalysisResponse = serde_json::from_str(&body)?;
//! if let Some(update) = &response.data_update {
//!     // validate + apply
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Current protocol version. Increment for breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Chat inference endpoint (query string parameter `user_query`).
pub const ANALYZE_PATH: &str = "/analyze";

/// Document upload endpoint (multipart field `file`).
pub const UPLOAD_PATH: &str = "/upload";

/// Query parameter carrying the analyst's message.
pub const ANALYZE_QUERY_PARAM: &str = "user_query";

/// Multipart field name carrying the uploaded document.
pub const UPLOAD_FILE_FIELD: &str = "file";

// =============================================================================
// Backend → Client
// =============================================================================

/// Response from either `/analyze` or `/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Explanation shown to the analyst in the chat transcript.
    pub response_text: String,
    /// Structured update, absent when the backend only answered in prose.
    #[serde(default)]
    pub data_update: Option<WireFieldUpdate>,
}

impl AnalysisResponse {
    /// A prose-only response with no update attached.
    pub fn text(response_text: impl Into<String>) -> Self {
        Self {
            response_text: response_text.into(),
            data_update: None,
        }
    }
}

/// A field update as it appears on the wire.
///
/// `value` keeps the raw JSON so the validator can tell a missing key
/// (malformed) from an explicit `null` (unset request).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireFieldUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_page: Option<String>,
}

impl WireFieldUpdate {
    /// Build a numeric update with full provenance.
    pub fn new(
        field_id: impl Into<String>,
        value: f64,
        rule_ref: impl Into<String>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            field_id: Some(field_id.into()),
            value: Some(serde_json::Value::from(value)),
            rule_ref: Some(rule_ref.into()),
            reasoning: Some(reasoning.into()),
            source_page: None,
        }
    }

    pub fn with_source_page(mut self, page: impl Into<String>) -> Self {
        self.source_page = Some(page.into());
        self
    }
}

/// Maps a present key to `Some(value)` even when the value is `null`.
/// Combined with `#[serde(default)]`, a missing key stays `None`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}
