//! Report row catalogue.
//!
//! Each `FieldId` names exactly one row of the Own Funds template. Row
//! metadata (labels, risk weight) is fixed per variant and never interpreted
//! by the engine; it only travels through to projections and exports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldId {
    #[serde(rename = "row_sovereign_exposure")]
    SovereignExposure,
    #[serde(rename = "row_retail_exposure")]
    RetailExposure,
}

impl FieldId {
    /// Canonical template order. Exports and projections iterate this.
    pub const ALL: [FieldId; 2] = [FieldId::SovereignExposure, FieldId::RetailExposure];

    /// Wire identifier used by collaborators.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SovereignExposure => "row_sovereign_exposure",
            Self::RetailExposure => "row_retail_exposure",
        }
    }

    /// Label shown in the interactive table.
    pub fn display_label(&self) -> &'static str {
        match self {
            Self::SovereignExposure => "Central Governments (Sovereign)",
            Self::RetailExposure => "Retail Exposures",
        }
    }

    /// Exposure class label written to exports.
    pub fn export_label(&self) -> &'static str {
        match self {
            Self::SovereignExposure => "Central Governments",
            Self::RetailExposure => "Retail Exposures",
        }
    }

    pub fn risk_weight(&self) -> &'static str {
        match self {
            Self::SovereignExposure => "0%",
            Self::RetailExposure => "75%",
        }
    }

    /// Validate an external identifier against the catalogue.
    pub fn parse(id: &str) -> Result<Self, ReconcileError> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == id)
            .ok_or_else(|| ReconcileError::UnknownField(id.to_string()))
    }
}

impl FromStr for FieldId {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_ids() {
        assert_eq!(FieldId::parse("row_sovereign_exposure"), Ok(FieldId::SovereignExposure));
        assert_eq!("row_retail_exposure".parse::<FieldId>(), Ok(FieldId::RetailExposure));
    }

    #[test]
    fn parse_unknown_id() {
        assert_eq!(
            FieldId::parse("row_nonexistent"),
            Err(ReconcileError::UnknownField("row_nonexistent".into()))
        );
        // Identifiers are case-sensitive
        assert!(FieldId::parse("ROW_RETAIL_EXPOSURE").is_err());
    }

    #[test]
    fn wire_id_matches_serde() {
        for field in FieldId::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }

    #[test]
    fn canonical_order_matches_ord() {
        let mut sorted = FieldId::ALL;
        sorted.sort();
        assert_eq!(sorted, FieldId::ALL);
    }
}
