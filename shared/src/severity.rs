//! Closed severity scale and the advisory sentence attached to each level.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Returned by [`advisory_for`] for names outside the scale.
pub const SEVERITY_NOT_SPECIFIED: &str = "Severity not specified.";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    High,
    /// Used when the model answers with something off the scale.
    #[default]
    Medium,
    Low,
    None,
}

impl Severity {
    /// All levels in declaration order.
    pub fn all() -> Vec<Severity> {
        Severity::iter().collect()
    }

    /// Exact match first, then trimmed and case-insensitive.
    pub fn parse_lenient(raw: &str) -> Option<Severity> {
        raw.parse::<Severity>()
            .ok()
            .or_else(|| raw.trim().to_ascii_lowercase().parse::<Severity>().ok())
    }

    pub fn advisory(self) -> &'static str {
        match self {
            Severity::High => "Immediate attention is recommended.",
            Severity::Medium => "Should be addressed soon.",
            Severity::Low => "Can be handled during routine maintenance.",
            Severity::None => "No action appears to be required.",
        }
    }
}

/// Advisory lookup by level name.
pub fn advisory_for(name: &str) -> &'static str {
    Severity::parse_lenient(name)
        .map(Severity::advisory)
        .unwrap_or(SEVERITY_NOT_SPECIFIED)
}
