//! Category catalog: issue category key -> routing metadata, loaded once at
//! startup from a JSON mapping file and shared read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Category assigned when the model names something outside the catalog.
pub const UNKNOWN_ISSUE: &str = "unknown_issue";

/// Placeholder for routing fields the catalog does not provide.
pub const NOT_AVAILABLE: &str = "N/A";

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// A category key known to be either a catalog key or [`UNKNOWN_ISSUE`].
///
/// Only [`CategoryCatalog`] hands these out, so holding one means the routing
/// join cannot see an out-of-catalog key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IssueCategory(String);

impl IssueCategory {
    pub fn unknown() -> Self {
        IssueCategory(UNKNOWN_ISSUE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_ISSUE
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEntry {
    #[serde(default = "not_available")]
    pub department: String,
    #[serde(default = "not_available")]
    pub responsible: String,
}

impl RoutingEntry {
    /// Routing returned for categories the catalog does not list.
    pub fn not_available() -> Self {
        RoutingEntry {
            department: not_available(),
            responsible: not_available(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    #[serde(flatten)]
    routing: RoutingEntry,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl CategoryCatalog {
    /// Read and parse the mapping file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogUnreadable {
            path: path_str.clone(),
            source,
        })?;
        let catalog = Self::from_json_str(&text, &path_str)?;
        info!(path = %path_str, categories = catalog.len(), "loaded category catalog");
        Ok(catalog)
    }

    /// Parse a mapping document; `origin` is only used in error messages.
    pub fn from_json_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let entries: BTreeMap<String, CatalogEntry> =
            serde_json::from_str(text).map_err(|e| ConfigError::CatalogMalformed {
                path: origin.to_string(),
                reason: e.to_string(),
            })?;
        if entries.is_empty() {
            return Err(ConfigError::EmptyCatalog {
                path: origin.to_string(),
            });
        }
        if let Some(blank) = entries.keys().find(|k| k.trim().is_empty()) {
            return Err(ConfigError::CatalogMalformed {
                path: origin.to_string(),
                reason: format!("blank category key {blank:?}"),
            });
        }
        Ok(CategoryCatalog { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exactly the catalog keys, sorted.
    pub fn valid_categories(&self) -> BTreeSet<IssueCategory> {
        self.entries
            .keys()
            .map(|k| IssueCategory(k.clone()))
            .collect()
    }

    /// Never fails: categories without an entry get [`RoutingEntry::not_available`].
    pub fn lookup_routing(&self, category: &IssueCategory) -> RoutingEntry {
        self.entries
            .get(category.as_str())
            .map(|e| e.routing.clone())
            .unwrap_or_else(RoutingEntry::not_available)
    }

    /// Catalog-provided label, or the key made readable.
    pub fn label(&self, category: &IssueCategory) -> String {
        self.entries
            .get(category.as_str())
            .and_then(|e| e.label.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| humanize_key(category.as_str()))
    }
}

/// `waste_dump` -> `Waste dump`.
pub fn humanize_key(key: &str) -> String {
    let spaced = key
        .split(|c: char| c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPING: &str = r#"{
        "pothole": {"department": "Road Construction Department", "responsible": "Executive Engineer"},
        "waste_dump": {"department": "Urban Development", "responsible": "Sanitation Inspector", "label": "Garbage dump"},
        "streetlight_fault": {"department": "Electricity Board"}
    }"#;

    fn catalog() -> CategoryCatalog {
        CategoryCatalog::from_json_str(MAPPING, "test").unwrap()
    }

    fn key(k: &str) -> IssueCategory {
        IssueCategory(k.to_string())
    }

    #[test]
    fn valid_categories_are_the_keys() {
        let keys: Vec<String> = catalog()
            .valid_categories()
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(keys, vec!["pothole", "streetlight_fault", "waste_dump"]);
    }

    #[test]
    fn routing_lookup_and_sentinel() {
        let c = catalog();
        let pothole = key("pothole");
        assert_eq!(c.lookup_routing(&pothole).department, "Road Construction Department");
        assert_eq!(c.lookup_routing(&IssueCategory::unknown()), RoutingEntry::not_available());
    }

    #[test]
    fn missing_routing_field_defaults_individually() {
        let c = catalog();
        let light = key("streetlight_fault");
        let routing = c.lookup_routing(&light);
        assert_eq!(routing.department, "Electricity Board");
        assert_eq!(routing.responsible, NOT_AVAILABLE);
    }

    #[test]
    fn labels() {
        let c = catalog();
        assert_eq!(c.label(&key("waste_dump")), "Garbage dump");
        assert_eq!(c.label(&key("streetlight_fault")), "Streetlight fault");
        assert_eq!(c.label(&IssueCategory::unknown()), "Unknown issue");
    }

    #[test]
    fn rejects_bad_sources() {
        assert!(matches!(
            CategoryCatalog::from_json_str("[1,2]", "t"),
            Err(ConfigError::CatalogMalformed { .. })
        ));
        assert!(matches!(
            CategoryCatalog::from_json_str("{}", "t"),
            Err(ConfigError::EmptyCatalog { .. })
        ));
        assert!(matches!(
            CategoryCatalog::load("/definitely/not/here.json"),
            Err(ConfigError::CatalogUnreadable { .. })
        ));
    }
}
