//! Join of a normalized model answer with the category catalog.

use serde::Serialize;

use crate::catalog::{CategoryCatalog, IssueCategory};
use crate::severity::{self, Severity};
use crate::validator::NormalizedResponse;

/// The record returned to clients. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub issue_type: IssueCategory,
    pub issue_label: String,
    pub severity: Severity,
    pub confidence: f64,
    pub description: String,
    pub department: String,
    pub responsible: String,
}

pub fn enrich(normalized: NormalizedResponse, catalog: &CategoryCatalog) -> AnalysisRecord {
    let routing = catalog.lookup_routing(&normalized.issue_type);
    let label = catalog.label(&normalized.issue_type);
    let description = if normalized.description.trim().is_empty() {
        fallback_description(&label, normalized.severity.as_ref())
    } else {
        normalized.description
    };

    AnalysisRecord {
        issue_type: normalized.issue_type,
        issue_label: label,
        severity: normalized.severity,
        confidence: normalized.confidence,
        description,
        department: routing.department,
        responsible: routing.responsible,
    }
}

fn fallback_description(label: &str, severity: &str) -> String {
    format!("{label} reported. {}", severity::advisory_for(severity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NOT_AVAILABLE;
    use crate::validator::validate_response;

    fn catalog() -> CategoryCatalog {
        CategoryCatalog::from_json_str(
            r#"{"pothole": {"department": "Road Construction Department", "responsible": "Executive Engineer"},
                "open_manhole": {"department": "Drinking Water & Sanitation", "responsible": "Junior Engineer", "label": "Uncovered manhole"}}"#,
            "test",
        )
        .unwrap()
    }

    fn normalize(raw: &str, c: &CategoryCatalog) -> NormalizedResponse {
        validate_response(raw, &c.valid_categories(), &Severity::all()).unwrap()
    }

    #[test]
    fn attaches_catalog_routing() {
        let c = catalog();
        let n = normalize(
            r#"{"issue_type":"pothole","severity":"high","confidence":0.92,"description":"Large pothole on main road."}"#,
            &c,
        );
        let record = enrich(n, &c);
        assert_eq!(record.issue_type.as_str(), "pothole");
        assert_eq!(record.issue_label, "Pothole");
        assert_eq!(record.department, "Road Construction Department");
        assert_eq!(record.responsible, "Executive Engineer");
        assert_eq!(record.description, "Large pothole on main road.");
    }

    #[test]
    fn unknown_category_gets_sentinel_routing() {
        let c = catalog();
        let n = normalize(
            r#"{"issue_type":"spaceship_crash","severity":"low","confidence":0.5,"description":"..."}"#,
            &c,
        );
        let record = enrich(n, &c);
        assert_eq!(record.issue_type.as_str(), "unknown_issue");
        assert_eq!(record.department, NOT_AVAILABLE);
        assert_eq!(record.responsible, NOT_AVAILABLE);
    }

    #[test]
    fn blank_description_is_synthesized() {
        let c = catalog();
        let n = normalize(
            r#"{"issue_type":"open_manhole","severity":"high","confidence":0.8,"description":"   "}"#,
            &c,
        );
        let record = enrich(n, &c);
        assert_eq!(
            record.description,
            "Uncovered manhole reported. Immediate attention is recommended."
        );
    }

    #[test]
    fn fallback_for_unknown_severity_name() {
        assert_eq!(
            fallback_description("Pothole", "critical"),
            "Pothole reported. Severity not specified."
        );
    }

    #[test]
    fn serializes_flat_record() {
        let c = catalog();
        let n = normalize(
            r#"{"issue_type":"pothole","severity":"none","confidence":1,"description":"Patched."}"#,
            &c,
        );
        let v = serde_json::to_value(enrich(n, &c)).unwrap();
        assert_eq!(v["issue_type"], "pothole");
        assert_eq!(v["severity"], "none");
        assert_eq!(v["confidence"], 1.0);
        assert_eq!(v["department"], "Road Construction Department");
    }
}
