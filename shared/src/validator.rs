//! Boundary between untrusted model text and the typed analysis record.
//!
//! Structural problems (no JSON object, a required field absent) are errors.
//! Everything else is repaired: out-of-catalog categories become
//! [`UNKNOWN_ISSUE`](crate::catalog::UNKNOWN_ISSUE), off-scale severities become
//! [`Severity::default`], and confidence is clamped into `[0.0, 1.0]`. Each
//! repair is logged and reported as a [`Diagnostic`].
//!
//! Category membership is not strictly literal: a label that misses the
//! catalog exactly is retried trimmed and ASCII case-insensitively, so
//! `"POTHOLE "` resolves to `pothole` without a diagnostic. Severities get the
//! same treatment through [`Severity::parse_lenient`].

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::catalog::IssueCategory;
use crate::error::ResponseError;
use crate::json_relaxed::parse_json_relaxed;
use crate::severity::Severity;

/// Checked in this order; the first absent one is reported.
pub const REQUIRED_FIELDS: [&str; 4] = ["issue_type", "severity", "confidence", "description"];

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    UnknownCategory(String),
    UnknownSeverity(String),
    ConfidenceClamped(f64),
    ConfidenceNotNumeric(String),
    DescriptionNotText,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    pub issue_type: IssueCategory,
    pub severity: Severity,
    pub confidence: f64,
    /// May be empty; enrichment fills in a fallback.
    pub description: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse and normalize raw model output.
///
/// `valid_categories` is the catalog's key set; `valid_severities` the scale
/// in effect. Once the four required fields are present this never fails.
pub fn validate_response(
    raw: &str,
    valid_categories: &BTreeSet<IssueCategory>,
    valid_severities: &[Severity],
) -> Result<NormalizedResponse, ResponseError> {
    debug!(
        "model answer = {}",
        raw.chars().take(512).collect::<String>()
    );
    let value = parse_json_relaxed(raw).map_err(ResponseError::Malformed)?;
    let Value::Object(obj) = value else {
        return Err(ResponseError::Malformed("expected a JSON object".into()));
    };

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|k| !obj.contains_key(**k)) {
        return Err(ResponseError::MissingField(*missing));
    }

    let mut diagnostics = Vec::new();
    let issue_type = normalize_category(&obj, valid_categories, &mut diagnostics);
    let severity = normalize_severity(&obj, valid_severities, &mut diagnostics);
    let confidence = normalize_confidence(&obj, &mut diagnostics);
    let description = match &obj["description"] {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        _ => {
            warn!("model returned a non-text 'description'");
            diagnostics.push(Diagnostic::DescriptionNotText);
            String::new()
        }
    };

    Ok(NormalizedResponse {
        issue_type,
        severity,
        confidence,
        description,
        diagnostics,
    })
}

fn normalize_category(
    obj: &Map<String, Value>,
    valid: &BTreeSet<IssueCategory>,
    diagnostics: &mut Vec<Diagnostic>,
) -> IssueCategory {
    let raw = text_of(&obj["issue_type"]);
    let wanted = raw.trim();
    let found = valid
        .iter()
        .find(|c| c.as_str() == raw)
        .or_else(|| valid.iter().find(|c| c.as_str().eq_ignore_ascii_case(wanted)));
    match found {
        Some(category) => category.clone(),
        None => {
            let unknown = IssueCategory::unknown();
            if raw != unknown.as_str() {
                warn!(label = %raw, "AI returned an unexpected 'issue_type' label");
                diagnostics.push(Diagnostic::UnknownCategory(raw));
            }
            unknown
        }
    }
}

fn normalize_severity(
    obj: &Map<String, Value>,
    valid: &[Severity],
    diagnostics: &mut Vec<Diagnostic>,
) -> Severity {
    let raw = text_of(&obj["severity"]);
    match Severity::parse_lenient(&raw).filter(|s| valid.contains(s)) {
        Some(severity) => severity,
        None => {
            let fallback = Severity::default();
            warn!(label = %raw, %fallback, "AI returned an unexpected 'severity' label");
            diagnostics.push(Diagnostic::UnknownSeverity(raw));
            fallback
        }
    }
}

fn normalize_confidence(obj: &Map<String, Value>, diagnostics: &mut Vec<Diagnostic>) -> f64 {
    let value = &obj["confidence"];
    // numbers beyond f64 range come through as +/-inf and get clamped
    let parsed = match value {
        Value::Number(n) => n.as_f64().or_else(|| n.to_string().parse::<f64>().ok()),
        _ => None,
    };
    let Some(c) = parsed.filter(|c| !c.is_nan()) else {
        warn!(confidence = %value, "AI returned a non-numeric 'confidence'");
        diagnostics.push(Diagnostic::ConfidenceNotNumeric(value.to_string()));
        return 0.0;
    };
    if (0.0..=1.0).contains(&c) {
        c
    } else {
        let clamped = c.clamp(0.0, 1.0);
        warn!(confidence = c, clamped, "confidence out of range");
        diagnostics.push(Diagnostic::ConfidenceClamped(c));
        clamped
    }
}

/// String content of a JSON value; non-strings use their JSON rendering so
/// they still show up in diagnostics.
fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryCatalog;

    fn categories() -> BTreeSet<IssueCategory> {
        CategoryCatalog::from_json_str(
            r#"{"pothole": {"department": "Roads", "responsible": "Engineer"},
                "waste_dump": {"department": "Sanitation", "responsible": "Inspector"}}"#,
            "test",
        )
        .unwrap()
        .valid_categories()
    }

    fn check(raw: &str) -> Result<NormalizedResponse, ResponseError> {
        validate_response(raw, &categories(), &Severity::all())
    }

    #[test]
    fn fenced_valid_answer() {
        let raw = "```json\n{\"issue_type\":\"pothole\",\"severity\":\"high\",\"confidence\":0.92,\"description\":\"Large pothole on main road.\"}\n```";
        let n = check(raw).unwrap();
        assert_eq!(n.issue_type.as_str(), "pothole");
        assert_eq!(n.severity, Severity::High);
        assert_eq!(n.confidence, 0.92);
        assert_eq!(n.description, "Large pothole on main road.");
        assert!(n.diagnostics.is_empty());
    }

    #[test]
    fn out_of_catalog_category_becomes_unknown() {
        let n = check(r#"{"issue_type":"spaceship_crash","severity":"low","confidence":0.5,"description":"..."}"#).unwrap();
        assert!(n.issue_type.is_unknown());
        assert_eq!(n.diagnostics, vec![Diagnostic::UnknownCategory("spaceship_crash".into())]);
    }

    #[test]
    fn explicit_unknown_is_not_a_diagnostic() {
        let n = check(r#"{"issue_type":"unknown_issue","severity":"none","confidence":0.1,"description":"Nothing."}"#).unwrap();
        assert!(n.issue_type.is_unknown());
        assert!(n.diagnostics.is_empty());
    }

    #[test]
    fn non_string_category_becomes_unknown() {
        let n = check(r#"{"issue_type":42,"severity":"low","confidence":0.5,"description":"x"}"#).unwrap();
        assert!(n.issue_type.is_unknown());
    }

    #[test]
    fn category_case_is_ignored() {
        let n = check(r#"{"issue_type":"Waste_Dump ","severity":"low","confidence":0.5,"description":"x"}"#).unwrap();
        assert_eq!(n.issue_type.as_str(), "waste_dump");
    }

    #[test]
    fn unknown_severity_defaults_to_medium() {
        let n = check(r#"{"issue_type":"pothole","severity":"catastrophic","confidence":0.5,"description":"x"}"#).unwrap();
        assert_eq!(n.severity, Severity::Medium);
        assert_eq!(n.diagnostics, vec![Diagnostic::UnknownSeverity("catastrophic".into())]);
    }

    #[test]
    fn severity_outside_supplied_scale_is_normalized() {
        let n = validate_response(
            r#"{"issue_type":"pothole","severity":"none","confidence":0.5,"description":"x"}"#,
            &categories(),
            &[Severity::High, Severity::Medium, Severity::Low],
        )
        .unwrap();
        assert_eq!(n.severity, Severity::Medium);
    }

    #[test]
    fn confidence_is_clamped() {
        for (given, expected) in [(1.7, 1.0), (-0.3, 0.0), (0.0, 0.0), (1.0, 1.0), (0.42, 0.42)] {
            let raw = format!(
                r#"{{"issue_type":"pothole","severity":"low","confidence":{given},"description":"x"}}"#
            );
            assert_eq!(check(&raw).unwrap().confidence, expected, "given {given}");
        }
    }

    #[test]
    fn confidence_beyond_f64_range_is_clamped() {
        let n = check(r#"{"issue_type":"pothole","severity":"high","confidence":1e400,"description":"x"}"#).unwrap();
        assert_eq!(n.confidence, 1.0);
        assert_eq!(n.diagnostics, vec![Diagnostic::ConfidenceClamped(f64::INFINITY)]);

        let n = check(r#"{"issue_type":"pothole","severity":"high","confidence":-1e400,"description":"x"}"#).unwrap();
        assert_eq!(n.confidence, 0.0);
        assert_eq!(n.diagnostics, vec![Diagnostic::ConfidenceClamped(f64::NEG_INFINITY)]);
    }

    #[test]
    fn non_numeric_confidence_is_zero() {
        let n = check(r#"{"issue_type":"pothole","severity":"low","confidence":"very","description":"x"}"#).unwrap();
        assert_eq!(n.confidence, 0.0);
        assert!(matches!(n.diagnostics[..], [Diagnostic::ConfidenceNotNumeric(_)]));
    }

    #[test]
    fn missing_fields_are_reported_in_order() {
        assert_eq!(
            check(r#"{"issue_type":"pothole","severity":"high"}"#),
            Err(ResponseError::MissingField("confidence"))
        );
        assert_eq!(
            check(r#"{"severity":"high","confidence":0.3}"#),
            Err(ResponseError::MissingField("issue_type"))
        );
        assert_eq!(
            check(r#"{"issue_type":"pothole","confidence":0.3,"description":"x"}"#),
            Err(ResponseError::MissingField("severity"))
        );
        assert_eq!(
            check(r#"{"issue_type":"pothole","severity":"high","confidence":0.3}"#),
            Err(ResponseError::MissingField("description"))
        );
    }

    #[test]
    fn category_match_ignores_case_and_padding() {
        let n = check(r#"{"issue_type":"POTHOLE","severity":"HIGH","confidence":0.5,"description":"x"}"#).unwrap();
        assert_eq!(n.issue_type.as_str(), "pothole");
        assert_eq!(n.severity, Severity::High);
        assert!(n.diagnostics.is_empty());
    }

    #[test]
    fn malformed_answers() {
        assert!(matches!(check("not json at all"), Err(ResponseError::Malformed(_))));
        assert!(matches!(check("[1, 2, 3]"), Err(ResponseError::Malformed(_))));
        assert!(matches!(check("\"pothole\""), Err(ResponseError::Malformed(_))));
    }
}
