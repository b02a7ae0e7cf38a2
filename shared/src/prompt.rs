use std::collections::BTreeSet;

use crate::catalog::IssueCategory;
use crate::severity::Severity;

/// Instruction text for the vision model, constrained to the given category
/// and severity sets. Deterministic for a given pair of sets.
pub fn build_prompt(valid_categories: &BTreeSet<IssueCategory>, valid_severities: &[Severity]) -> String {
    let categories = quoted_list(valid_categories.iter().map(IssueCategory::as_str));
    let severities = quoted_list(valid_severities.iter().map(Severity::as_ref));
    format!(
        r#"You are a specialized AI assistant for a civic monitoring app. Your only task is to analyze the
provided image and identify the primary civic issue.

The JSON object you return must contain exactly four keys:
1. "issue_type": Classify the issue from this list: {categories}.
2. "severity": Rate the issue's severity from this list: {severities}.
3. "confidence": A float between 0.0 and 1.0 for your classification confidence.
4. "description": Write 1-2 natural sentences describing the issue in plain language.

Respond only with the raw JSON object. Do not add any other text."#
    )
}

fn quoted_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = items.map(|i| format!("\"{i}\"")).collect();
    format!("[{}]", quoted.join(", "))
}
