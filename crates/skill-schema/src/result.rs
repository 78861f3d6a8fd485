//! Per-bundle validation result.

use crate::issue::{Issue, Severity};
use serde_json::{json, Value};

/// Outcome of validating one bundle.
///
/// Built once from the complete issue list of a single engine pass and never
/// modified afterwards. `passed` is derived from `errors` alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    identifier: String,
    errors: Vec<Issue>,
    warnings: Vec<Issue>,
    community: Vec<Issue>,
}

impl ValidationResult {
    /// Bucket issues by severity, preserving their relative order.
    ///
    /// `community` only ever holds community-practice suggestions; a
    /// suggestion tagged as a project issue is kept with the warnings.
    pub fn from_issues(identifier: impl Into<String>, issues: Vec<Issue>) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut community = Vec::new();

        for issue in issues {
            match issue.severity() {
                Severity::Error => errors.push(issue),
                Severity::Warning => warnings.push(issue),
                Severity::Suggestion if issue.is_project() => warnings.push(issue),
                Severity::Suggestion => community.push(issue),
            }
        }

        Self {
            identifier: identifier.into(),
            errors,
            warnings,
            community,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Issue] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Issue] {
        &self.warnings
    }

    /// Suggestion-severity issues from community practices.
    pub fn community(&self) -> &[Issue] {
        &self.community
    }

    /// Rendered error lines, in check order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    pub fn community_messages(&self) -> Vec<String> {
        self.community.iter().map(ToString::to_string).collect()
    }

    /// Structured form used by machine-readable outputs.
    pub fn to_json(&self) -> Value {
        json!({
            "skill": self.identifier,
            "passed": self.passed(),
            "errors": self.errors.iter().map(Issue::to_json).collect::<Vec<_>>(),
            "warnings": self.warnings.iter().map(Issue::to_json).collect::<Vec<_>>(),
            "community": self.community.iter().map(Issue::to_json).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Category;

    #[test]
    fn test_buckets_by_severity() {
        let result = ValidationResult::from_issues(
            "alpha",
            vec![
                Issue::warning("w1"),
                Issue::error("e1"),
                Issue::suggestion("s1"),
                Issue::error("e2"),
            ],
        );
        assert_eq!(result.error_messages(), vec!["e1", "e2"]);
        assert_eq!(result.warning_messages(), vec!["w1"]);
        assert_eq!(result.community_messages(), vec!["s1"]);
        assert!(!result.passed());
    }

    #[test]
    fn test_project_suggestion_stays_out_of_community() {
        let result = ValidationResult::from_issues(
            "alpha",
            vec![
                Issue::suggestion("add an owner").in_category(Category::Project),
                Issue::suggestion("s").in_category(Category::Community),
            ],
        );
        assert_eq!(result.warning_messages(), vec!["[project] add an owner"]);
        assert_eq!(result.community_messages(), vec!["s"]);
    }

    #[test]
    fn test_passed_ignores_warnings_and_community() {
        let result = ValidationResult::from_issues(
            "beta",
            vec![
                Issue::warning("w"),
                Issue::suggestion("s").in_category(Category::Community),
            ],
        );
        assert!(result.passed());
    }

    #[test]
    fn test_to_json_is_stable() {
        let build = || {
            ValidationResult::from_issues(
                "gamma",
                vec![Issue::error("e").with_rule("schema.required-fields")],
            )
        };
        let first = serde_json::to_string(&build().to_json()).unwrap();
        let second = serde_json::to_string(&build().to_json()).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("\"passed\":false"));
    }
}
