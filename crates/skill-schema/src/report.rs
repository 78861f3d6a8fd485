//! Aggregate report over one run.

use crate::result::ValidationResult;
use serde_json::{json, Map, Value};

/// A bundle that has a draft but no descriptor yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBundle {
    pub identifier: String,
    pub phase: Option<u32>,
}

impl PendingBundle {
    pub fn new(identifier: impl Into<String>, phase: Option<u32>) -> Self {
        Self {
            identifier: identifier.into(),
            phase,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "skill": self.identifier,
            "phase": self.phase,
        })
    }
}

/// Aggregate numbers derived from a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    /// Validated plus pending bundles.
    pub total: usize,
    pub validated: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    /// Validated bundles that belong to no phase.
    pub existing: usize,
    pub pass_rate: u32,
    /// Only present when at least one bundle is pending.
    pub implementation_rate: Option<u32>,
    pub community_count: usize,
    pub skills_with_suggestions: usize,
}

/// All results of one run plus the bundles that were not validated.
///
/// Results are kept in canonical identifier order regardless of the order in
/// which they were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    results: Vec<ValidationResult>,
    pending: Vec<PendingBundle>,
    unknown: Vec<String>,
    existing: usize,
}

impl ValidationReport {
    pub fn new(mut results: Vec<ValidationResult>, mut pending: Vec<PendingBundle>) -> Self {
        results.sort_by(|a, b| a.identifier().cmp(b.identifier()));
        pending.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Self {
            results,
            pending,
            unknown: Vec::new(),
            existing: 0,
        }
    }

    /// Record identifiers that had neither descriptor nor draft.
    pub fn with_unknown(mut self, mut unknown: Vec<String>) -> Self {
        unknown.sort();
        self.unknown = unknown;
        self
    }

    /// Record how many validated bundles belong to no phase.
    pub fn with_existing(mut self, existing: usize) -> Self {
        self.existing = existing;
        self
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn pending(&self) -> &[PendingBundle] {
        &self.pending
    }

    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }

    pub fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    pub fn validated_count(&self) -> usize {
        self.results.len()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.validated_count() - self.passed_count()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// `floor(100 * passed / validated)`, or 0 with nothing validated.
    pub fn pass_rate(&self) -> u32 {
        floor_percent(self.passed_count(), self.validated_count())
    }

    /// `floor(100 * validated / (validated + pending))`, only when something is pending.
    pub fn implementation_rate(&self) -> Option<u32> {
        if self.pending.is_empty() {
            return None;
        }
        let validated = self.validated_count();
        Some(floor_percent(validated, validated + self.pending_count()))
    }

    pub fn community_count(&self) -> usize {
        self.results.iter().map(|r| r.community().len()).sum()
    }

    pub fn skills_with_suggestions(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.community().is_empty())
            .count()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total: self.validated_count() + self.pending_count(),
            validated: self.validated_count(),
            passed: self.passed_count(),
            failed: self.failed_count(),
            pending: self.pending_count(),
            existing: self.existing,
            pass_rate: self.pass_rate(),
            implementation_rate: self.implementation_rate(),
            community_count: self.community_count(),
            skills_with_suggestions: self.skills_with_suggestions(),
        }
    }

    /// 0 when no validated bundle has errors, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    /// Structured form used by the JSON formatter.
    pub fn to_json(&self) -> Value {
        let summary = self.summary();
        let mut summary_map = Map::new();
        summary_map.insert("total".to_string(), json!(summary.total));
        summary_map.insert("passed".to_string(), json!(summary.passed));
        summary_map.insert("failed".to_string(), json!(summary.failed));
        summary_map.insert("pending".to_string(), json!(summary.pending));
        summary_map.insert("passRate".to_string(), json!(summary.pass_rate));
        if let Some(rate) = summary.implementation_rate {
            summary_map.insert("implementationRate".to_string(), json!(rate));
        }
        summary_map.insert("communityCount".to_string(), json!(summary.community_count));
        summary_map.insert(
            "skillsWithSuggestions".to_string(),
            json!(summary.skills_with_suggestions),
        );

        json!({
            "summary": Value::Object(summary_map),
            "results": self.results.iter().map(ValidationResult::to_json).collect::<Vec<_>>(),
            "pending": self.pending.iter().map(PendingBundle::to_json).collect::<Vec<_>>(),
            "unknown": self.unknown,
        })
    }
}

fn floor_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part * 100 / whole) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Issue;

    fn passing(name: &str) -> ValidationResult {
        ValidationResult::from_issues(name, vec![])
    }

    fn failing(name: &str) -> ValidationResult {
        ValidationResult::from_issues(name, vec![Issue::error("broken")])
    }

    #[test]
    fn test_pass_rate_floors() {
        let report = ValidationReport::new(
            vec![passing("a"), passing("b"), failing("c")],
            vec![],
        );
        assert_eq!(report.pass_rate(), 66);
        assert_eq!(report.implementation_rate(), None);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_implementation_rate_with_pending() {
        let report = ValidationReport::new(
            vec![passing("a"), passing("b"), passing("c"), passing("d")],
            vec![PendingBundle::new("e", None), PendingBundle::new("f", Some(2))],
        );
        assert_eq!(report.implementation_rate(), Some(66));
        assert_eq!(report.summary().total, 6);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_empty_report_has_zero_rates() {
        let report = ValidationReport::default();
        assert_eq!(report.pass_rate(), 0);
        assert_eq!(report.implementation_rate(), None);
        assert_eq!(report.exit_code(), 0);
        let json = report.to_json();
        assert_eq!(json["summary"]["total"], 0);
        assert!(json["summary"].get("implementationRate").is_none());
    }

    #[test]
    fn test_results_sorted_canonically() {
        let report = ValidationReport::new(vec![passing("zeta"), passing("alpha")], vec![]);
        let names: Vec<_> = report.results().iter().map(|r| r.identifier()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_community_counts() {
        let with_suggestions = ValidationResult::from_issues(
            "a",
            vec![Issue::suggestion("s1"), Issue::suggestion("s2")],
        );
        let report = ValidationReport::new(vec![with_suggestions, passing("b")], vec![]);
        assert_eq!(report.community_count(), 2);
        assert_eq!(report.skills_with_suggestions(), 1);
        assert_eq!(report.to_json()["summary"]["communityCount"], 2);
    }
}
