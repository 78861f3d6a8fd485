//! Markdown report, grouped by status.

use crate::{Formatter, MAX_INLINE_ERRORS};
use skillgate_common::Result;
use skillgate_schema::{ValidationReport, ValidationResult};
use std::fmt::Write;

#[derive(Debug, Default)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn issue_list(result: &ValidationResult) -> String {
    let mut shown: Vec<String> = result
        .errors()
        .iter()
        .take(MAX_INLINE_ERRORS)
        .map(|e| cell(&e.to_string()))
        .collect();
    if let Some(more) = crate::overflow(result.errors().len(), MAX_INLINE_ERRORS) {
        shown.push(more);
    }
    shown.join("<br>")
}

impl Formatter for MarkdownFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let summary = report.summary();
        let mut out = String::from("# Skill Validation Report\n\n");

        out.push_str("| Metric | Value |\n|---|---|\n");
        let _ = writeln!(out, "| Total | {} |", summary.total);
        if summary.existing > 0 {
            let _ = writeln!(out, "| Existing | {} |", summary.existing);
            let _ = writeln!(out, "| New | {} |", summary.validated - summary.existing);
        }
        let _ = writeln!(out, "| Passed | {} |", summary.passed);
        let _ = writeln!(out, "| Failed | {} |", summary.failed);
        let _ = writeln!(out, "| Pending | {} |", summary.pending);
        let _ = writeln!(out, "| Pass rate | {}% |", summary.pass_rate);
        if let Some(rate) = summary.implementation_rate {
            let _ = writeln!(out, "| Implementation rate | {}% |", rate);
        }
        let _ = writeln!(
            out,
            "| Community suggestions | {} across {} skills |",
            summary.community_count, summary.skills_with_suggestions
        );

        let failures: Vec<_> = report.failures().collect();
        if !failures.is_empty() {
            let _ = writeln!(out, "\n## Failed ({})\n", failures.len());
            out.push_str("| Skill | Errors | Warnings | Issues |\n|---|---|---|---|\n");
            for result in failures {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    cell(result.identifier()),
                    result.errors().len(),
                    result.warnings().len(),
                    issue_list(result)
                );
            }
        }

        let passed: Vec<_> = report.results().iter().filter(|r| r.passed()).collect();
        if !passed.is_empty() {
            let _ = writeln!(out, "\n## Passed ({})\n", passed.len());
            out.push_str("| Skill | Warnings | Suggestions |\n|---|---|---|\n");
            for result in passed {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} |",
                    cell(result.identifier()),
                    result.warnings().len(),
                    result.community().len()
                );
            }
        }

        if !report.pending().is_empty() {
            let _ = writeln!(out, "\n## Pending ({})\n", report.pending_count());
            out.push_str("| Skill | Phase |\n|---|---|\n");
            for pending in report.pending() {
                let phase = pending
                    .phase
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let _ = writeln!(out, "| {} | {} |", cell(&pending.identifier), phase);
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillgate_schema::{Category, Issue, PendingBundle};

    #[test]
    fn test_markdown_groups_by_status() {
        let report = ValidationReport::new(
            vec![
                ValidationResult::from_issues(
                    "alpha",
                    vec![Issue::error("needs | pipe").in_category(Category::Project)],
                ),
                ValidationResult::from_issues("beta", vec![Issue::warning("short")]),
            ],
            vec![PendingBundle::new("gamma", None)],
        );
        let text = MarkdownFormatter::new().format(&report).unwrap();

        assert!(text.contains("| Pass rate | 50% |"));
        assert!(text.contains("| Implementation rate | 66% |"));
        assert!(text.contains("## Failed (1)"));
        assert!(text.contains("| alpha | 1 | 0 | [project] needs \\| pipe |"));
        assert!(text.contains("## Passed (1)"));
        assert!(text.contains("| beta | 1 | 0 |"));
        assert!(text.contains("| gamma | - |"));
    }

    #[test]
    fn test_markdown_empty_report() {
        let text = MarkdownFormatter::new().format(&ValidationReport::default()).unwrap();
        assert!(text.contains("| Total | 0 |"));
        assert!(!text.contains("## Failed"));
        assert!(!text.contains("Implementation rate"));
    }
}
