//! Human console output.

use crate::{overflow, FormatOptions, Formatter, MAX_INLINE_COMMUNITY, MAX_INLINE_ERRORS};
use skillgate_common::Result;
use skillgate_schema::{ValidationReport, ValidationResult};
use std::fmt::Write;

const RULE: &str = "==========================================";

pub struct ConsoleFormatter {
    options: FormatOptions,
}

impl ConsoleFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    fn status_line(&self, result: &ValidationResult) -> String {
        let style = self.options.style();
        let status = if result.passed() {
            style.green("PASS")
        } else {
            style.red("FAIL")
        };
        let detail = if !result.passed() {
            format!(
                " ({} errors, {} warnings)",
                result.errors().len(),
                result.warnings().len()
            )
        } else if self.options.show_community && !result.community().is_empty() {
            format!(" ({} suggestions)", result.community().len())
        } else {
            String::new()
        };
        format!(
            "Validating: {}... {}{}",
            style.blue(result.identifier()),
            status,
            detail
        )
    }
}

fn header(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", RULE);
    out.push('\n');
}

impl Formatter for ConsoleFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let style = self.options.style();
        let summary = report.summary();
        let mut out = String::new();

        header(&mut out, "Batch Skill Validation");

        for result in report.results() {
            if self.options.quiet && result.passed() {
                continue;
            }
            let _ = writeln!(out, "{}", self.status_line(result));
        }
        if !self.options.quiet {
            for pending in report.pending() {
                let phase = pending
                    .phase
                    .map(|p| format!(" (Phase {})", p))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "{}",
                    style.yellow(&format!(
                        "Pending: {} (draft only){}",
                        pending.identifier, phase
                    ))
                );
            }
            for unknown in report.unknown() {
                let _ = writeln!(
                    out,
                    "{}",
                    style.dim(&format!("Not found: {} (no descriptor or draft)", unknown))
                );
            }
        }

        out.push('\n');
        header(&mut out, "BATCH VALIDATION SUMMARY");

        let _ = writeln!(out, "Total Checked: {}", summary.total);
        if summary.existing > 0 {
            let _ = writeln!(out, "  Existing:    {}", summary.existing);
            let new = summary.validated - summary.existing;
            if new > 0 {
                let _ = writeln!(out, "  New:         {}", new);
            }
        }
        out.push('\n');
        let _ = writeln!(out, "{}", style.green(&format!("Passed:        {}", summary.passed)));
        let _ = writeln!(out, "{}", style.red(&format!("Failed:        {}", summary.failed)));
        if summary.pending > 0 {
            let _ = writeln!(
                out,
                "{}",
                style.yellow(&format!("Pending:       {}", summary.pending))
            );
        }
        if self.options.show_community && summary.community_count > 0 {
            let _ = writeln!(
                out,
                "{}",
                style.cyan(&format!(
                    "Community:     {} suggestions across {} skills",
                    summary.community_count, summary.skills_with_suggestions
                ))
            );
        }
        out.push('\n');

        if summary.validated > 0 {
            let _ = writeln!(out, "Pass Rate: {}%", summary.pass_rate);
        }
        if let Some(rate) = summary.implementation_rate {
            let _ = writeln!(out, "Implementation Rate: {}%", rate);
        }

        let failures: Vec<_> = report.failures().collect();
        if !failures.is_empty() {
            out.push('\n');
            let _ = writeln!(out, "{}", style.red("Failed Skills:"));
            out.push('\n');
            for result in &failures {
                let _ = writeln!(out, "  {}", style.red(result.identifier()));
                let limit = if self.options.verbose {
                    result.errors().len()
                } else {
                    MAX_INLINE_ERRORS
                };
                for error in result.errors().iter().take(limit) {
                    let _ = writeln!(out, "    - {}", error);
                }
                if let Some(more) = overflow(result.errors().len(), limit) {
                    let _ = writeln!(out, "    {}", more);
                }
                if self.options.verbose {
                    for warning in result.warnings() {
                        let _ = writeln!(out, "    ! {}", style.yellow(&warning.to_string()));
                    }
                }
                out.push('\n');
            }
            if !self.options.verbose {
                let _ = writeln!(
                    out,
                    "Full detail: skillgate run-single <name> --verbose"
                );
            }
        }

        if self.options.show_community && summary.community_count > 0 {
            out.push('\n');
            let _ = writeln!(out, "{}", style.cyan("Community Practice Suggestions:"));
            out.push('\n');
            for result in report.results().iter().filter(|r| !r.community().is_empty()) {
                let _ = writeln!(out, "  {}", style.cyan(result.identifier()));
                for suggestion in result.community().iter().take(MAX_INLINE_COMMUNITY) {
                    let _ = writeln!(out, "    - {}", suggestion);
                }
                if let Some(more) = overflow(result.community().len(), MAX_INLINE_COMMUNITY) {
                    let _ = writeln!(out, "    {}", more);
                }
                out.push('\n');
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skillgate_schema::{Category, Issue, PendingBundle};

    fn report() -> ValidationReport {
        let errors: Vec<Issue> = (1..=7).map(|i| Issue::error(format!("error {}", i))).collect();
        let community: Vec<Issue> = (1..=4)
            .map(|i| Issue::suggestion(format!("tip {}", i)).in_category(Category::Community))
            .collect();
        ValidationReport::new(
            vec![
                ValidationResult::from_issues("broken", errors),
                ValidationResult::from_issues("tidy", community),
            ],
            vec![PendingBundle::new("planned", Some(2))],
        )
    }

    #[test]
    fn test_console_truncates_errors_and_community() {
        let options = FormatOptions {
            show_community: true,
            ..FormatOptions::default()
        };
        let text = ConsoleFormatter::new(options).format(&report()).unwrap();

        assert!(text.contains("Validating: broken... FAIL (7 errors, 0 warnings)"));
        assert!(text.contains("Validating: tidy... PASS (4 suggestions)"));
        assert!(text.contains("Pending: planned (draft only) (Phase 2)"));
        assert!(text.contains("    - error 5\n    ... and 2 more\n"));
        assert!(!text.contains("error 6"));
        assert!(text.contains("    - tip 3\n    ... and 1 more\n"));
        assert!(text.contains("Pass Rate: 50%"));
        assert!(text.contains("Implementation Rate: 66%"));
        assert!(text.contains("Community:     4 suggestions across 1 skills"));
    }

    #[test]
    fn test_console_verbose_shows_all_errors() {
        let options = FormatOptions {
            verbose: true,
            ..FormatOptions::default()
        };
        let text = ConsoleFormatter::new(options).format(&report()).unwrap();
        assert!(text.contains("error 7"));
        assert!(!text.contains("more"));
        assert!(!text.contains("tip 1"));
    }

    #[test]
    fn test_console_empty_report() {
        let text = ConsoleFormatter::new(FormatOptions::default())
            .format(&ValidationReport::default())
            .unwrap();
        assert!(text.contains("Total Checked: 0"));
        assert!(!text.contains("Pass Rate"));
        assert!(!text.contains("Implementation Rate"));
    }

    #[test]
    fn test_console_project_prefix() {
        let result = ValidationResult::from_issues(
            "owned",
            vec![Issue::error("missing owner").in_category(Category::Project)],
        );
        let text = ConsoleFormatter::new(FormatOptions::default())
            .format(&ValidationReport::new(vec![result], vec![]))
            .unwrap();
        let line = text
            .lines()
            .find(|l| l.contains("missing owner"))
            .unwrap();
        assert_eq!(line, "    - [project] missing owner");
    }
}
