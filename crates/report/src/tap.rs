//! TAP version 13 output.

use crate::Formatter;
use serde_json::Value;
use skillgate_common::Result;
use skillgate_schema::{Issue, ValidationReport};
use std::fmt::Write;

/// One test line per validated bundle; the plan equals the validated count.
#[derive(Debug, Default)]
pub struct TapFormatter;

impl TapFormatter {
    pub fn new() -> Self {
        Self
    }
}

/// A YAML-safe scalar for a diagnostic line.
fn quoted(issue: &Issue) -> String {
    Value::String(issue.to_string()).to_string()
}

impl Formatter for TapFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let mut out = String::from("TAP version 13\n");
        let _ = writeln!(out, "1..{}", report.validated_count());

        for (i, result) in report.results().iter().enumerate() {
            let status = if result.passed() { "ok" } else { "not ok" };
            let _ = writeln!(out, "{} {} - {}", status, i + 1, result.identifier());

            if !result.passed() || !result.warnings().is_empty() {
                out.push_str("  ---\n");
                if !result.errors().is_empty() {
                    out.push_str("  errors:\n");
                    for error in result.errors() {
                        let _ = writeln!(out, "    - {}", quoted(error));
                    }
                }
                if !result.warnings().is_empty() {
                    out.push_str("  warnings:\n");
                    for warning in result.warnings() {
                        let _ = writeln!(out, "    - {}", quoted(warning));
                    }
                }
                out.push_str("  ...\n");
            }
        }

        for pending in report.pending() {
            match pending.phase {
                Some(phase) => {
                    let _ = writeln!(out, "# pending: {} (phase {})", pending.identifier, phase);
                }
                None => {
                    let _ = writeln!(out, "# pending: {}", pending.identifier);
                }
            }
        }
        let summary = report.summary();
        let _ = writeln!(
            out,
            "# passed {} of {} ({}%)",
            summary.passed, summary.validated, summary.pass_rate
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skillgate_schema::{PendingBundle, ValidationResult};

    #[test]
    fn test_tap_empty_plan() {
        let text = TapFormatter::new().format(&ValidationReport::default()).unwrap();
        assert_eq!(text, "TAP version 13\n1..0\n# passed 0 of 0 (0%)\n");
    }

    #[test]
    fn test_tap_lines() {
        let report = ValidationReport::new(
            vec![
                ValidationResult::from_issues("beta", vec![]),
                ValidationResult::from_issues(
                    "alpha",
                    vec![Issue::error("missing required field: description")],
                ),
            ],
            vec![PendingBundle::new("gamma", Some(1))],
        );
        let text = TapFormatter::new().format(&report).unwrap();
        assert_eq!(
            text,
            "TAP version 13\n\
             1..2\n\
             not ok 1 - alpha\n\
             \x20 ---\n\
             \x20 errors:\n\
             \x20   - \"missing required field: description\"\n\
             \x20 ...\n\
             ok 2 - beta\n\
             # pending: gamma (phase 1)\n\
             # passed 1 of 2 (50%)\n"
        );
    }
}
