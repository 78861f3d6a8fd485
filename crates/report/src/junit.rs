//! JUnit XML output.
//!
//! One suite; one test case per validated bundle. Pending bundles appear as
//! suite properties and in `system-out` so CI totals reconcile with the
//! console summary.

use crate::{escape_xml, Formatter};
use skillgate_common::Result;
use skillgate_schema::{ValidationReport, ValidationResult};
use std::fmt::Write;

const SUITE_NAME: &str = "skillgate";

#[derive(Debug, Default)]
pub struct JunitFormatter;

impl JunitFormatter {
    pub fn new() -> Self {
        Self
    }

    fn testcase(out: &mut String, result: &ValidationResult) {
        let _ = write!(
            out,
            "  <testcase name=\"{}\" classname=\"{}.skills\"",
            escape_xml(result.identifier()),
            SUITE_NAME
        );
        if result.passed() && result.warnings().is_empty() {
            out.push_str(" />\n");
            return;
        }
        out.push_str(">\n");
        for error in result.errors() {
            let message = error.to_string();
            let _ = writeln!(
                out,
                "    <failure message=\"{}\" type=\"{}\">{}</failure>",
                escape_xml(&message),
                escape_xml(error.rule_id().unwrap_or("error")),
                escape_xml(&message)
            );
        }
        if !result.warnings().is_empty() {
            let warnings: Vec<String> = result
                .warnings()
                .iter()
                .map(|w| format!("WARNING: {}", w))
                .collect();
            let _ = writeln!(
                out,
                "    <system-out>{}</system-out>",
                escape_xml(&warnings.join("\n"))
            );
        }
        out.push_str("  </testcase>\n");
    }
}

impl Formatter for JunitFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let summary = report.summary();
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            out,
            "<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"0\">",
            SUITE_NAME, summary.validated, summary.failed
        );

        out.push_str("  <properties>\n");
        for (name, value) in [
            ("total", summary.total),
            ("pending", summary.pending),
            ("passRate", summary.pass_rate as usize),
        ] {
            let _ = writeln!(out, "    <property name=\"{}\" value=\"{}\" />", name, value);
        }
        out.push_str("  </properties>\n");

        for result in report.results() {
            Self::testcase(&mut out, result);
        }

        if !report.pending().is_empty() {
            let lines: Vec<String> = report
                .pending()
                .iter()
                .map(|p| match p.phase {
                    Some(phase) => format!("PENDING: {} (phase {})", p.identifier, phase),
                    None => format!("PENDING: {}", p.identifier),
                })
                .collect();
            let _ = writeln!(
                out,
                "  <system-out>{}</system-out>",
                escape_xml(&lines.join("\n"))
            );
        }

        out.push_str("</testsuite>\n");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skillgate_schema::{Issue, PendingBundle};

    #[test]
    fn test_junit_empty_report() {
        let text = JunitFormatter::new().format(&ValidationReport::default()).unwrap();
        assert_eq!(
            text,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <testsuite name=\"skillgate\" tests=\"0\" failures=\"0\" errors=\"0\" skipped=\"0\">\n\
             \x20 <properties>\n\
             \x20   <property name=\"total\" value=\"0\" />\n\
             \x20   <property name=\"pending\" value=\"0\" />\n\
             \x20   <property name=\"passRate\" value=\"0\" />\n\
             \x20 </properties>\n\
             </testsuite>\n"
        );
        assert!(!text.contains("<testcase"));
    }

    #[test]
    fn test_junit_escapes_rule_ids() {
        let report = ValidationReport::new(
            vec![ValidationResult::from_issues(
                "alpha",
                vec![Issue::error("needs an owner").with_rule("project.\"owner\"<x>")],
            )],
            vec![],
        );
        let text = JunitFormatter::new().format(&report).unwrap();
        assert!(text.contains("type=\"project.&quot;owner&quot;&lt;x&gt;\""));
        assert!(!text.contains("<x>"));
    }

    #[test]
    fn test_junit_failures_and_pending() {
        let report = ValidationReport::new(
            vec![
                ValidationResult::from_issues(
                    "alpha",
                    vec![
                        Issue::error("missing required field: description")
                            .with_rule("schema.required-fields"),
                        Issue::error("name 'a<b' must be lowercase letters, digits and hyphens"),
                    ],
                ),
                ValidationResult::from_issues("beta", vec![]),
            ],
            vec![PendingBundle::new("gamma", Some(1))],
        );
        let text = JunitFormatter::new().format(&report).unwrap();

        assert!(text.contains("tests=\"2\" failures=\"1\""));
        assert_eq!(text.matches("<testcase ").count(), 2);
        assert_eq!(text.matches("<failure ").count(), 2);
        assert!(text.contains("type=\"schema.required-fields\""));
        assert!(text.contains("name &apos;a&lt;b&apos;"));
        assert!(text.contains("<testcase name=\"beta\" classname=\"skillgate.skills\" />"));
        assert!(text.contains("<property name=\"pending\" value=\"1\" />"));
        assert!(text.contains("PENDING: gamma (phase 1)"));
    }
}
