//! Machine-readable JSON output.

use crate::Formatter;
use skillgate_common::Result;
use skillgate_schema::ValidationReport;

/// Pretty-printed JSON with the summary block and untruncated results.
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let mut text = serde_json::to_string_pretty(&report.to_json())?;
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use skillgate_schema::{Issue, PendingBundle, ValidationResult};

    #[test]
    fn test_json_is_untruncated() {
        let errors: Vec<Issue> = (0..9).map(|i| Issue::error(format!("e{}", i))).collect();
        let report = ValidationReport::new(
            vec![ValidationResult::from_issues("many", errors)],
            vec![PendingBundle::new("later", None)],
        );
        let text = JsonFormatter::new().format(&report).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["results"][0]["errors"].as_array().unwrap().len(), 9);
        assert_eq!(
            value["summary"],
            json!({
                "total": 2,
                "passed": 0,
                "failed": 1,
                "pending": 1,
                "passRate": 0,
                "implementationRate": 50,
                "communityCount": 0,
                "skillsWithSuggestions": 0
            })
        );
        assert_eq!(value["pending"][0], json!({"skill": "later", "phase": null}));
    }

    #[test]
    fn test_json_empty_report() {
        let text = JsonFormatter::new().format(&ValidationReport::default()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["results"], json!([]));
        assert_eq!(value["summary"]["passRate"], 0);
    }
}
