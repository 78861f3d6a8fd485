//! Validation issues.

use serde_json::{json, Map, Value};
use std::fmt;

/// How serious an issue is. Every issue carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Suggestion => "suggestion",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "suggestion" | "info" => Ok(Severity::Suggestion),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Which family of checks produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Structural,
    Schema,
    Content,
    Community,
    Project,
    /// Synthetic issues raised by the engine itself, e.g. a crashed check.
    Engine,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Structural => "structural",
            Category::Schema => "schema",
            Category::Content => "content",
            Category::Community => "community",
            Category::Project => "project",
            Category::Engine => "engine",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding from one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    severity: Severity,
    message: String,
    rule_id: Option<String>,
    category: Option<Category>,
}

impl Issue {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            rule_id: None,
            category: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn suggestion(message: impl Into<String>) -> Self {
        Self::new(Severity::Suggestion, message)
    }

    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    pub fn in_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rule_id(&self) -> Option<&str> {
        self.rule_id.as_deref()
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn is_project(&self) -> bool {
        self.category == Some(Category::Project)
    }

    /// Structured form used by machine-readable outputs.
    ///
    /// Optional fields are omitted rather than emitted as null.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("severity".to_string(), json!(self.severity.as_str()));
        map.insert("message".to_string(), json!(self.message));
        if let Some(ref rule_id) = self.rule_id {
            map.insert("ruleId".to_string(), json!(rule_id));
        }
        if let Some(category) = self.category {
            map.insert("category".to_string(), json!(category.as_str()));
        }
        Value::Object(map)
    }
}

/// Human form: the message, prefixed with `[project]` for project rules.
impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_project() {
            write!(f, "[project] {}", self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_json_omits_missing_fields() {
        let issue = Issue::error("missing required field: name");
        assert_eq!(
            issue.to_json(),
            json!({"severity": "error", "message": "missing required field: name"})
        );
    }

    #[test]
    fn test_issue_json_with_rule_and_category() {
        let issue = Issue::warning("body too long")
            .with_rule("content.body-length")
            .in_category(Category::Content);
        assert_eq!(
            issue.to_json(),
            json!({
                "severity": "warning",
                "message": "body too long",
                "ruleId": "content.body-length",
                "category": "content"
            })
        );
    }

    #[test]
    fn test_project_issue_display_is_prefixed() {
        let issue = Issue::error("needs owner").in_category(Category::Project);
        assert_eq!(issue.to_string(), "[project] needs owner");
        let base = Issue::error("needs owner").in_category(Category::Schema);
        assert_eq!(base.to_string(), "needs owner");
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("ERROR".parse::<Severity>().unwrap(), Severity::Error);
        assert!("fatal".parse::<Severity>().is_err());
    }
}
