//! Frontmatter schema checks against the base rules.

use crate::check::{Check, CheckError};
use crate::patterns::XML_TAG;
use serde_yaml::Value;
use skillgate_schema::{Category, Issue, RuleSet, SkillBundle};

/// Every required key must be present, reported in configured order.
pub struct RequiredFieldsCheck;

impl Check for RequiredFieldsCheck {
    fn id(&self) -> &str {
        "schema.required-fields"
    }

    fn category(&self) -> Category {
        Category::Schema
    }

    fn run(&self, bundle: &SkillBundle, rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        Ok(rules
            .base()
            .required_fields
            .iter()
            .filter(|key| !bundle.frontmatter().contains_key(key.as_str()))
            .map(|key| {
                Issue::error(format!("missing required field: {}", key)).with_rule(self.id())
            })
            .collect())
    }
}

/// Required and length-bounded fields must be strings within their bounds.
pub struct FieldBoundsCheck;

impl Check for FieldBoundsCheck {
    fn id(&self) -> &str {
        "schema.field-bounds"
    }

    fn category(&self) -> Category {
        Category::Schema
    }

    fn run(&self, bundle: &SkillBundle, rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        let base = rules.base();
        let mut keys: Vec<&str> = base.required_fields.iter().map(String::as_str).collect();
        for key in base.max_lengths.keys() {
            if !keys.contains(&key.as_str()) {
                keys.push(key.as_str());
            }
        }

        let mut issues = Vec::new();
        for key in keys {
            let Some(value) = bundle.frontmatter().get(key) else {
                continue;
            };
            let Value::String(text) = value else {
                issues.push(
                    Issue::error(format!("field '{}' must be a string", key))
                        .with_rule(self.id()),
                );
                continue;
            };
            if let Some(&max) = base.max_lengths.get(key) {
                if text.chars().count() > max {
                    issues.push(
                        Issue::error(format!("field '{}' exceeds {} characters", key, max))
                            .with_rule(self.id()),
                    );
                }
            }
        }
        Ok(issues)
    }
}

/// The `name` field follows the naming pattern and avoids reserved words.
pub struct NameCheck;

impl Check for NameCheck {
    fn id(&self) -> &str {
        "schema.name"
    }

    fn category(&self) -> Category {
        Category::Schema
    }

    fn run(&self, bundle: &SkillBundle, rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        let Some(name) = bundle.field_str("name") else {
            return Ok(vec![]);
        };
        let base = rules.base();
        let mut issues = Vec::new();

        if !base.name_pattern.is_match(name) {
            issues.push(
                Issue::error(format!(
                    "name '{}' must be lowercase letters, digits and hyphens",
                    name
                ))
                .with_rule(self.id()),
            );
        }

        let lowered = name.to_lowercase();
        for word in &base.reserved_words {
            if lowered.contains(&word.to_lowercase()) {
                issues.push(
                    Issue::error(format!("name '{}' contains reserved word '{}'", name, word))
                        .with_rule(self.id()),
                );
            }
        }

        if name != bundle.identifier() {
            issues.push(
                Issue::warning(format!(
                    "name '{}' does not match directory '{}'",
                    name,
                    bundle.identifier()
                ))
                .with_rule(self.id()),
            );
        }

        Ok(issues)
    }
}

/// The description must not embed XML tags.
pub struct DescriptionMarkupCheck;

impl Check for DescriptionMarkupCheck {
    fn id(&self) -> &str {
        "schema.description-markup"
    }

    fn category(&self) -> Category {
        Category::Schema
    }

    fn run(&self, bundle: &SkillBundle, _rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        match bundle.field_str("description") {
            Some(description) if XML_TAG.is_match(description) => Ok(vec![Issue::error(
                "field 'description' must not contain XML tags",
            )
            .with_rule(self.id())]),
            _ => Ok(vec![]),
        }
    }
}

pub fn checks<'r>() -> Vec<Box<dyn Check + 'r>> {
    vec![
        Box::new(RequiredFieldsCheck),
        Box::new(FieldBoundsCheck),
        Box::new(NameCheck),
        Box::new(DescriptionMarkupCheck),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skillgate_schema::Severity;

    fn run(check: &dyn Check, identifier: &str, frontmatter: &str) -> Vec<Issue> {
        let text = format!("---\n{}---\n# Body\n", frontmatter);
        let bundle = SkillBundle::from_descriptor(identifier, &text);
        check.run(&bundle, &RuleSet::default()).unwrap()
    }

    fn messages(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(Issue::message).collect()
    }

    #[test]
    fn test_required_fields_in_order() {
        let issues = run(&RequiredFieldsCheck, "demo", "version: 1\n");
        assert_eq!(
            messages(&issues),
            vec![
                "missing required field: name",
                "missing required field: description"
            ]
        );
    }

    #[test]
    fn test_non_string_and_too_long() {
        let long = "x".repeat(1025);
        let issues = run(
            &FieldBoundsCheck,
            "demo",
            &format!("name: 42\ndescription: {}\n", long),
        );
        assert_eq!(
            messages(&issues),
            vec![
                "field 'name' must be a string",
                "field 'description' exceeds 1024 characters"
            ]
        );
    }

    #[test]
    fn test_name_pattern_and_reserved_words() {
        let issues = run(&NameCheck, "Claude_Helper", "name: Claude_Helper\n");
        assert_eq!(
            messages(&issues),
            vec![
                "name 'Claude_Helper' must be lowercase letters, digits and hyphens",
                "name 'Claude_Helper' contains reserved word 'claude'"
            ]
        );
    }

    #[test]
    fn test_name_mismatch_is_warning() {
        let issues = run(&NameCheck, "pdf-tools", "name: pdf-kit\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity(), Severity::Warning);
    }

    #[test]
    fn test_description_markup() {
        let issues = run(
            &DescriptionMarkupCheck,
            "demo",
            "description: Reads <context> blocks when asked\n",
        );
        assert_eq!(issues.len(), 1);
        assert!(run(&DescriptionMarkupCheck, "demo", "description: plain text\n").is_empty());
    }
}
