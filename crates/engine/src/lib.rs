//! Skillgate validation engine.
//!
//! [`validate`] runs every check category against one bundle in a fixed
//! order: structural, frontmatter schema, content heuristics, community
//! practices, project rules. All categories always run; a failing check is
//! turned into an error issue and never stops the others.

pub mod check;
pub mod content;
pub mod frontmatter;
pub mod patterns;
pub mod practice;
pub mod structural;

pub use check::{run_check, Check, CheckError, CHECK_FAILURE_RULE};

use practice::{PracticeCheck, ProjectRuleCheck};
use skillgate_schema::{RuleSet, SkillBundle, ValidationResult};
use tracing::debug;

/// The checks a rule set enables, in execution order.
pub fn checks_for(rules: &RuleSet) -> Vec<Box<dyn Check + '_>> {
    let mut checks: Vec<Box<dyn Check + '_>> = Vec::new();
    checks.extend(structural::checks());
    checks.extend(frontmatter::checks());
    checks.extend(content::checks());

    for practice in rules.enabled_practices() {
        checks.push(Box::new(PracticeCheck::new(practice)));
    }

    if rules.project_rules_enabled() {
        for rule in rules.project_rules() {
            checks.push(Box::new(ProjectRuleCheck::new(rule)));
        }
    }

    checks
}

/// Validate one bundle against a rule set.
pub fn validate(bundle: &SkillBundle, rules: &RuleSet) -> ValidationResult {
    let issues = checks_for(rules)
        .iter()
        .flat_map(|check| run_check(check.as_ref(), bundle, rules))
        .collect();

    let result = ValidationResult::from_issues(bundle.identifier(), issues);
    debug!(
        "Validated {}: {} errors, {} warnings, {} suggestions",
        result.identifier(),
        result.errors().len(),
        result.warnings().len(),
        result.community().len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skillgate_schema::{Category, Preset};

    const ALPHA: &str = "---\nname: alpha\n---\n# Alpha\n\nConverts tables.\n\n## Examples\n\nConvert `data.csv` to markdown.\n";

    const BETA: &str = "---\nname: beta\ndescription: Formats reports when a summary table is requested\n---\n# Beta\n\nBuilds summary tables.\n\n## Examples\n\nTODO: add a second example.\n";

    #[test]
    fn test_alpha_missing_description() {
        let bundle = SkillBundle::from_descriptor("alpha", ALPHA);
        let result = validate(&bundle, &RuleSet::default());
        assert!(!result.passed());
        assert_eq!(
            result.error_messages(),
            vec!["missing required field: description"]
        );
        assert!(result.warnings().is_empty());
        assert!(result.community().is_empty());
    }

    #[test]
    fn test_beta_strict_only_heuristic() {
        let bundle = SkillBundle::from_descriptor("beta", BETA);
        let rules = RuleSet::default();

        let minimal = validate(&bundle, &rules.with_preset(Preset::Minimal));
        assert!(minimal.passed());
        assert!(minimal.warnings().is_empty());
        assert!(minimal.community().is_empty());

        let strict = validate(&bundle, &rules.with_preset(Preset::Strict));
        assert!(strict.passed());
        assert_eq!(strict.community().len(), 1);
        assert_eq!(
            strict.community()[0].rule_id(),
            Some("community.no-todo-markers")
        );
    }

    #[test]
    fn test_validation_is_deterministic() {
        let bundle = SkillBundle::from_descriptor("beta", BETA);
        let rules = RuleSet::default().with_preset(Preset::Strict);
        let first = serde_json_string(&validate(&bundle, &rules));
        let second = serde_json_string(&validate(&bundle, &rules));
        assert_eq!(first, second);
    }

    fn serde_json_string(result: &ValidationResult) -> String {
        result.to_json().to_string()
    }

    #[test]
    fn test_passed_depends_only_on_errors() {
        let text = "---\nname: gamma\ndescription: short\n---\n# Gamma\n\nSee [notes](notes.md).\n";
        let bundle = SkillBundle::from_descriptor("gamma", text);
        let result = validate(&bundle, &RuleSet::default().with_preset(Preset::Strict));
        assert!(!result.warnings().is_empty());
        assert!(!result.community().is_empty());
        assert!(result.errors().is_empty());
        assert!(result.passed());
    }

    #[test]
    fn test_disabled_community_yields_no_suggestions() {
        let bundle = SkillBundle::from_descriptor("beta", BETA);
        let rules = RuleSet::default()
            .with_preset(Preset::Strict)
            .without_community();
        assert!(validate(&bundle, &rules).community().is_empty());
    }

    #[test]
    fn test_all_categories_run_after_structural_failure() {
        let bundle = SkillBundle::from_descriptor("delta", "no frontmatter here\n");
        let result = validate(&bundle, &RuleSet::default());
        let categories: Vec<_> = result
            .errors()
            .iter()
            .filter_map(|issue| issue.category())
            .collect();
        assert_eq!(
            categories,
            vec![Category::Structural, Category::Schema, Category::Schema]
        );
        // Standard preset still evaluates the body.
        assert_eq!(result.community().len(), 1);
    }

    #[test]
    fn test_check_order_is_fixed() {
        let rules = RuleSet::default();
        let ids: Vec<String> = checks_for(&rules)
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        assert_eq!(ids.first().map(String::as_str), Some("structural.frontmatter"));
        assert_eq!(
            ids.last().map(String::as_str),
            Some("community.usage-trigger")
        );
    }
}
