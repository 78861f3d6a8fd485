//! Rule-driven checks: community practices and project rules.

use crate::check::{Check, CheckError};
use crate::patterns::has_heading;
use skillgate_schema::{
    Category, CommunityPractice, Issue, PracticeKind, ProjectRule, RuleSet, SkillBundle,
};

const TOC_HEADINGS: [&str; 2] = ["contents", "table of contents"];

/// Whether `bundle` satisfies a practice kind.
///
/// Kinds that inspect an absent field are satisfied; missing required
/// fields are reported by the schema checks.
pub fn satisfies(kind: &PracticeKind, bundle: &SkillBundle) -> bool {
    match kind {
        PracticeKind::RequireSection { heading } => has_heading(bundle.body(), heading),
        PracticeKind::RequirePattern { pattern } => pattern.is_match(bundle.body()),
        PracticeKind::ForbidPattern { pattern } => !pattern.is_match(bundle.body()),
        PracticeKind::DescriptionPattern { pattern } => bundle
            .field_str("description")
            .map_or(true, |description| pattern.is_match(description)),
        PracticeKind::MaxBodyLines { max } => bundle.body_line_count() <= *max,
        PracticeKind::RequireField { field } => bundle.frontmatter().contains_key(field),
        PracticeKind::TocWhenLongerThan { lines } => {
            bundle.body_line_count() <= *lines
                || TOC_HEADINGS.iter().any(|h| has_heading(bundle.body(), h))
        }
    }
}

/// One enabled community practice; emits a suggestion when unmet.
pub struct PracticeCheck<'r> {
    id: String,
    practice: &'r CommunityPractice,
}

impl<'r> PracticeCheck<'r> {
    pub fn new(practice: &'r CommunityPractice) -> Self {
        Self {
            id: format!("community.{}", practice.id),
            practice,
        }
    }
}

impl Check for PracticeCheck<'_> {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Community
    }

    fn run(&self, bundle: &SkillBundle, _rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        if satisfies(&self.practice.kind, bundle) {
            return Ok(vec![]);
        }
        Ok(vec![Issue::suggestion(self.practice.message.as_str()).with_rule(self.id.as_str())])
    }
}

/// One project rule, at its configured severity.
pub struct ProjectRuleCheck<'r> {
    id: String,
    rule: &'r ProjectRule,
}

impl<'r> ProjectRuleCheck<'r> {
    pub fn new(rule: &'r ProjectRule) -> Self {
        Self {
            id: format!("project.{}", rule.id),
            rule,
        }
    }
}

impl Check for ProjectRuleCheck<'_> {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Project
    }

    fn run(&self, bundle: &SkillBundle, _rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        if satisfies(&self.rule.kind, bundle) {
            return Ok(vec![]);
        }
        Ok(vec![Issue::new(self.rule.severity, self.rule.message.as_str())
            .with_rule(self.id.as_str())])
    }
}
