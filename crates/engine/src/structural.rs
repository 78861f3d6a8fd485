//! Structural checks: descriptor presence, frontmatter block, body.

use crate::check::{Check, CheckError};
use skillgate_common::DESCRIPTOR_FILE;
use skillgate_schema::{Category, Issue, RuleSet, SkillBundle};

/// Descriptor must exist and open with a well-formed frontmatter block.
pub struct FrontmatterBlockCheck;

impl Check for FrontmatterBlockCheck {
    fn id(&self) -> &str {
        "structural.frontmatter"
    }

    fn category(&self) -> Category {
        Category::Structural
    }

    fn run(&self, bundle: &SkillBundle, _rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        if !bundle.has_descriptor() {
            return Ok(vec![Issue::error(format!(
                "missing descriptor file: {}",
                DESCRIPTOR_FILE
            ))
            .with_rule(self.id())]);
        }

        Ok(bundle
            .frontmatter_error()
            .map(|err| Issue::error(err.to_string()).with_rule(self.id()))
            .into_iter()
            .collect())
    }
}

/// The body after the frontmatter must not be blank.
pub struct BodyCheck;

impl Check for BodyCheck {
    fn id(&self) -> &str {
        "structural.body"
    }

    fn category(&self) -> Category {
        Category::Structural
    }

    fn run(&self, bundle: &SkillBundle, _rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        if bundle.has_descriptor() && bundle.body().trim().is_empty() {
            return Ok(vec![Issue::error("empty body").with_rule(self.id())]);
        }
        Ok(vec![])
    }
}

pub fn checks<'r>() -> Vec<Box<dyn Check + 'r>> {
    vec![Box::new(FrontmatterBlockCheck), Box::new(BodyCheck)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(check: &dyn Check, text: &str) -> Vec<String> {
        let bundle = SkillBundle::from_descriptor("demo", text);
        check
            .run(&bundle, &RuleSet::default())
            .unwrap()
            .iter()
            .map(|i| i.message().to_string())
            .collect()
    }

    #[test]
    fn test_missing_frontmatter() {
        assert_eq!(
            messages(&FrontmatterBlockCheck, "# Just a body\n"),
            vec!["missing frontmatter block"]
        );
    }

    #[test]
    fn test_unterminated_frontmatter() {
        assert_eq!(
            messages(&FrontmatterBlockCheck, "---\nname: demo\n# Body\n"),
            vec!["unterminated frontmatter block"]
        );
    }

    #[test]
    fn test_well_formed_descriptor() {
        let text = "---\nname: demo\n---\n# Body\n";
        assert!(messages(&FrontmatterBlockCheck, text).is_empty());
        assert!(messages(&BodyCheck, text).is_empty());
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(
            messages(&BodyCheck, "---\nname: demo\n---\n\n   \n"),
            vec!["empty body"]
        );
    }
}
