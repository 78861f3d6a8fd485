//! Content heuristics over the body and description.

use crate::check::{Check, CheckError};
use crate::patterns::{MARKDOWN_LINK, URL_SCHEME, WINDOWS_PATH};
use skillgate_schema::{Category, Issue, RuleSet, SkillBundle};

pub struct BodyLengthCheck;

impl Check for BodyLengthCheck {
    fn id(&self) -> &str {
        "content.body-length"
    }

    fn category(&self) -> Category {
        Category::Content
    }

    fn run(&self, bundle: &SkillBundle, rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        let lines = bundle.body_line_count();
        let max = rules.base().max_body_lines;
        if lines > max {
            return Ok(vec![Issue::warning(format!(
                "body has {} lines (limit {})",
                lines, max
            ))
            .with_rule(self.id())]);
        }
        Ok(vec![])
    }
}

/// Skipped when the description is absent; that is a schema error already.
pub struct DescriptionLengthCheck;

impl Check for DescriptionLengthCheck {
    fn id(&self) -> &str {
        "content.description-length"
    }

    fn category(&self) -> Category {
        Category::Content
    }

    fn run(&self, bundle: &SkillBundle, rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        let min = rules.base().min_description_length;
        match bundle.field_str("description") {
            Some(description) if description.trim().chars().count() < min => {
                Ok(vec![Issue::warning(format!(
                    "description is shorter than {} characters",
                    min
                ))
                .with_rule(self.id())])
            }
            _ => Ok(vec![]),
        }
    }
}

/// Relative links must point at files that exist in the bundle.
pub struct ReferenceCheck;

impl Check for ReferenceCheck {
    fn id(&self) -> &str {
        "content.references"
    }

    fn category(&self) -> Category {
        Category::Content
    }

    fn run(&self, bundle: &SkillBundle, _rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        let mut seen = Vec::new();
        for caps in MARKDOWN_LINK.captures_iter(bundle.body()) {
            let Some(target) = local_target(&caps[1]) else {
                continue;
            };
            if !bundle.has_resource(&target) && !seen.contains(&target) {
                seen.push(target);
            }
        }
        Ok(seen
            .into_iter()
            .map(|path| Issue::warning(format!("broken reference: {}", path)).with_rule(self.id()))
            .collect())
    }
}

/// Normalized bundle-relative path of a link, or `None` for external links
/// and in-page anchors.
fn local_target(raw: &str) -> Option<String> {
    if raw.starts_with('#') || raw.starts_with('/') || URL_SCHEME.is_match(raw) {
        return None;
    }
    let path = raw.split(['#', '?']).next().unwrap_or(raw);
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Paths in the body should use forward slashes.
pub struct PathStyleCheck;

impl Check for PathStyleCheck {
    fn id(&self) -> &str {
        "content.path-style"
    }

    fn category(&self) -> Category {
        Category::Content
    }

    fn run(&self, bundle: &SkillBundle, _rules: &RuleSet) -> Result<Vec<Issue>, CheckError> {
        let mut seen: Vec<&str> = Vec::new();
        for m in WINDOWS_PATH.find_iter(bundle.body()) {
            if !seen.contains(&m.as_str()) {
                seen.push(m.as_str());
            }
        }
        Ok(seen
            .into_iter()
            .map(|path| {
                Issue::warning(format!("use forward slashes in path: {}", path))
                    .with_rule(self.id())
            })
            .collect())
    }
}

pub fn checks<'r>() -> Vec<Box<dyn Check + 'r>> {
    vec![
        Box::new(BodyLengthCheck),
        Box::new(DescriptionLengthCheck),
        Box::new(ReferenceCheck),
        Box::new(PathStyleCheck),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bundle(description: &str, body: &str) -> SkillBundle {
        SkillBundle::from_descriptor(
            "demo",
            &format!("---\nname: demo\ndescription: {}\n---\n{}", description, body),
        )
    }

    fn messages(check: &dyn Check, bundle: &SkillBundle) -> Vec<String> {
        check
            .run(bundle, &RuleSet::default())
            .unwrap()
            .iter()
            .map(|i| i.message().to_string())
            .collect()
    }

    #[test]
    fn test_body_length_limit() {
        let long = "line\n".repeat(501);
        assert_eq!(
            messages(&BodyLengthCheck, &bundle("A long enough description text", &long)),
            vec!["body has 501 lines (limit 500)"]
        );
        let ok = "line\n".repeat(500);
        assert!(messages(&BodyLengthCheck, &bundle("whatever", &ok)).is_empty());
    }

    #[test]
    fn test_short_description() {
        assert_eq!(
            messages(&DescriptionLengthCheck, &bundle("Too short", "# Body\n")),
            vec!["description is shorter than 20 characters"]
        );
    }

    #[test]
    fn test_missing_description_is_not_short() {
        let bundle = SkillBundle::from_descriptor("demo", "---\nname: demo\n---\n# Body\n");
        assert!(messages(&DescriptionLengthCheck, &bundle).is_empty());
    }

    #[test]
    fn test_broken_references() {
        let body = "See [forms](forms.md), [guide](./docs/guide.md#setup), \
                    [again](forms.md), [site](https://example.com) and [top](#top).\n";
        let bundle = bundle("Fills PDF forms when asked to", body).with_resources(["docs/guide.md"]);
        assert_eq!(
            messages(&ReferenceCheck, &bundle),
            vec!["broken reference: forms.md"]
        );
    }

    #[test]
    fn test_local_target() {
        assert_eq!(local_target("./a/b.md"), Some("a/b.md".to_string()));
        assert_eq!(local_target("a/../b.md?raw=1"), Some("b.md".to_string()));
        assert_eq!(local_target("../outside.md"), None);
        assert_eq!(local_target("mailto:someone@example.com"), None);
    }

    #[test]
    fn test_backslash_paths() {
        let body = "Run scripts\\fill.py, then scripts\\fill.py again.\n";
        assert_eq!(
            messages(&PathStyleCheck, &bundle("Fills PDF forms when asked to", body)),
            vec!["use forward slashes in path: scripts\\fill.py"]
        );
    }
}
