//! The check abstraction and its failure guard.

use skillgate_common::Error;
use skillgate_schema::{Category, Issue, RuleSet, SkillBundle};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::warn;

/// Rule id carried by the synthetic issue for a check that crashed.
pub const CHECK_FAILURE_RULE: &str = "engine.check-failure";

/// Why a check could not produce its issues.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{0}")]
    Failed(String),

    #[error("panicked: {0}")]
    Panicked(String),
}

/// A single validation check.
///
/// The set of implementations is fixed: structural, frontmatter schema,
/// content heuristics, and the rule-driven community and project checks.
pub trait Check {
    /// Stable identifier, used as the rule id of emitted issues.
    fn id(&self) -> &str;

    fn category(&self) -> Category;

    fn run(&self, bundle: &SkillBundle, rules: &RuleSet) -> Result<Vec<Issue>, CheckError>;
}

/// Run one check, converting any failure into a synthetic error issue.
///
/// Issues without a category are tagged with the check's category.
pub fn run_check(check: &dyn Check, bundle: &SkillBundle, rules: &RuleSet) -> Vec<Issue> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| check.run(bundle, rules)));

    let reason = match outcome {
        Ok(Ok(issues)) => {
            return issues
                .into_iter()
                .map(|issue| match issue.category() {
                    Some(_) => issue,
                    None => issue.in_category(check.category()),
                })
                .collect();
        }
        Ok(Err(err)) => err.to_string(),
        Err(payload) => CheckError::Panicked(panic_message(payload.as_ref())).to_string(),
    };

    let failure = Error::CheckExecution {
        check: check.id().to_string(),
        reason: reason.clone(),
    };
    warn!("{} while validating {}", failure, bundle.identifier());

    vec![Issue::error(format!(
        "check '{}' failed unexpectedly: {}",
        check.id(),
        reason
    ))
    .with_rule(CHECK_FAILURE_RULE)
    .in_category(Category::Engine)]
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
