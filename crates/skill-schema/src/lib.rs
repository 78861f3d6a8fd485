//! Skill bundle, rule set and report model for skillgate.
//!
//! This crate defines the read-only bundle snapshot the engine validates,
//! the layered rule set it validates against, and the result and report
//! types every formatter renders from.

pub mod bundle;
pub mod issue;
pub mod loader;
pub mod report;
pub mod result;
pub mod ruleset;

pub use bundle::{FrontmatterError, SkillBundle};
pub use issue::{Category, Issue, Severity};
pub use loader::{load, RuleSetLoader};
pub use report::{PendingBundle, ReportSummary, ValidationReport};
pub use result::ValidationResult;
pub use ruleset::{
    BaseRules, CommunityPractice, Phase, PracticeKind, Preset, ProjectRule, RuleSet, RuleSource,
};
