//! Layered rule set definitions.

use crate::issue::Severity;
use regex::Regex;
use skillgate_common::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Required frontmatter keys, length and type bounds, naming patterns.
#[derive(Debug, Clone)]
pub struct BaseRules {
    /// Keys that must be present, reported in this order.
    pub required_fields: Vec<String>,
    /// Maximum character count per string field.
    pub max_lengths: BTreeMap<String, usize>,
    /// Pattern the `name` field must match in full.
    pub name_pattern: Regex,
    /// Words that may not appear in the `name` field.
    pub reserved_words: Vec<String>,
    /// Body line count above which a warning is raised.
    pub max_body_lines: usize,
    /// Description character count below which a warning is raised.
    pub min_description_length: usize,
}

impl Default for BaseRules {
    fn default() -> Self {
        let mut max_lengths = BTreeMap::new();
        max_lengths.insert("name".to_string(), 64);
        max_lengths.insert("description".to_string(), 1024);

        Self {
            required_fields: vec!["name".to_string(), "description".to_string()],
            max_lengths,
            name_pattern: default_name_pattern(),
            reserved_words: vec!["anthropic".to_string(), "claude".to_string()],
            max_body_lines: 500,
            min_description_length: 20,
        }
    }
}

pub(crate) const DEFAULT_NAME_PATTERN: &str = r"^[a-z0-9]+(-[a-z0-9]+)*$";

fn default_name_pattern() -> Regex {
    // Constant pattern, covered by tests.
    Regex::new(DEFAULT_NAME_PATTERN).expect("default name pattern is valid")
}

/// The fixed set of heuristics a community practice or project rule can use.
#[derive(Debug, Clone)]
pub enum PracticeKind {
    /// Body must contain a heading whose text contains `heading`.
    RequireSection { heading: String },
    /// Body must match `pattern`.
    RequirePattern { pattern: Regex },
    /// Body must not match `pattern`.
    ForbidPattern { pattern: Regex },
    /// Description, when present, must match `pattern`.
    DescriptionPattern { pattern: Regex },
    /// Body must not exceed `max` lines.
    MaxBodyLines { max: usize },
    /// Frontmatter must contain `field`.
    RequireField { field: String },
    /// Bodies longer than `lines` need a table of contents heading.
    TocWhenLongerThan { lines: usize },
}

/// A named heuristic check enabled through presets.
#[derive(Debug, Clone)]
pub struct CommunityPractice {
    pub id: String,
    pub description: String,
    /// Text of the emitted suggestion.
    pub message: String,
    pub kind: PracticeKind,
}

/// An additional project-specific check. Always additive.
#[derive(Debug, Clone)]
pub struct ProjectRule {
    pub id: String,
    pub description: String,
    pub message: String,
    pub severity: Severity,
    pub kind: PracticeKind,
}

/// Named bundle of enabled community practices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Preset {
    Minimal,
    Standard,
    Strict,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Minimal, Preset::Standard, Preset::Strict];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Minimal => "minimal",
            Preset::Standard => "standard",
            Preset::Strict => "strict",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "minimal" => Ok(Preset::Minimal),
            "standard" => Ok(Preset::Standard),
            "strict" => Ok(Preset::Strict),
            other => Err(Error::config(format!(
                "unknown preset '{}' (expected minimal, standard or strict)",
                other
            ))),
        }
    }
}

/// A named, ordered group of skill identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    pub id: u32,
    pub name: String,
    pub skills: Vec<String>,
}

/// Where one layer of the rule set came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// The layer file was not found; built-in defaults were used.
    BuiltinDefault { missing: Option<PathBuf> },
    File(PathBuf),
}

impl RuleSource {
    pub fn is_builtin(&self) -> bool {
        matches!(self, RuleSource::BuiltinDefault { .. })
    }
}

/// Immutable, layered configuration for one run.
///
/// Overrides return a new value; nothing mutates a rule set in place once it
/// has been built.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub(crate) base: BaseRules,
    pub(crate) practices: BTreeMap<String, CommunityPractice>,
    pub(crate) presets: BTreeMap<Preset, Vec<String>>,
    pub(crate) active_preset: Preset,
    pub(crate) project_rules: Vec<ProjectRule>,
    pub(crate) project_rules_enabled: bool,
    pub(crate) phases: BTreeMap<u32, Phase>,
    pub(crate) sources: Vec<RuleSource>,
}

impl Default for RuleSet {
    fn default() -> Self {
        crate::loader::builtin_ruleset()
    }
}

impl RuleSet {
    pub fn base(&self) -> &BaseRules {
        &self.base
    }

    /// Every defined community practice, by id.
    pub fn practices(&self) -> &BTreeMap<String, CommunityPractice> {
        &self.practices
    }

    pub fn active_preset(&self) -> Preset {
        self.active_preset
    }

    /// Practice ids listed for a preset.
    pub fn preset_ids(&self, preset: Preset) -> &[String] {
        self.presets.get(&preset).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Practices enabled by the active preset, in ascending id order.
    ///
    /// Preset entries naming undefined practices are skipped.
    pub fn enabled_practices(&self) -> Vec<&CommunityPractice> {
        let enabled: BTreeSet<&str> = self
            .preset_ids(self.active_preset)
            .iter()
            .map(String::as_str)
            .collect();
        self.practices
            .values()
            .filter(|p| enabled.contains(p.id.as_str()))
            .collect()
    }

    pub fn project_rules(&self) -> &[ProjectRule] {
        &self.project_rules
    }

    pub fn project_rules_enabled(&self) -> bool {
        self.project_rules_enabled && !self.project_rules.is_empty()
    }

    /// Phases in ascending numeric id order.
    pub fn phases(&self) -> impl Iterator<Item = &Phase> {
        self.phases.values()
    }

    pub fn phase(&self, id: u32) -> Option<&Phase> {
        self.phases.get(&id)
    }

    /// The first phase, by ascending id, listing `identifier`.
    pub fn phase_of(&self, identifier: &str) -> Option<u32> {
        self.phases
            .values()
            .find(|phase| phase.skills.iter().any(|s| s == identifier))
            .map(|phase| phase.id)
    }

    /// Every identifier listed in any phase.
    pub fn all_phase_skills(&self) -> BTreeSet<&str> {
        self.phases
            .values()
            .flat_map(|phase| phase.skills.iter().map(String::as_str))
            .collect()
    }

    pub fn sources(&self) -> &[RuleSource] {
        &self.sources
    }

    /// True when at least one layer fell back to built-in defaults.
    pub fn used_builtin_defaults(&self) -> bool {
        self.sources.iter().any(RuleSource::is_builtin)
    }

    /// Select the active community preset by name.
    pub fn select_preset(&self, name: &str) -> Result<RuleSet> {
        let preset: Preset = name.parse()?;
        Ok(self.with_preset(preset))
    }

    pub fn with_preset(&self, preset: Preset) -> RuleSet {
        debug!("Selecting community preset: {}", preset);
        RuleSet {
            active_preset: preset,
            ..self.clone()
        }
    }

    /// Same base and project rules, no community practices.
    pub fn without_community(&self) -> RuleSet {
        debug!("Disabling community practice checks");
        RuleSet {
            practices: BTreeMap::new(),
            ..self.clone()
        }
    }

    /// Same base and community rules, project rules switched off.
    pub fn without_project_rules(&self) -> RuleSet {
        debug!("Disabling project rule checks");
        RuleSet {
            project_rules_enabled: false,
            ..self.clone()
        }
    }
}
