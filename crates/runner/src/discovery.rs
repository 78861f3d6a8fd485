//! Bundle discovery and classification.

use skillgate_common::{Error, Result, DESCRIPTOR_FILE, DRAFT_FILE};
use skillgate_schema::RuleSet;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which bundles a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// One bundle, by name under the skills directory or by path.
    Single(String),
    /// Every identifier listed in one phase, whether or not it exists yet.
    Phase(u32),
    /// Only directories that have a descriptor.
    CompletedOnly,
    All,
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryMode::Single(name) => write!(f, "single skill '{}'", name),
            DiscoveryMode::Phase(n) => write!(f, "phase {}", n),
            DiscoveryMode::CompletedOnly => write!(f, "completed skills"),
            DiscoveryMode::All => write!(f, "all skills"),
        }
    }
}

/// A bundle location chosen for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub identifier: String,
    pub path: PathBuf,
}

impl Candidate {
    pub fn new(identifier: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            identifier: identifier.into(),
            path: path.into(),
        }
    }
}

/// What a candidate directory holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Descriptor present; the engine runs.
    Validated,
    /// Draft only.
    Pending,
    /// Neither file, or no directory at all. Excluded from every count.
    Unknown,
}

/// Classify a candidate directory. A descriptor wins over a draft.
pub fn classify(path: &Path) -> Classification {
    if path.join(DESCRIPTOR_FILE).is_file() {
        Classification::Validated
    } else if path.join(DRAFT_FILE).is_file() {
        Classification::Pending
    } else {
        Classification::Unknown
    }
}

/// List the candidates for `mode`, sorted by identifier.
pub fn discover(skills_dir: &Path, mode: &DiscoveryMode, rules: &RuleSet) -> Result<Vec<Candidate>> {
    let mut candidates = match mode {
        DiscoveryMode::Single(name) => vec![resolve_single(skills_dir, name)?],
        DiscoveryMode::Phase(n) => {
            let phase = rules
                .phase(*n)
                .ok_or_else(|| Error::config(format!("phase {} is not defined", n)))?;
            let unique: BTreeSet<&str> = phase.skills.iter().map(String::as_str).collect();
            unique
                .into_iter()
                .map(|id| Candidate::new(id, skills_dir.join(id)))
                .collect()
        }
        DiscoveryMode::CompletedOnly => skill_dirs(skills_dir)?
            .into_iter()
            .filter(|c| classify(&c.path) == Classification::Validated)
            .collect(),
        DiscoveryMode::All => skill_dirs(skills_dir)?,
    };

    candidates.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    debug!("Discovered {} candidates for {}", candidates.len(), mode);
    Ok(candidates)
}

fn resolve_single(skills_dir: &Path, name: &str) -> Result<Candidate> {
    let under_skills = skills_dir.join(name);
    if under_skills.is_dir() {
        return Ok(Candidate::new(name, under_skills));
    }

    let as_path = PathBuf::from(name);
    if as_path.is_dir() {
        let identifier = as_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| name.to_string());
        return Ok(Candidate::new(identifier, as_path));
    }

    Err(Error::BundleNotFound {
        name: name.to_string(),
        path: under_skills,
    })
}

/// Every non-hidden subdirectory of the skills directory.
pub fn skill_dirs(skills_dir: &Path) -> Result<Vec<Candidate>> {
    if !skills_dir.is_dir() {
        return Err(Error::config(format!(
            "skills directory not found: {}",
            skills_dir.display()
        )));
    }

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(skills_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let identifier = entry.file_name().to_string_lossy().to_string();
        if identifier.starts_with('.') {
            continue;
        }
        dirs.push(Candidate::new(identifier, path));
    }
    dirs.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    Ok(dirs)
}
