//! Phase and pending listings.

use crate::discovery::{classify, skill_dirs, Classification};
use skillgate_common::Result;
use skillgate_schema::{PendingBundle, RuleSet};
use std::fmt;
use std::path::Path;

/// Implementation status of a skill listed in a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillStatus {
    Completed,
    Planned,
    NotStarted,
}

impl SkillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillStatus::Completed => "completed",
            SkillStatus::Planned => "planned",
            SkillStatus::NotStarted => "not started",
        }
    }
}

impl fmt::Display for SkillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Classification> for SkillStatus {
    fn from(classification: Classification) -> Self {
        match classification {
            Classification::Validated => SkillStatus::Completed,
            Classification::Pending => SkillStatus::Planned,
            Classification::Unknown => SkillStatus::NotStarted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSkill {
    pub identifier: String,
    pub status: SkillStatus,
}

/// One phase with the on-disk status of each listed skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOverview {
    pub id: u32,
    pub name: String,
    /// In the order the phase lists them.
    pub skills: Vec<PhaseSkill>,
}

impl PhaseOverview {
    pub fn count(&self, status: SkillStatus) -> usize {
        self.skills.iter().filter(|s| s.status == status).count()
    }
}

/// Every phase in ascending id order.
pub fn phase_overview(skills_dir: &Path, rules: &RuleSet) -> Vec<PhaseOverview> {
    rules
        .phases()
        .map(|phase| PhaseOverview {
            id: phase.id,
            name: phase.name.clone(),
            skills: phase
                .skills
                .iter()
                .map(|identifier| PhaseSkill {
                    identifier: identifier.clone(),
                    status: classify(&skills_dir.join(identifier)).into(),
                })
                .collect(),
        })
        .collect()
}

/// Draft-only bundles in the skills directory, sorted, with their phase.
pub fn pending_overview(skills_dir: &Path, rules: &RuleSet) -> Result<Vec<PendingBundle>> {
    Ok(skill_dirs(skills_dir)?
        .into_iter()
        .filter(|c| classify(&c.path) == Classification::Pending)
        .map(|c| {
            let phase = rules.phase_of(&c.identifier);
            PendingBundle::new(c.identifier, phase)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skillgate_common::{DESCRIPTOR_FILE, DRAFT_FILE};
    use skillgate_schema::load;
    use tempfile::tempdir;

    #[test]
    fn test_overviews() {
        let dir = tempdir().unwrap();
        let skills = dir.path().join("skills");
        for (name, file) in [("done", DESCRIPTOR_FILE), ("draft", DRAFT_FILE), ("loose", DRAFT_FILE)] {
            std::fs::create_dir_all(skills.join(name)).unwrap();
            std::fs::write(skills.join(name).join(file), "x").unwrap();
        }
        let rules_path = dir.path().join("rules.yaml");
        std::fs::write(
            &rules_path,
            "phases:\n  phase_1:\n    name: Core\n    skills: [done, draft, later]\n",
        )
        .unwrap();
        let rules = load(&rules_path).unwrap();

        let phases = phase_overview(&skills, &rules);
        assert_eq!(phases.len(), 1);
        let statuses: Vec<_> = phases[0].skills.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                SkillStatus::Completed,
                SkillStatus::Planned,
                SkillStatus::NotStarted
            ]
        );
        assert_eq!(phases[0].count(SkillStatus::Planned), 1);

        let pending = pending_overview(&skills, &rules).unwrap();
        assert_eq!(
            pending,
            vec![PendingBundle::new("draft", Some(1)), PendingBundle::new("loose", None)]
        );
    }
}
