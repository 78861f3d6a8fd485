//! Text listings for `list-phases` and `list-pending`.

use crate::Style;
use skillgate_runner::{PhaseOverview, SkillStatus};
use skillgate_schema::PendingBundle;
use std::fmt::Write;

const RULE: &str = "==========================================";

fn status_marker(status: SkillStatus, style: Style) -> String {
    match status {
        SkillStatus::Completed => style.green("[done]"),
        SkillStatus::Planned => style.yellow("[planned]"),
        SkillStatus::NotStarted => style.dim("[not started]"),
    }
}

/// Phase breakdown with per-skill status.
pub fn render_phases(phases: &[PhaseOverview], style: Style) -> String {
    let mut out = format!("{}\nSkill Phases\n{}\n\n", RULE, RULE);

    for phase in phases {
        let _ = writeln!(
            out,
            "{}",
            style.cyan(&format!(
                "Phase {} - {} ({} skills, {} completed):",
                phase.id,
                phase.name,
                phase.skills.len(),
                phase.count(SkillStatus::Completed)
            ))
        );
        for skill in &phase.skills {
            let _ = writeln!(
                out,
                "  - {} {}",
                skill.identifier,
                status_marker(skill.status, style)
            );
        }
        out.push('\n');
    }

    let total: usize = phases.iter().map(|p| p.skills.len()).sum();
    let _ = writeln!(out, "Total phase skills: {}", total);
    out
}

/// Draft-only bundles with their phase label.
pub fn render_pending(pending: &[PendingBundle], style: Style) -> String {
    let mut out = format!(
        "{}\nPending Skills (draft only, no descriptor)\n{}\n\n",
        RULE, RULE
    );
    for bundle in pending {
        let label = bundle
            .phase
            .map(|p| format!(" (Phase {})", p))
            .unwrap_or_default();
        let _ = writeln!(out, "  {}{}", style.yellow(&bundle.identifier), label);
    }
    out.push('\n');
    let _ = writeln!(out, "Total pending: {}", pending.len());
    out
}
