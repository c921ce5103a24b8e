//! Project construction and completion.

use chrono::{DateTime, Utc};
use tracing::info;

use breadline_ledger::{Ledger, rules};
use breadline_types::{EventKind, ProjectId};

use super::TickSummary;

pub(super) fn step(ledger: &mut Ledger, now: DateTime<Utc>, summary: &mut TickSummary) {
    let finished: Vec<ProjectId> = ledger
        .projects
        .values_mut()
        .filter_map(|p| {
            p.remaining_ticks = p.remaining_ticks.saturating_sub(1);
            (p.remaining_ticks == 0).then_some(p.id)
        })
        .collect();

    for id in finished {
        let Some(project) = ledger.projects.remove(&id) else {
            continue;
        };
        let bundle = rules::project_bundle(project.kind);
        ledger.world.adjust_grain(bundle.grain);
        ledger.world.adjust_unrest(bundle.unrest);
        ledger.world.decay_relief_ticks = ledger
            .world
            .decay_relief_ticks
            .max(bundle.decay_relief_ticks);
        if let Some(owner) = ledger.participant_mut(project.owner) {
            owner.adjust_reputation(bundle.reputation);
            owner.adjust_heat(bundle.heat);
        }
        let owner_name = ledger.name_of(project.owner);
        ledger.announce(
            now,
            EventKind::Civic,
            format!("The {} funded by {owner_name} is finished.", project.kind.label()),
        );
        info!(project = %id, kind = ?project.kind, "Project completed");
        summary.projects_completed = summary.projects_completed.saturating_add(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::{ParticipantId, Project, ProjectKind};

    use super::*;

    #[test]
    fn canal_completes_with_buff() {
        let mut ledger = Ledger::new();
        let owner = ParticipantId::new();
        ledger.register_participant(owner, Utc::now(), &mut SmallRng::seed_from_u64(5));
        let id = ledger.counters.project();
        ledger.projects.insert(
            id,
            Project {
                id,
                owner,
                kind: ProjectKind::Canal,
                remaining_ticks: 2,
                started_tick: 0,
            },
        );
        let grain = ledger.world.grain_supply();
        let mut summary = TickSummary::default();
        step(&mut ledger, Utc::now(), &mut summary);
        assert_eq!(summary.projects_completed, 0);
        step(&mut ledger, Utc::now(), &mut summary);
        assert_eq!(summary.projects_completed, 1);
        assert!(ledger.projects.is_empty());
        assert_eq!(ledger.world.grain_supply(), grain.saturating_add(20));
        assert_eq!(ledger.world.decay_relief_ticks, rules::CANAL_RELIEF_TICKS);
    }
}
