//! Civic projects and crisis response.

use breadline_ledger::{Ledger, rules};
use breadline_types::{EventKind, Project, ProjectKind};

use super::Turn;
use crate::error::Rejection;
use crate::validation;

/// Pay for a civic project. The cost leaves circulation.
pub fn fund_project(
    ledger: &mut Ledger,
    turn: Turn,
    kind: ProjectKind,
) -> Result<String, Rejection> {
    let patron = validation::actor(ledger, turn.pid)?;
    if ledger.projects.len() >= rules::MAX_ACTIVE_PROJECTS {
        return Err(Rejection::ProjectLimit);
    }
    if ledger.projects.values().any(|p| p.owner == turn.pid) {
        return Err(Rejection::ProjectInProgress);
    }
    let cost = rules::project_cost(kind);
    validation::gold(patron, cost)?;
    let patron_name = patron.name.clone();

    ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?
        .debit_gold(cost)
        .map_err(Rejection::gold)?;
    let id = ledger.counters.project();
    let remaining_ticks = rules::project_ticks(kind);
    ledger.projects.insert(
        id,
        Project {
            id,
            owner: turn.pid,
            kind,
            remaining_ticks,
            started_tick: ledger.world.tick_count,
        },
    );
    ledger.announce(
        turn.now,
        EventKind::Civic,
        format!("{patron_name} funds the {}.", kind.label()),
    );
    tracing::info!(participant = %turn.pid, project = %id, ?kind, cost, "Project funded");
    Ok(format!(
        "Workers start on the {} ({remaining_ticks} ticks).",
        kind.label()
    ))
}

/// Pour gold and grain into the active crisis.
///
/// Contributions are consumed. Each gold is one mitigation point and each
/// sack is three.
pub fn respond_crisis(
    ledger: &mut Ledger,
    turn: Turn,
    gold: u32,
    grain: u32,
) -> Result<String, Rejection> {
    let helper = validation::actor(ledger, turn.pid)?;
    let Some(crisis) = ledger.crisis.as_ref() else {
        return Err(Rejection::NoCrisis);
    };
    if crisis.mitigation_progress >= crisis.mitigation_needed {
        return Err(Rejection::CrisisContained);
    }
    if gold == 0 && grain == 0 {
        return Err(Rejection::NothingOffered);
    }
    validation::gold(helper, gold)?;
    validation::grain(helper, grain)?;
    let points = gold
        .saturating_mul(rules::CRISIS_POINTS_PER_GOLD)
        .saturating_add(grain.saturating_mul(rules::CRISIS_POINTS_PER_SACK));

    let helper = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    helper.debit_gold(gold).map_err(Rejection::gold)?;
    helper.debit_grain(grain).map_err(Rejection::grain)?;
    let Some(crisis) = ledger.crisis.as_mut() else {
        return Err(Rejection::NoCrisis);
    };
    crisis.mitigation_progress = crisis.mitigation_progress.saturating_add(points);
    let share = crisis.contributors.entry(turn.pid).or_insert(0);
    *share = share.saturating_add(points);
    let (needed, progress, label) = (
        crisis.mitigation_needed,
        crisis.mitigation_progress,
        crisis.kind.label(),
    );
    if progress >= needed {
        return Ok(format!("The {label} is under control."));
    }
    Ok(format!(
        "You add {points} to the effort against the {label} ({progress}/{needed})."
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::{Crisis, CrisisKind, ParticipantId};

    use super::*;

    fn setup() -> (Ledger, Turn) {
        let mut ledger = Ledger::new();
        let turn = Turn {
            pid: ParticipantId::new(),
            now: Utc::now(),
        };
        ledger.register_participant(turn.pid, turn.now, &mut SmallRng::seed_from_u64(3));
        ledger
            .participant_mut(turn.pid)
            .unwrap()
            .credit_gold(100);
        (ledger, turn)
    }

    #[test]
    fn one_project_per_owner() {
        let (mut ledger, turn) = setup();
        fund_project(&mut ledger, turn, ProjectKind::Shrine).unwrap();
        assert_eq!(
            fund_project(&mut ledger, turn, ProjectKind::PublicFeast),
            Err(Rejection::ProjectInProgress)
        );
        let gold = ledger.participant(turn.pid).unwrap().gold();
        assert_eq!(gold, rules::STARTING_GOLD + 100 - 25);
    }

    #[test]
    fn project_cap_is_citywide() {
        let (mut ledger, turn) = setup();
        for seed in 0..3 {
            let pid = ParticipantId::new();
            ledger.register_participant(pid, turn.now, &mut SmallRng::seed_from_u64(seed));
            ledger.participant_mut(pid).unwrap().credit_gold(50);
            fund_project(&mut ledger, Turn { pid, now: turn.now }, ProjectKind::Shrine).unwrap();
        }
        assert_eq!(
            fund_project(&mut ledger, turn, ProjectKind::Shrine),
            Err(Rejection::ProjectLimit)
        );
    }

    #[test]
    fn crisis_contributions_accumulate() {
        let (mut ledger, turn) = setup();
        assert_eq!(
            respond_crisis(&mut ledger, turn, 5, 0),
            Err(Rejection::NoCrisis)
        );
        ledger.crisis = Some(Crisis {
            id: ledger.counters.crisis(),
            kind: CrisisKind::Fire,
            severity: 2,
            remaining_ticks: 7,
            mitigation_needed: 30,
            mitigation_progress: 0,
            contributors: BTreeMap::new(),
            started_tick: 0,
        });
        assert_eq!(
            respond_crisis(&mut ledger, turn, 0, 0),
            Err(Rejection::NothingOffered)
        );
        respond_crisis(&mut ledger, turn, 10, 2).unwrap();
        let crisis = ledger.crisis.as_ref().unwrap();
        assert_eq!(crisis.mitigation_progress, 16);
        assert_eq!(crisis.contributors.get(&turn.pid), Some(&16));
        assert_eq!(ledger.participant(turn.pid).unwrap().grain(), rules::STARTING_GRAIN - 2);

        respond_crisis(&mut ledger, turn, 14, 0).unwrap();
        let gold = ledger.participant(turn.pid).unwrap().gold();
        assert_eq!(
            respond_crisis(&mut ledger, turn, 5, 0),
            Err(Rejection::CrisisContained)
        );
        assert_eq!(ledger.participant(turn.pid).unwrap().gold(), gold);
        assert_eq!(ledger.crisis.as_ref().unwrap().mitigation_progress, 30);
    }
}
