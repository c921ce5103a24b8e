//! The city-wide crisis: onset, pressure, and resolution.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{info, warn};

use breadline_ledger::{Ledger, rules};
use breadline_types::{Crisis, CrisisKind, EventKind, GrainTier, UnrestTier};

use super::{CrisisOutcome, TickSummary};

pub(super) fn step<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    now: DateTime<Utc>,
    rng: &mut R,
    summary: &mut TickSummary,
) {
    let Some(mut crisis) = ledger.crisis.take() else {
        summary.crisis_started = maybe_start(ledger, now, rng);
        return;
    };

    if crisis.is_mitigated() {
        succeed(ledger, now, &crisis);
        summary.crisis_ended = Some(CrisisOutcome::Mitigated(crisis.kind));
        return;
    }

    let (unrest, grain) = rules::crisis_pressure(crisis.kind);
    let severity = i32::try_from(crisis.severity).unwrap_or(i32::MAX);
    ledger.world.adjust_unrest(unrest.saturating_mul(severity));
    ledger
        .world
        .adjust_grain(grain.saturating_mul(i64::from(crisis.severity)));

    crisis.remaining_ticks = crisis.remaining_ticks.saturating_sub(1);
    if crisis.remaining_ticks == 0 {
        fail(ledger, now, crisis.kind);
        summary.crisis_ended = Some(CrisisOutcome::Failed(crisis.kind));
    } else {
        ledger.crisis = Some(crisis);
    }
}

fn maybe_start<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<CrisisKind> {
    let mut chance = rules::CRISIS_BASE_CHANCE_PCT;
    if ledger.world.unrest_tier() >= UnrestTier::Unstable {
        chance = chance.saturating_add(rules::CRISIS_UNREST_BONUS_PCT);
    }
    if ledger.world.grain_tier() >= GrainTier::Scarce {
        chance = chance.saturating_add(rules::CRISIS_SCARCITY_BONUS_PCT);
    }
    if rng.random_range(0..100_u32) >= chance {
        return None;
    }

    let kind = *CrisisKind::ALL.choose(rng)?;
    let severity = rng.random_range(1..=rules::CRISIS_MAX_SEVERITY);
    let id = ledger.counters.crisis();
    ledger.crisis = Some(Crisis {
        id,
        kind,
        severity,
        remaining_ticks: rules::crisis_duration(severity),
        mitigation_needed: severity.saturating_mul(rules::CRISIS_MITIGATION_PER_SEVERITY),
        mitigation_progress: 0,
        contributors: BTreeMap::new(),
        started_tick: ledger.world.tick_count,
    });
    ledger.announce(
        now,
        EventKind::Civic,
        format!(
            "A {} breaks out (severity {severity}). The city needs help.",
            kind.label()
        ),
    );
    warn!(crisis = %id, ?kind, severity, "Crisis started");
    Some(kind)
}

fn succeed(ledger: &mut Ledger, now: DateTime<Utc>, crisis: &Crisis) {
    ledger.world.adjust_unrest(rules::CRISIS_SUCCESS_UNREST);
    ledger.world.adjust_grain(rules::CRISIS_SUCCESS_GRAIN);
    for &pid in crisis.contributors.keys() {
        if let Some(p) = ledger.participant_mut(pid) {
            p.adjust_reputation(rules::CRISIS_CONTRIBUTOR_REPUTATION);
        }
        ledger.notify(
            now,
            pid,
            EventKind::Civic,
            "The city remembers who helped.",
        );
    }
    ledger.announce(
        now,
        EventKind::Civic,
        format!("The {} is contained.", crisis.kind.label()),
    );
    info!(crisis = %crisis.id, contributors = crisis.contributors.len(), "Crisis mitigated");
}

fn fail(ledger: &mut Ledger, now: DateTime<Utc>, kind: CrisisKind) {
    let (grain, unrest, restriction) = rules::crisis_failure(kind);
    ledger.world.adjust_grain(grain);
    ledger.world.adjust_unrest(unrest);
    ledger.world.market_restriction_ticks =
        ledger.world.market_restriction_ticks.max(restriction);
    ledger.announce(
        now,
        EventKind::Civic,
        format!("The {} runs its course unchecked.", kind.label()),
    );
    warn!(?kind, "Crisis failed");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::ParticipantId;

    use super::*;

    fn riot(ledger: &mut Ledger, severity: u32, remaining_ticks: u32) {
        let id = ledger.counters.crisis();
        ledger.crisis = Some(Crisis {
            id,
            kind: CrisisKind::BreadRiot,
            severity,
            remaining_ticks,
            mitigation_needed: severity.saturating_mul(15),
            mitigation_progress: 0,
            contributors: BTreeMap::new(),
            started_tick: 0,
        });
    }

    #[test]
    fn unanswered_riot_fails() {
        let mut ledger = Ledger::new();
        riot(&mut ledger, 1, 2);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut summary = TickSummary::default();
        step(&mut ledger, Utc::now(), &mut rng, &mut summary);
        assert!(ledger.crisis.is_some());
        assert_eq!(ledger.world.unrest(), 13);
        step(&mut ledger, Utc::now(), &mut rng, &mut summary);
        assert!(ledger.crisis.is_none());
        assert_eq!(
            summary.crisis_ended,
            Some(CrisisOutcome::Failed(CrisisKind::BreadRiot))
        );
        assert_eq!(ledger.world.unrest(), 31);
        assert_eq!(ledger.world.market_restriction_ticks, 6);
    }

    #[test]
    fn mitigated_crisis_rewards_contributors() {
        let mut ledger = Ledger::new();
        let pid = ParticipantId::new();
        ledger.register_participant(pid, Utc::now(), &mut SmallRng::seed_from_u64(1));
        riot(&mut ledger, 1, 5);
        let crisis = ledger.crisis.as_mut().unwrap();
        crisis.mitigation_progress = 15;
        crisis.contributors.insert(pid, 15);
        let mut summary = TickSummary::default();
        step(&mut ledger, Utc::now(), &mut SmallRng::seed_from_u64(3), &mut summary);
        assert!(ledger.crisis.is_none());
        assert_eq!(
            summary.crisis_ended,
            Some(CrisisOutcome::Mitigated(CrisisKind::BreadRiot))
        );
        assert_eq!(ledger.participant(pid).unwrap().reputation(), 2);
        assert_eq!(ledger.world.unrest(), 4);
    }

    #[test]
    fn crises_eventually_start() {
        let mut ledger = Ledger::new();
        let mut rng = SmallRng::seed_from_u64(21);
        let started = (0..500).any(|_| maybe_start(&mut ledger, Utc::now(), &mut rng).is_some());
        assert!(started);
        let crisis = ledger.crisis.as_ref().unwrap();
        assert!((1..=3).contains(&crisis.severity));
        assert_eq!(crisis.mitigation_needed, crisis.severity.saturating_mul(15));
    }
}
