//! Embargo, seat tenure, and elections.

use chrono::{DateTime, Utc};
use tracing::info;

use breadline_ledger::{Ledger, rules};
use breadline_types::{EventKind, ParticipantId, SeatHolder, SeatKind};

use super::TickSummary;

pub(super) fn step(ledger: &mut Ledger, now: DateTime<Utc>, summary: &mut TickSummary) {
    ledger.policy.embargo_ticks = ledger.policy.embargo_ticks.saturating_sub(1);

    for kind in SeatKind::ALL {
        let Some(seat) = ledger.seats.get_mut(&kind) else {
            continue;
        };
        if let Some(remaining) = seat.election_ticks {
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                resolve_election(ledger, now, kind);
                summary.elections.push(kind);
            } else {
                seat.election_ticks = Some(remaining);
            }
            continue;
        }
        seat.tenure_ticks = seat.tenure_ticks.saturating_sub(1);
        if seat.tenure_ticks == 0 {
            seat.election_ticks = Some(rules::ELECTION_WINDOW_TICKS);
            ledger.announce(
                now,
                EventKind::Institution,
                format!(
                    "The {} seat is up for election in {} ticks.",
                    kind.title(),
                    rules::ELECTION_WINDOW_TICKS
                ),
            );
        }
    }
}

/// Highest reputation wins; ties go to the alphabetically first name.
pub(super) fn election_winner(ledger: &Ledger) -> Option<ParticipantId> {
    ledger
        .candidates()
        .max_by(|a, b| {
            a.reputation()
                .cmp(&b.reputation())
                .then_with(|| b.name.cmp(&a.name))
        })
        .map(|p| p.id)
}

fn resolve_election(ledger: &mut Ledger, now: DateTime<Utc>, kind: SeatKind) {
    let holder = election_winner(ledger).map_or(SeatHolder::Npc, SeatHolder::Participant);
    if let Some(seat) = ledger.seats.get_mut(&kind) {
        seat.holder = holder;
        seat.tenure_ticks = rules::SEAT_TENURE_TICKS;
        seat.election_ticks = None;
    }
    let text = match holder {
        SeatHolder::Participant(pid) => {
            let name = ledger.name_of(pid);
            ledger.notify(
                now,
                pid,
                EventKind::Institution,
                format!("You have been elected {}.", kind.title()),
            );
            format!("{name} is elected {}.", kind.title())
        }
        SeatHolder::Npc => format!(
            "No one stands for {}; {} resumes the post.",
            kind.title(),
            kind.npc_holder()
        ),
    };
    info!(seat = ?kind, ?holder, "Election resolved");
    ledger.announce(now, EventKind::Institution, text);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::Standing;

    use super::*;

    fn join(ledger: &mut Ledger, seed: u64, reputation: i32) -> ParticipantId {
        let pid = ParticipantId::new();
        let now = Utc::now();
        ledger.register_participant(pid, now, &mut SmallRng::seed_from_u64(seed));
        ledger.participant_mut(pid).unwrap().adjust_reputation(reputation);
        pid
    }

    #[test]
    fn highest_reputation_wins() {
        let mut ledger = Ledger::new();
        join(&mut ledger, 1, 5);
        let favourite = join(&mut ledger, 2, 10);
        ledger.seats.get_mut(&SeatKind::Treasurer).unwrap().election_ticks = Some(1);
        let mut summary = TickSummary::default();
        step(&mut ledger, Utc::now(), &mut summary);
        assert!(ledger.holds_seat(favourite, SeatKind::Treasurer));
        assert_eq!(summary.elections, vec![SeatKind::Treasurer]);
        let seat = ledger.seats.get(&SeatKind::Treasurer).unwrap();
        assert_eq!(seat.election_ticks, None);
        assert_eq!(seat.tenure_ticks, rules::SEAT_TENURE_TICKS);
    }

    #[test]
    fn ties_break_on_name() {
        let mut ledger = Ledger::new();
        let a = join(&mut ledger, 1, 3);
        let b = join(&mut ledger, 2, 3);
        ledger.participant_mut(a).unwrap().name = "Zealous Miller".into();
        ledger.participant_mut(b).unwrap().name = "Amber Baker".into();
        assert_eq!(election_winner(&ledger), Some(b));
    }

    #[test]
    fn dormant_participants_do_not_stand() {
        let mut ledger = Ledger::new();
        let pid = join(&mut ledger, 1, 50);
        ledger.participant_mut(pid).unwrap().standing = Standing::Dormant;
        assert_eq!(election_winner(&ledger), None);
    }

    #[test]
    fn tenure_expiry_opens_window() {
        let mut ledger = Ledger::new();
        ledger.seats.get_mut(&SeatKind::Magistrate).unwrap().tenure_ticks = 1;
        step(&mut ledger, Utc::now(), &mut TickSummary::default());
        let seat = ledger.seats.get(&SeatKind::Magistrate).unwrap();
        assert_eq!(seat.election_ticks, Some(rules::ELECTION_WINDOW_TICKS));
    }
}
