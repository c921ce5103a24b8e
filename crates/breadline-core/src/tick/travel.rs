//! Journeys between districts.

use chrono::{DateTime, Utc};

use breadline_ledger::Ledger;
use breadline_types::{EventKind, ParticipantId};

use super::TickSummary;

pub(super) fn step(ledger: &mut Ledger, now: DateTime<Utc>, summary: &mut TickSummary) {
    let mut arrived: Vec<(ParticipantId, &'static str)> = Vec::new();
    for p in ledger.participants.values_mut() {
        let Some(mut journey) = p.journey else {
            continue;
        };
        journey.remaining_ticks = journey.remaining_ticks.saturating_sub(1);
        if journey.remaining_ticks == 0 {
            p.location = journey.destination;
            p.journey = None;
            arrived.push((p.id, journey.destination.label()));
        } else {
            p.journey = Some(journey);
        }
    }
    for (pid, place) in arrived {
        ledger.notify(now, pid, EventKind::Travel, format!("You arrive at {place}."));
        summary.arrivals = summary.arrivals.saturating_add(1);
    }
}
