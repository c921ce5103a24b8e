//! Rumor spread and expiry of intel artifacts.

use chrono::{DateTime, Utc};
use tracing::debug;

use breadline_ledger::{Ledger, rules};
use breadline_types::{EventKind, ParticipantId, RumorId, RumorTone};

use super::TickSummary;

pub(super) fn step(ledger: &mut Ledger, now: DateTime<Utc>, summary: &mut TickSummary) {
    let ids: Vec<RumorId> = ledger.rumors.keys().copied().collect();
    for id in ids {
        let Some(rumor) = ledger.rumors.get_mut(&id) else {
            continue;
        };
        rumor.spread = rumor
            .spread
            .saturating_add(1)
            .saturating_add(rumor.credibility / 20);
        rumor.life_ticks = rumor.life_ticks.saturating_sub(1);
        let lands = !rumor.landed && rumor.spread >= rules::RUMOR_LANDING_SPREAD;
        if lands {
            rumor.landed = true;
            rumor.life_ticks = rumor.life_ticks.max(rules::RUMOR_LANDED_TICKS);
        }
        let (target, tone, expired) = (rumor.target, rumor.tone, rumor.life_ticks == 0);
        if lands {
            land(ledger, now, target, tone);
            summary.rumors_landed = summary.rumors_landed.saturating_add(1);
        }
        if expired {
            ledger.rumors.remove(&id);
        }
    }

    let tick = ledger.world.tick_count;
    ledger.evidence.retain(|_, e| tick < e.expires_tick);
    ledger.scry_reports.retain(|_, r| tick < r.expires_tick);
    ledger.intercepts.retain(|_, i| tick < i.expires_tick);
}

fn land(ledger: &mut Ledger, now: DateTime<Utc>, target: ParticipantId, tone: RumorTone) {
    let name = ledger.name_of(target);
    let Some(victim) = ledger.participant_mut(target) else {
        return;
    };
    let text = match tone {
        RumorTone::Smear if victim.is_immune() => {
            format!("Talk about {name} fades before it can stick.")
        }
        RumorTone::Smear => {
            victim.adjust_reputation(rules::SMEAR_REPUTATION);
            victim.adjust_heat(rules::SMEAR_HEAT);
            format!("The whole market is whispering about {name}.")
        }
        RumorTone::Praise => {
            victim.adjust_reputation(rules::PRAISE_REPUTATION);
            format!("People speak warmly of {name}.")
        }
    };
    debug!(target = %target, ?tone, "Rumor landed");
    ledger.announce(now, EventKind::Intel, text);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::{Evidence, Rumor};

    use super::*;

    fn rumor(
        ledger: &mut Ledger,
        source: ParticipantId,
        target: ParticipantId,
        tone: RumorTone,
        credibility: u32,
    ) {
        let id = ledger.counters.rumor();
        ledger.rumors.insert(
            id,
            Rumor {
                id,
                source,
                target,
                tone,
                claim: "they hoard flour".into(),
                credibility,
                spread: 0,
                life_ticks: rules::RUMOR_LIFE_TICKS,
                landed: false,
            },
        );
    }

    fn pair() -> (Ledger, ParticipantId, ParticipantId) {
        let mut ledger = Ledger::new();
        let (a, b) = (ParticipantId::new(), ParticipantId::new());
        ledger.register_participant(a, Utc::now(), &mut SmallRng::seed_from_u64(1));
        ledger.register_participant(b, Utc::now(), &mut SmallRng::seed_from_u64(2));
        (ledger, a, b)
    }

    #[test]
    fn smear_lands_once() {
        let (mut ledger, a, b) = pair();
        rumor(&mut ledger, a, b, RumorTone::Smear, 90);
        let mut summary = TickSummary::default();
        // 90 credibility spreads 5 per tick: lands on the sixth tick.
        for _ in 0..rules::RUMOR_LIFE_TICKS {
            step(&mut ledger, Utc::now(), &mut summary);
        }
        assert_eq!(summary.rumors_landed, 1);
        let target = ledger.participant(b).unwrap();
        assert_eq!(target.reputation(), rules::SMEAR_REPUTATION);
        assert_eq!(target.heat(), 1);
        assert!(ledger.rumors.is_empty());
    }

    #[test]
    fn weakest_fresh_rumor_lands_before_it_expires() {
        let (mut ledger, a, b) = pair();
        // A neutral spreader's lowest roll.
        let weakest = u32::try_from(rules::RUMOR_BASE_CREDIBILITY).unwrap();
        rumor(&mut ledger, a, b, RumorTone::Smear, weakest);
        let mut summary = TickSummary::default();
        let mut ticks = 0_u32;
        while summary.rumors_landed == 0 && !ledger.rumors.is_empty() {
            step(&mut ledger, Utc::now(), &mut summary);
            ticks = ticks.saturating_add(1);
        }
        assert_eq!(summary.rumors_landed, 1);
        assert!(ticks < rules::RUMOR_LIFE_TICKS);
    }

    #[test]
    fn landed_praise_lingers() {
        let (mut ledger, a, b) = pair();
        rumor(&mut ledger, a, b, RumorTone::Praise, 90);
        ledger.rumors.values_mut().for_each(|r| {
            r.life_ticks = 1;
            r.spread = rules::RUMOR_LANDING_SPREAD.saturating_sub(1);
        });
        step(&mut ledger, Utc::now(), &mut TickSummary::default());
        assert!(ledger.has_landed_praise(b));
        for _ in 1..rules::RUMOR_LANDED_TICKS {
            step(&mut ledger, Utc::now(), &mut TickSummary::default());
        }
        assert!(ledger.has_landed_praise(b));
        step(&mut ledger, Utc::now(), &mut TickSummary::default());
        assert!(!ledger.has_landed_praise(b));
        assert_eq!(
            ledger.participant(b).unwrap().reputation(),
            rules::PRAISE_REPUTATION
        );
    }

    #[test]
    fn ritual_blocks_smear() {
        let (mut ledger, a, b) = pair();
        ledger.participant_mut(b).unwrap().ritual_immunity_ticks = 50;
        rumor(&mut ledger, a, b, RumorTone::Smear, 90);
        ledger
            .rumors
            .values_mut()
            .for_each(|r| r.spread = rules::RUMOR_LANDING_SPREAD.saturating_sub(1));
        step(&mut ledger, Utc::now(), &mut TickSummary::default());
        assert_eq!(ledger.participant(b).unwrap().reputation(), 0);
    }

    #[test]
    fn expired_evidence_is_dropped() {
        let (mut ledger, a, b) = pair();
        let id = ledger.counters.evidence();
        ledger.evidence.insert(
            id,
            Evidence {
                id,
                owner: a,
                target: b,
                strength: 3,
                expires_tick: 4,
            },
        );
        ledger.world.tick_count = 3;
        step(&mut ledger, Utc::now(), &mut TickSummary::default());
        assert_eq!(ledger.evidence.len(), 1);
        ledger.world.tick_count = 4;
        step(&mut ledger, Utc::now(), &mut TickSummary::default());
        assert!(ledger.evidence.is_empty());
    }
}
