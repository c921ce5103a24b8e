//! Phase clock, market restriction, and grain decay.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

use breadline_ledger::{Ledger, rules};
use breadline_types::{EventKind, GrainTier, Phase};

use super::TickSummary;

pub(super) fn advance_phase(ledger: &mut Ledger) {
    let next = ledger.world.phase.next();
    if next == Phase::Morning {
        ledger.world.day = ledger.world.day.saturating_add(1);
    }
    ledger.world.phase = next;
}

pub(super) const fn count_down_restriction(ledger: &mut Ledger) {
    ledger.world.market_restriction_ticks = ledger.world.market_restriction_ticks.saturating_sub(1);
}

pub(super) fn decay_grain<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    now: DateTime<Utc>,
    rng: &mut R,
    summary: &mut TickSummary,
) {
    let base = if ledger.world.decay_relief_ticks > 0 {
        rules::GRAIN_DECAY_RELIEVED
    } else {
        rules::GRAIN_DECAY_BASE
    };
    let jitter = rng.random_range(0..=rules::GRAIN_DECAY_JITTER_MAX);
    let mut lost = ledger.world.remove_grain(base.saturating_add(jitter));

    if rng.random_range(0..100_u32) < rules::SPOILAGE_CHANCE_PCT {
        let spoiled = ledger
            .world
            .remove_grain(rng.random_range(rules::SPOILAGE_MIN..=rules::SPOILAGE_MAX));
        lost = lost.saturating_add(spoiled);
        if spoiled > 0 {
            ledger.announce(
                now,
                EventKind::World,
                format!("Rot found in the granary. {spoiled} sacks are thrown out."),
            );
        }
    }

    if ledger.world.grain_tier() != GrainTier::Stable
        && rng.random_range(0..100_u32) < rules::RELIEF_SHOCK_CHANCE_PCT
    {
        let relief = rng.random_range(rules::RELIEF_SHOCK_MIN..=rules::RELIEF_SHOCK_MAX);
        ledger.world.add_grain(relief);
        summary.grain_relief = summary.grain_relief.saturating_add(relief);
        ledger.announce(
            now,
            EventKind::World,
            format!("A relief barge docks with {relief} sacks of grain."),
        );
    }

    ledger.world.decay_relief_ticks = ledger.world.decay_relief_ticks.saturating_sub(1);
    summary.grain_lost = summary.grain_lost.saturating_add(lost);
    debug!(lost, supply = ledger.world.grain_supply(), "Grain decayed");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn decay_never_underflows() {
        let mut ledger = Ledger::new();
        ledger.world.set_grain_supply(1);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut summary = TickSummary::default();
        for _ in 0..50 {
            decay_grain(&mut ledger, Utc::now(), &mut rng, &mut summary);
        }
        // Relief shipments may refill the stores; decay alone floors at zero.
        assert!(summary.grain_lost >= 1);
        assert_eq!(
            ledger.world.grain_supply(),
            1_u32
                .saturating_add(summary.grain_relief)
                .saturating_sub(summary.grain_lost)
        );
    }

    #[test]
    fn relieved_decay_is_slower() {
        let mut relieved = Ledger::new();
        relieved.world.set_grain_supply(10_000);
        relieved.world.decay_relief_ticks = 100;
        let mut plain = Ledger::new();
        plain.world.set_grain_supply(10_000);
        let mut rng_a = SmallRng::seed_from_u64(4);
        let mut rng_b = SmallRng::seed_from_u64(4);
        let mut a = TickSummary::default();
        let mut b = TickSummary::default();
        for _ in 0..20 {
            decay_grain(&mut relieved, Utc::now(), &mut rng_a, &mut a);
            decay_grain(&mut plain, Utc::now(), &mut rng_b, &mut b);
        }
        assert_eq!(a.grain_lost.saturating_add(40), b.grain_lost);
    }

    #[test]
    fn evening_wraps_to_next_day() {
        let mut ledger = Ledger::new();
        advance_phase(&mut ledger);
        assert_eq!((ledger.world.day, ledger.world.phase), (1, Phase::Evening));
        advance_phase(&mut ledger);
        assert_eq!((ledger.world.day, ledger.world.phase), (2, Phase::Morning));
    }
}
