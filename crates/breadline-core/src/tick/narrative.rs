//! Tier-change announcements and flavor text.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;

use breadline_ledger::{Ledger, rules};
use breadline_types::EventKind;

use super::Tiers;

const FLAVOR: [&str; 8] = [
    "A baker chalks new prices on the shutters.",
    "Gulls fight over a spilled sack on the quay.",
    "The temple bell rings an hour late.",
    "Children trade rumors for crusts by the well.",
    "A cart loses a wheel outside the Palace gate.",
    "Someone has painted a loaf on the granary door.",
    "The watch changes shift without a word.",
    "Fog rolls in off the river and stays.",
];

pub(super) fn emit<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    now: DateTime<Utc>,
    before: Tiers,
    events_before: u64,
    rng: &mut R,
) {
    ledger.world.normalize();
    let grain = ledger.world.grain_tier();
    let unrest = ledger.world.unrest_tier();

    if grain != before.grain {
        let verb = if grain > before.grain { "fall to" } else { "recover to" };
        ledger.announce(
            now,
            EventKind::Tier,
            format!("Grain stores {verb} {}. {}", grain.label(), ledger.world.situation()),
        );
    }
    if unrest != before.unrest {
        let verb = if unrest > before.unrest { "rises to" } else { "eases to" };
        ledger.announce(
            now,
            EventKind::Tier,
            format!("The mood in the streets {verb} {}.", unrest.label()),
        );
    }

    if ledger.events.pushed() == events_before
        && rng.random_range(0..100_u32) < rules::FLAVOR_EVENT_CHANCE_PCT
        && let Some(line) = FLAVOR.choose(rng)
    {
        ledger.announce(now, EventKind::Flavor, *line);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::{GrainTier, UnrestTier};

    use super::*;

    #[test]
    fn tier_drop_is_announced() {
        let mut ledger = Ledger::new();
        let before = Tiers {
            grain: ledger.world.grain_tier(),
            unrest: ledger.world.unrest_tier(),
        };
        let pushed = ledger.events.pushed();
        ledger.world.set_grain_supply(10);
        emit(&mut ledger, Utc::now(), before, pushed, &mut SmallRng::seed_from_u64(1));
        let last = ledger.events.latest().unwrap();
        assert_eq!(last.kind, EventKind::Tier);
        assert!(last.text.contains("Critical"));
        assert_eq!(before.grain, GrainTier::Stable);
        assert_eq!(before.unrest, UnrestTier::Calm);
    }

    #[test]
    fn quiet_ticks_sometimes_get_flavor() {
        let mut ledger = Ledger::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let before = Tiers {
            grain: ledger.world.grain_tier(),
            unrest: ledger.world.unrest_tier(),
        };
        for _ in 0..400 {
            let pushed = ledger.events.pushed();
            emit(&mut ledger, Utc::now(), before, pushed, &mut rng);
        }
        let flavor = ledger
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Flavor)
            .count();
        assert!(flavor > 0);
        assert!(flavor < 100);
    }
}
