//! Unrest aggregation from scarcity, contract outcomes, and famine.

use tracing::{debug, warn};

use breadline_ledger::{Ledger, rules};
use breadline_types::GrainTier;

use super::TickSummary;

pub(super) fn aggregate(ledger: &mut Ledger, summary: &TickSummary) {
    let mut delta = i64::from(scarcity_pressure(ledger));
    delta = delta.saturating_add(
        i64::from(summary.contracts_failed)
            .saturating_mul(i64::from(rules::UNREST_PER_FAILED_CONTRACT)),
    );
    delta = delta.saturating_add(
        i64::from(summary.contracts_fulfilled)
            .saturating_mul(i64::from(rules::UNREST_PER_FULFILLED_CONTRACT)),
    );

    let world = &mut ledger.world;
    if world.grain_tier() == GrainTier::Critical {
        world.critical_streak = world.critical_streak.saturating_add(1);
    } else {
        world.critical_streak = 0;
        world.critical_penalty_applied = false;
    }
    if world.critical_streak >= rules::CRITICAL_STREAK_LIMIT && !world.critical_penalty_applied {
        world.critical_penalty_applied = true;
        delta = delta.saturating_add(i64::from(rules::CRITICAL_STREAK_UNREST));
        warn!(streak = world.critical_streak, "Prolonged famine");
    }

    let clamped = delta.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    world.adjust_unrest(i32::try_from(clamped).unwrap_or(0));
    debug!(delta, unrest = world.unrest(), "Unrest aggregated");
}

/// Unrest added by the scarcity multiplier, boosted while the market is restricted.
fn scarcity_pressure(ledger: &Ledger) -> u32 {
    let mut pct = rules::scarcity_pct(ledger.world.grain_tier());
    if ledger.world.is_market_restricted() {
        pct = pct.saturating_add(rules::SCARCITY_RESTRICTION_BONUS_PCT);
    }
    if pct < rules::SCARCITY_UNREST_THRESHOLD_PCT {
        return 0;
    }
    pct.saturating_sub(100) / rules::SCARCITY_UNREST_STEP_PCT
}
