//! The world advance: one discrete step of simulated time.
//!
//! [`advance_tick`] runs fourteen sub-steps in a fixed order:
//!
//! 1. **Institutions** -- embargo, tenure, and election countdowns.
//! 2. **Intel** -- rumor spread and landing, artifact expiry.
//! 3. **Finance** -- loan defaults and overdue obligations.
//! 4. **Civic** -- project construction and completion.
//! 5. **Presence** -- ritual, access, and permit countdowns.
//! 6. **Travel** -- journeys progress and arrive.
//! 7. **Phase** -- Morning and Evening alternate; Evening wraps to a new day.
//! 8. **Restriction** -- the market restriction counts down.
//! 9. **Grain** -- decay, spoilage, and relief shipments.
//! 10. **Contracts** -- reclaim, fulfilment rolls, deadlines.
//! 11. **Crisis** -- start, pressure, and resolution.
//! 12. **Unrest** -- scarcity pressure, contract outcomes, famine.
//! 13. **Faction** -- standing contracts, riot restriction, bounties.
//! 14. **Narrative** -- tier changes and flavor text.
//!
//! The engine is pure in-memory computation. Callers hold the world lock
//! for the whole call. Nothing is rolled back if a later sub-step misbehaves;
//! each sub-step leaves the ledger consistent on its own.

mod civic;
mod contracts;
mod crisis;
mod economy;
mod finance;
mod institutions;
mod intel;
mod narrative;
mod presence;
mod travel;
mod unrest;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info};

use breadline_ledger::Ledger;
use breadline_types::{CrisisKind, GrainTier, Phase, SeatKind, UnrestTier};

/// Errors that can occur during a tick.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TickError {
    /// The tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// How a crisis ended this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrisisOutcome {
    /// Participants met the mitigation target.
    Mitigated(CrisisKind),
    /// Time ran out.
    Failed(CrisisKind),
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Day number after the phase advance.
    pub day: u32,
    /// Phase after the phase advance.
    pub phase: Phase,
    /// Grain tier at the end of the tick.
    pub grain_tier: GrainTier,
    /// Unrest tier at the end of the tick.
    pub unrest_tier: UnrestTier,
    /// Seats whose election resolved.
    pub elections: Vec<SeatKind>,
    /// Rumors that landed on their target.
    pub rumors_landed: u32,
    /// Loans that defaulted.
    pub defaults: u32,
    /// Obligations that went overdue.
    pub overdue: u32,
    /// Loan offers dropped unanswered.
    pub offers_lapsed: u32,
    /// Projects that completed.
    pub projects_completed: u32,
    /// Travellers who arrived.
    pub arrivals: u32,
    /// Grain lost to decay and spoilage.
    pub grain_lost: u32,
    /// Grain gained from relief shipments.
    pub grain_relief: u32,
    /// Contracts fulfilled by the roll.
    pub contracts_fulfilled: u32,
    /// Contracts failed this tick.
    pub contracts_failed: u32,
    /// Accepted contracts returned to the board for inactivity.
    pub contracts_reclaimed: u32,
    /// Contracts issued by the faction.
    pub contracts_issued: u32,
    /// A crisis that began this tick.
    pub crisis_started: Option<CrisisKind>,
    /// A crisis that ended this tick.
    pub crisis_ended: Option<CrisisOutcome>,
}

/// Grain and unrest tiers captured before the tick runs.
#[derive(Debug, Clone, Copy)]
struct Tiers {
    grain: GrainTier,
    unrest: UnrestTier,
}

/// Advance the world by one tick.
///
/// # Errors
///
/// Returns [`TickError::TickOverflow`] if the tick counter is exhausted.
/// The ledger is unchanged in that case.
pub fn advance_tick<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<TickSummary, TickError> {
    let tick = ledger
        .world
        .tick_count
        .checked_add(1)
        .ok_or(TickError::TickOverflow)?;
    ledger.world.tick_count = tick;
    let before = Tiers {
        grain: ledger.world.grain_tier(),
        unrest: ledger.world.unrest_tier(),
    };
    let events_before = ledger.events.pushed();
    let mut summary = TickSummary {
        tick,
        ..TickSummary::default()
    };

    institutions::step(ledger, now, &mut summary);
    intel::step(ledger, now, &mut summary);
    finance::step(ledger, now, &mut summary);
    civic::step(ledger, now, &mut summary);
    presence::step(ledger);
    travel::step(ledger, now, &mut summary);
    economy::advance_phase(ledger);
    economy::count_down_restriction(ledger);
    economy::decay_grain(ledger, now, rng, &mut summary);
    contracts::resolve(ledger, now, rng, &mut summary);
    crisis::step(ledger, now, rng, &mut summary);
    unrest::aggregate(ledger, &summary);
    contracts::issue_standing(ledger, now, &mut summary);
    narrative::emit(ledger, now, before, events_before, rng);

    ledger.world.last_tick_at = Some(now);
    summary.day = ledger.world.day;
    summary.phase = ledger.world.phase;
    summary.grain_tier = ledger.world.grain_tier();
    summary.unrest_tier = ledger.world.unrest_tier();

    debug!(?summary, "Tick detail");
    info!(
        tick,
        day = summary.day,
        grain = ledger.world.grain_supply(),
        unrest = ledger.world.unrest(),
        grain_tier = ?summary.grain_tier,
        unrest_tier = ?summary.unrest_tier,
        "Tick complete"
    );
    Ok(summary)
}
