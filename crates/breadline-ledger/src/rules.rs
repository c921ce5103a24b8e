//! Game-balance constants.
//!
//! These are fixed rules of the world, not deployment configuration.
//! Percentages are whole numbers out of 100.

use breadline_types::{CrisisKind, GrainTier, ProjectKind};

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Grain in the public stores at genesis.
pub const INITIAL_GRAIN_SUPPLY: u32 = 300;
/// Unrest at genesis.
pub const INITIAL_UNREST: u32 = 10;
/// Grain lost every tick before jitter.
pub const GRAIN_DECAY_BASE: u32 = 4;
/// Base decay while a canal's relief buff is active.
pub const GRAIN_DECAY_RELIEVED: u32 = 2;
/// Largest random addition to the per-tick decay.
pub const GRAIN_DECAY_JITTER_MAX: u32 = 3;
/// Chance of a spoilage shock per tick.
pub const SPOILAGE_CHANCE_PCT: u32 = 4;
/// Smallest spoilage loss.
pub const SPOILAGE_MIN: u32 = 10;
/// Largest spoilage loss.
pub const SPOILAGE_MAX: u32 = 25;
/// Chance of a relief shipment per tick while not Stable.
pub const RELIEF_SHOCK_CHANCE_PCT: u32 = 5;
/// Smallest relief shipment.
pub const RELIEF_SHOCK_MIN: u32 = 15;
/// Largest relief shipment.
pub const RELIEF_SHOCK_MAX: u32 = 30;
/// Consecutive Critical ticks that trigger the famine penalty.
pub const CRITICAL_STREAK_LIMIT: u32 = 4;
/// Unrest added by the famine penalty.
pub const CRITICAL_STREAK_UNREST: i32 = 10;
/// Unrest per failed contract in a tick.
pub const UNREST_PER_FAILED_CONTRACT: i32 = 2;
/// Unrest relieved per fulfilled contract in a tick.
pub const UNREST_PER_FULFILLED_CONTRACT: i32 = -1;
/// Scarcity multiplier percent above which unrest rises.
pub const SCARCITY_UNREST_THRESHOLD_PCT: u32 = 130;
/// Each full step of this many percent above 100 adds one unrest per tick.
pub const SCARCITY_UNREST_STEP_PCT: u32 = 30;
/// Added to the scarcity multiplier while the market is restricted.
pub const SCARCITY_RESTRICTION_BONUS_PCT: u32 = 15;
/// Minimum restriction applied when unrest reaches Rioting.
pub const RIOT_RESTRICTION_TICKS: u32 = 4;
/// Chance of a flavor event on an otherwise silent tick.
pub const FLAVOR_EVENT_CHANCE_PCT: u32 = 5;

/// Scarcity multiplier percent for a grain tier.
pub const fn scarcity_pct(tier: GrainTier) -> u32 {
    match tier {
        GrainTier::Stable => 100,
        GrainTier::Tight => 110,
        GrainTier::Scarce => 130,
        GrainTier::Critical => 160,
    }
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// Gold given to a new participant.
pub const STARTING_GOLD: u32 = 20;
/// Grain given to a new participant.
pub const STARTING_GRAIN: u32 = 3;
/// Rumor tokens given to a new participant.
pub const STARTING_RUMOR_TOKENS: u32 = 1;
/// High-impact actions allowed per UTC day.
pub const DAILY_HIGH_IMPACT_BUDGET: u32 = 3;
/// Contracts a participant may complete per UTC day.
pub const DAILY_COMPLETION_CAP: u32 = 8;

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Deadline of an Emergency contract.
pub const EMERGENCY_DEADLINE: u32 = 6;
/// Grain added to the stores when an Emergency contract is fulfilled.
pub const EMERGENCY_GRAIN_REWARD: u32 = 12;
/// Base gold for an Emergency contract.
pub const EMERGENCY_GOLD: u32 = 14;
/// Deadline of a Smuggling contract.
pub const SMUGGLING_DEADLINE: u32 = 8;
/// Grain added to the stores when a Smuggling contract is fulfilled.
pub const SMUGGLING_GRAIN_REWARD: u32 = 8;
/// Base gold for a Smuggling contract.
pub const SMUGGLING_GOLD: u32 = 22;
/// Reputation lost when an owned contract fails.
pub const CONTRACT_FAILURE_REPUTATION: i32 = -3;
/// Reputation lost when abandoning a contract.
pub const ABANDON_REPUTATION: i32 = -2;
/// Seconds of owner inactivity after which an accepted contract is reclaimed.
pub const CONTRACT_INACTIVITY_SECS: i64 = 15 * 60;
/// Remaining deadline needed for a stale contract to return to Issued.
pub const RECLAIM_MIN_DEADLINE: u32 = 2;
/// Added to the fulfilment chance when a contract is accepted.
pub const ACCEPTED_FULFIL_BONUS_PCT: u32 = 20;
/// Gold fee for a manual delivery attempt.
pub const DELIVERY_FEE: u32 = 2;
/// Seconds between manual delivery attempts.
pub const DELIVERY_COOLDOWN_SECS: i64 = 20;
/// Reputation lost on a failed delivery.
pub const DELIVERY_FAILURE_REPUTATION: i32 = -1;
/// Reputation multiplier floor, percent.
pub const REPUTATION_MULTIPLIER_MIN_PCT: i64 = 75;
/// Reputation multiplier ceiling, percent.
pub const REPUTATION_MULTIPLIER_MAX_PCT: i64 = 150;
/// Pay bonus while a landed praise rumor targets the worker, percent.
pub const RUMOR_BONUS_PCT: u32 = 110;

/// Per-tick fulfilment chance for an ordinary contract.
pub const fn fulfil_chance_pct(tier: GrainTier) -> u32 {
    match tier {
        GrainTier::Stable => 30,
        GrainTier::Tight => 24,
        GrainTier::Scarce => 18,
        GrainTier::Critical => 12,
    }
}

/// Success chance of a manual delivery.
pub const fn delivery_chance_pct(tier: GrainTier) -> u32 {
    match tier {
        GrainTier::Stable => 75,
        GrainTier::Tight => 65,
        GrainTier::Scarce => 55,
        GrainTier::Critical => 45,
    }
}

/// Heat at which a bounty is issued.
pub const BOUNTY_HEAT_THRESHOLD: u32 = 10;
/// Deadline of a bounty.
pub const BOUNTY_DEADLINE: u32 = 12;
/// Smallest bounty reward.
pub const BOUNTY_REWARD_MIN: u32 = 20;
/// Largest bounty reward.
pub const BOUNTY_REWARD_MAX: u32 = 70;
/// Heat shed by a captured target.
pub const BOUNTY_TARGET_HEAT: i32 = -6;
/// Reputation lost by a captured target.
pub const BOUNTY_TARGET_REPUTATION: i32 = -3;
/// Reputation lost by a hunter whose bounty expires.
pub const BOUNTY_EXPIRY_HUNTER_REPUTATION: i32 = -1;
/// Heat shed by a target whose bounty expires.
pub const BOUNTY_EXPIRY_TARGET_HEAT: i32 = -2;

/// Reward for a bounty on a target with `heat`.
pub fn bounty_reward(heat: u32) -> u32 {
    heat.saturating_mul(2)
        .saturating_add(18)
        .clamp(BOUNTY_REWARD_MIN, BOUNTY_REWARD_MAX)
}

/// Evidence strength required to collect a bounty on a target with `heat`.
pub const fn bounty_evidence_required(heat: u32) -> u32 {
    2_u32.saturating_add(heat / 5)
}

/// Deadline of a supply contract.
pub const SUPPLY_DEADLINE: u32 = 10;
/// Share of escrow refunded to the issuer on expiry, percent.
pub const SUPPLY_REFUND_PCT: u32 = 80;
/// Reputation lost by a supplier who lets a contract expire.
pub const SUPPLY_EXPIRY_REPUTATION: i32 = -3;
/// Largest supply order.
pub const SUPPLY_MAX_SACKS: u32 = 50;
/// Largest supply reward.
pub const SUPPLY_MAX_REWARD: u32 = 500;

// ---------------------------------------------------------------------------
// Institutions
// ---------------------------------------------------------------------------

/// Length of a seat term.
pub const SEAT_TENURE_TICKS: u32 = 48;
/// Length of an election window.
pub const ELECTION_WINDOW_TICKS: u32 = 6;
/// Tax rate at genesis.
pub const INITIAL_TAX_RATE_PCT: u32 = 5;
/// Highest tax rate.
pub const MAX_TAX_RATE_PCT: u32 = 30;
/// Shortest embargo.
pub const EMBARGO_MIN_TICKS: u32 = 1;
/// Longest embargo.
pub const EMBARGO_MAX_TICKS: u32 = 12;
/// Duration of an issued permit.
pub const PERMIT_TICKS: u32 = 24;
/// Heat added by a warrant.
pub const WARRANT_HEAT: i32 = 4;
/// Heat removed by a pardon.
pub const PARDON_HEAT: i32 = -6;
/// Cost of institutional access.
pub const ACCESS_COST: u32 = 10;
/// Duration of institutional access.
pub const ACCESS_TICKS: u32 = 8;

// ---------------------------------------------------------------------------
// Intel
// ---------------------------------------------------------------------------

/// Gold cost of a rumor when the participant has no token.
pub const RUMOR_GOLD_COST: u32 = 3;
/// Base credibility of a new rumor.
pub const RUMOR_BASE_CREDIBILITY: i32 = 30;
/// Largest random credibility bonus.
pub const RUMOR_CREDIBILITY_ROLL_MAX: i32 = 20;
/// Credibility floor at creation.
pub const RUMOR_CREDIBILITY_MIN: i32 = 10;
/// Credibility ceiling at creation.
pub const RUMOR_CREDIBILITY_MAX: i32 = 90;
/// Ticks a rumor circulates.
pub const RUMOR_LIFE_TICKS: u32 = 16;
/// Spread at which a rumor lands.
pub const RUMOR_LANDING_SPREAD: u32 = 30;
/// Ticks a landed rumor lingers at least, so praise can still pay.
pub const RUMOR_LANDED_TICKS: u32 = 6;
/// Reputation lost to a landed smear.
pub const SMEAR_REPUTATION: i32 = -4;
/// Heat gained from a landed smear.
pub const SMEAR_HEAT: i32 = 1;
/// Reputation gained from landed praise.
pub const PRAISE_REPUTATION: i32 = 3;
/// Longest rumor claim.
pub const RUMOR_CLAIM_MAX_CHARS: usize = 140;
/// Cost of countering a rumor.
pub const COUNTER_RUMOR_COST: u32 = 2;
/// Credibility removed by a counter.
pub const COUNTER_RUMOR_CREDIBILITY: u32 = 25;
/// Credibility at or below which a countered rumor dies.
pub const RUMOR_DEAD_CREDIBILITY: u32 = 10;
/// Cost of gathering evidence.
pub const EVIDENCE_COST: u32 = 4;
/// Largest random strength bonus.
pub const EVIDENCE_ROLL_MAX: u32 = 4;
/// Strength bonus against wanted targets.
pub const EVIDENCE_WANTED_BONUS: u32 = 2;
/// Strongest evidence.
pub const EVIDENCE_MAX_STRENGTH: u32 = 10;
/// Ticks evidence stays fresh.
pub const EVIDENCE_TTL_TICKS: u64 = 18;
/// Cost of a scrying report.
pub const SCRY_COST: u32 = 6;
/// Ticks a scrying report is kept.
pub const SCRY_TTL_TICKS: u64 = 12;
/// Cost of an intercept.
pub const INTERCEPT_COST: u32 = 8;
/// Ticks an intercept stays in place.
pub const INTERCEPT_TTL_TICKS: u64 = 10;
/// Messages an intercept can hold.
pub const INTERCEPT_CAPACITY: usize = 10;
/// Grain offered at the temple ritual.
pub const RITUAL_GRAIN_COST: u32 = 2;
/// Ticks of smear immunity granted by the ritual.
pub const RITUAL_IMMUNITY_TICKS: u32 = 6;
/// Reputation gained from the ritual.
pub const RITUAL_REPUTATION: i32 = 1;

// ---------------------------------------------------------------------------
// Finance
// ---------------------------------------------------------------------------

/// Largest loan or obligation.
pub const MAX_DEBT_AMOUNT: u32 = 500;
/// Highest loan interest.
pub const MAX_LOAN_INTEREST_PCT: u32 = 50;
/// Longest loan or obligation term.
pub const MAX_DEBT_TERM_TICKS: u32 = 48;
/// Ticks an unanswered loan offer stays open.
pub const LOAN_OFFER_TICKS: u64 = 12;
/// Unanswered loan offers one lender may have out at once.
pub const MAX_OPEN_LOAN_OFFERS: usize = 3;
/// Longest obligation note.
pub const OBLIGATION_NOTE_MAX_CHARS: usize = 120;
/// Reputation lost by a defaulting borrower.
pub const DEFAULT_BORROWER_REPUTATION: i32 = -6;
/// Heat gained by a defaulting borrower.
pub const DEFAULT_BORROWER_HEAT: i32 = 2;
/// Reputation lost by the lender of a defaulted loan.
pub const DEFAULT_LENDER_REPUTATION: i32 = -1;
/// Embargo floor imposed by a default.
pub const DEFAULT_EMBARGO_FLOOR: u32 = 3;
/// Reputation lost by a debtor whose obligation goes overdue.
pub const OVERDUE_DEBTOR_REPUTATION: i32 = -3;
/// Heat gained by a debtor whose obligation goes overdue.
pub const OVERDUE_DEBTOR_HEAT: i32 = 1;
/// Sympathy reputation for the creditor of an overdue obligation.
pub const OVERDUE_CREDITOR_REPUTATION: i32 = 1;
/// Reputation gained for settling an obligation.
pub const SETTLE_REPUTATION: i32 = 1;
/// Unrest per new default or overdue obligation.
pub const UNREST_PER_FINANCIAL_FAILURE: i32 = 2;

// ---------------------------------------------------------------------------
// Civic
// ---------------------------------------------------------------------------

/// Projects that may run at once.
pub const MAX_ACTIVE_PROJECTS: usize = 3;
/// Ticks of decay relief granted by a canal.
pub const CANAL_RELIEF_TICKS: u32 = 12;

/// Fixed world and owner effects applied when a project completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectBundle {
    /// Grain added to the stores.
    pub grain: i64,
    /// Unrest delta.
    pub unrest: i32,
    /// Owner reputation delta.
    pub reputation: i32,
    /// Owner heat delta.
    pub heat: i32,
    /// Ticks of decay relief.
    pub decay_relief_ticks: u32,
}

/// Gold cost of a project.
pub const fn project_cost(kind: ProjectKind) -> u32 {
    match kind {
        ProjectKind::GranaryRepair => 40,
        ProjectKind::PublicFeast => 30,
        ProjectKind::WatchPatrol => 35,
        ProjectKind::Shrine => 25,
        ProjectKind::Canal => 50,
    }
}

/// Construction time of a project.
pub const fn project_ticks(kind: ProjectKind) -> u32 {
    match kind {
        ProjectKind::GranaryRepair => 6,
        ProjectKind::PublicFeast => 3,
        ProjectKind::WatchPatrol => 4,
        ProjectKind::Shrine => 5,
        ProjectKind::Canal => 8,
    }
}

/// What a project does when it completes.
pub const fn project_bundle(kind: ProjectKind) -> ProjectBundle {
    let none = ProjectBundle {
        grain: 0,
        unrest: 0,
        reputation: 0,
        heat: 0,
        decay_relief_ticks: 0,
    };
    match kind {
        ProjectKind::GranaryRepair => ProjectBundle { grain: 60, ..none },
        ProjectKind::PublicFeast => ProjectBundle {
            unrest: -10,
            reputation: 3,
            ..none
        },
        ProjectKind::WatchPatrol => ProjectBundle {
            unrest: -4,
            heat: -5,
            ..none
        },
        ProjectKind::Shrine => ProjectBundle {
            reputation: 5,
            ..none
        },
        ProjectKind::Canal => ProjectBundle {
            grain: 20,
            decay_relief_ticks: CANAL_RELIEF_TICKS,
            ..none
        },
    }
}

/// Base chance of a crisis starting on a quiet tick.
pub const CRISIS_BASE_CHANCE_PCT: u32 = 3;
/// Added when unrest is Unstable or worse.
pub const CRISIS_UNREST_BONUS_PCT: u32 = 4;
/// Added when grain is Scarce or worse.
pub const CRISIS_SCARCITY_BONUS_PCT: u32 = 4;
/// Highest crisis severity.
pub const CRISIS_MAX_SEVERITY: u32 = 3;
/// Mitigation points needed per severity level.
pub const CRISIS_MITIGATION_PER_SEVERITY: u32 = 15;
/// Mitigation points per gold.
pub const CRISIS_POINTS_PER_GOLD: u32 = 1;
/// Mitigation points per grain sack.
pub const CRISIS_POINTS_PER_SACK: u32 = 3;
/// Unrest relieved by a mitigated crisis.
pub const CRISIS_SUCCESS_UNREST: i32 = -6;
/// Grain recovered after a mitigated crisis.
pub const CRISIS_SUCCESS_GRAIN: i64 = 10;
/// Reputation for each contributor to a mitigated crisis.
pub const CRISIS_CONTRIBUTOR_REPUTATION: i32 = 2;

/// Duration of a crisis of `severity`.
pub const fn crisis_duration(severity: u32) -> u32 {
    severity.saturating_mul(2).saturating_add(3)
}

/// Per-tick (unrest, grain) pressure of a crisis before severity scaling.
pub const fn crisis_pressure(kind: CrisisKind) -> (i32, i64) {
    match kind {
        CrisisKind::Fire => (1, -3),
        CrisisKind::Plague => (2, -1),
        CrisisKind::Flood => (1, -4),
        CrisisKind::BreadRiot => (3, 0),
    }
}

/// Failure bundle of a crisis: (grain, unrest, market restriction ticks).
pub const fn crisis_failure(kind: CrisisKind) -> (i64, i32, u32) {
    match kind {
        CrisisKind::Fire => (-40, 8, 0),
        CrisisKind::Plague => (-10, 12, 0),
        CrisisKind::Flood => (-50, 6, 0),
        CrisisKind::BreadRiot => (0, 15, 6),
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// Largest market order.
pub const MAX_MARKET_SACKS: u32 = 20;
/// Largest buy order while the market is restricted.
pub const RESTRICTED_MAX_SACKS: u32 = 3;
/// Buy price surcharge while restricted, percent.
pub const RESTRICTED_PRICE_PCT: u32 = 150;
/// Share of the base price paid when selling, percent.
pub const SELL_PRICE_PCT: u32 = 60;
/// Largest relief donation.
pub const MAX_RELIEF_SACKS: u32 = 50;
/// Smallest bribe.
pub const BRIBE_MIN: u32 = 5;
/// Largest bribe.
pub const BRIBE_MAX: u32 = 100;
/// Chance that a bribe is caught.
pub const BRIBE_CAUGHT_CHANCE_PCT: u32 = 20;
/// Heat gained when caught bribing.
pub const BRIBE_CAUGHT_HEAT: i32 = 2;
/// Reputation lost when caught bribing.
pub const BRIBE_CAUGHT_REPUTATION: i32 = -2;

/// Base price of one sack for a grain tier.
pub const fn base_sack_price(tier: GrainTier) -> u32 {
    match tier {
        GrainTier::Stable => 3,
        GrainTier::Tight => 5,
        GrainTier::Scarce => 8,
        GrainTier::Critical => 12,
    }
}

// ---------------------------------------------------------------------------
// Travel and logs
// ---------------------------------------------------------------------------

/// Shortest trip.
pub const TRAVEL_MIN_TICKS: u32 = 1;
/// Longest trip.
pub const TRAVEL_MAX_TICKS: u32 = 3;
/// Events retained.
pub const EVENT_LOG_CAPACITY: usize = 200;
/// Chat lines retained.
pub const CHAT_LOG_CAPACITY: usize = 100;
/// Diplomatic messages retained.
pub const MESSAGE_LOG_CAPACITY: usize = 200;
/// Longest chat line.
pub const CHAT_MAX_CHARS: usize = 240;
/// Longest diplomatic message.
pub const MESSAGE_MAX_CHARS: usize = 500;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounty_reward_is_clamped() {
        assert_eq!(bounty_reward(0), 20);
        assert_eq!(bounty_reward(10), 38);
        assert_eq!(bounty_reward(20), 58);
        assert_eq!(bounty_reward(40), 70);
    }

    #[test]
    fn crisis_duration_grows_with_severity() {
        assert_eq!(crisis_duration(1), 5);
        assert_eq!(crisis_duration(3), 9);
    }

    #[test]
    fn canal_grants_relief() {
        let bundle = project_bundle(ProjectKind::Canal);
        assert_eq!(bundle.grain, 20);
        assert_eq!(bundle.decay_relief_ticks, CANAL_RELIEF_TICKS);
    }
}
