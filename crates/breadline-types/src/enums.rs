//! Enumeration types for the Breadline simulation.
//!
//! Tiers are named buckets derived from a numeric level. They are never
//! stored independently of their source value: the only way to obtain a
//! tier is through [`GrainTier::from_supply`] or [`UnrestTier::from_unrest`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// World clock
// ---------------------------------------------------------------------------

/// Sub-phase of a simulated day. Each tick toggles the phase.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// First half of the day.
    #[default]
    Morning,
    /// Second half of the day. Wrapping to Morning starts a new day.
    Evening,
}

impl Phase {
    /// The phase that follows this one.
    pub const fn next(self) -> Self {
        match self {
            Self::Morning => Self::Evening,
            Self::Evening => Self::Morning,
        }
    }
}

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Lowest grain supply still considered Stable.
pub const GRAIN_STABLE_MIN: u32 = 200;
/// Lowest grain supply still considered Tight.
pub const GRAIN_TIGHT_MIN: u32 = 120;
/// Lowest grain supply still considered Scarce. Anything below is Critical.
pub const GRAIN_SCARCE_MIN: u32 = 50;

/// Lowest unrest value considered Uneasy.
pub const UNREST_UNEASY_MIN: u32 = 25;
/// Lowest unrest value considered Unstable.
pub const UNREST_UNSTABLE_MIN: u32 = 50;
/// Lowest unrest value considered Rioting.
pub const UNREST_RIOTING_MIN: u32 = 75;

/// Grain supply bucket. Ordered from best to worst.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum GrainTier {
    /// Granaries are comfortably full.
    #[default]
    Stable,
    /// Supply is thinning.
    Tight,
    /// Shortages are visible.
    Scarce,
    /// Famine conditions.
    Critical,
}

impl GrainTier {
    /// Derive the tier from the raw grain supply.
    pub const fn from_supply(supply: u32) -> Self {
        if supply >= GRAIN_STABLE_MIN {
            Self::Stable
        } else if supply >= GRAIN_TIGHT_MIN {
            Self::Tight
        } else if supply >= GRAIN_SCARCE_MIN {
            Self::Scarce
        } else {
            Self::Critical
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Tight => "Tight",
            Self::Scarce => "Scarce",
            Self::Critical => "Critical",
        }
    }

    /// Whether the tier is Scarce or worse.
    pub const fn is_scarce_or_worse(self) -> bool {
        matches!(self, Self::Scarce | Self::Critical)
    }
}

/// Social-control bucket derived from the unrest value. Ordered from calmest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum UnrestTier {
    /// Streets are quiet.
    #[default]
    Calm,
    /// Grumbling in the queues.
    Uneasy,
    /// Open defiance of the watch.
    Unstable,
    /// Riots.
    Rioting,
}

impl UnrestTier {
    /// Derive the tier from the raw unrest value (0--100).
    pub const fn from_unrest(unrest: u32) -> Self {
        if unrest >= UNREST_RIOTING_MIN {
            Self::Rioting
        } else if unrest >= UNREST_UNSTABLE_MIN {
            Self::Unstable
        } else if unrest >= UNREST_UNEASY_MIN {
            Self::Uneasy
        } else {
            Self::Calm
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Calm => "Calm",
            Self::Uneasy => "Uneasy",
            Self::Unstable => "Unstable",
            Self::Rioting => "Rioting",
        }
    }

    /// Whether the tier is Unstable or worse.
    pub const fn is_unstable_or_worse(self) -> bool {
        matches!(self, Self::Unstable | Self::Rioting)
    }
}

// ---------------------------------------------------------------------------
// Places
// ---------------------------------------------------------------------------

/// A district of the city. Travel time grows with distance along this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum District {
    /// The city granary.
    Granary,
    /// The market square.
    Market,
    /// The river docks.
    Docks,
    /// The temple quarter.
    Temple,
    /// The palace and its offices.
    Palace,
}

impl District {
    /// Every district, in map order.
    pub const ALL: [Self; 5] = [
        Self::Granary,
        Self::Market,
        Self::Docks,
        Self::Temple,
        Self::Palace,
    ];

    /// Position of the district along the city's main road.
    pub const fn position(self) -> u32 {
        match self {
            Self::Granary => 0,
            Self::Market => 1,
            Self::Docks => 2,
            Self::Temple => 3,
            Self::Palace => 4,
        }
    }

    /// Human-readable name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Granary => "the Granary",
            Self::Market => "the Market",
            Self::Docks => "the Docks",
            Self::Temple => "the Temple",
            Self::Palace => "the Palace",
        }
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// The family a contract belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ContractKind {
    /// Factional relief work issued when the city is in trouble.
    Emergency,
    /// Factional smuggling run issued under scarcity.
    Smuggling,
    /// Player-to-player grain delivery backed by escrow.
    Supply,
    /// Law-enforcement bounty against a wanted participant.
    Bounty,
}

impl ContractKind {
    /// Whether the contract is ordinary factional work resolved by dice.
    pub const fn is_ordinary(self) -> bool {
        matches!(self, Self::Emergency | Self::Smuggling)
    }
}

/// Contract lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ContractStatus {
    /// Open for acceptance.
    Issued,
    /// Held by exactly one participant.
    Accepted,
    /// Declined by its named counterparty.
    Ignored,
    /// The work is done; awaiting delivery by the owner.
    Fulfilled,
    /// Withdrawn by its issuer. Terminal.
    Cancelled,
    /// Expired or abandoned. Terminal.
    Failed,
    /// Delivered and paid. Terminal.
    Completed,
}

impl ContractStatus {
    /// Whether no further transitions are possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Failed | Self::Completed)
    }

    /// Whether the contract still occupies a slot (Issued or Accepted).
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Issued | Self::Accepted)
    }
}

/// How a participant approaches a contract, chosen at acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Stance {
    /// Lower pay, reputation gain.
    Careful,
    /// Higher pay, draws heat.
    Fast,
    /// Slightly lower pay, sheds heat and earns a rumor token.
    Quiet,
}

// ---------------------------------------------------------------------------
// Institutions
// ---------------------------------------------------------------------------

/// An institutional office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SeatKind {
    /// Issues warrants and pardons.
    Magistrate,
    /// Sets the tax rate.
    Treasurer,
    /// Controls permits and embargoes.
    Harbormaster,
}

impl SeatKind {
    /// Every seat, in display order.
    pub const ALL: [Self; 3] = [Self::Magistrate, Self::Treasurer, Self::Harbormaster];

    /// Human-readable title.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Magistrate => "Magistrate",
            Self::Treasurer => "Treasurer",
            Self::Harbormaster => "Harbormaster",
        }
    }

    /// The NPC who holds the seat while no participant does.
    pub const fn npc_holder(self) -> &'static str {
        match self {
            Self::Magistrate => "Magistrate Voss",
            Self::Treasurer => "Treasurer Quill",
            Self::Harbormaster => "Harbormaster Brine",
        }
    }
}

// ---------------------------------------------------------------------------
// Debt instruments
// ---------------------------------------------------------------------------

/// Loan lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LoanStatus {
    /// Proposed by the lender, awaiting the borrower.
    Offered,
    /// Funds disbursed; repayment outstanding.
    Active,
    /// Paid in full. Terminal.
    Repaid,
    /// Due tick passed with principal outstanding. Terminal.
    Defaulted,
}

/// Obligation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ObligationStatus {
    /// Outstanding and not yet due.
    Open,
    /// Paid by the debtor. Terminal.
    Settled,
    /// Released by the creditor. Terminal.
    Forgiven,
    /// Past due; may still be settled or forgiven.
    Overdue,
}

impl ObligationStatus {
    /// Whether the obligation is still outstanding.
    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Open | Self::Overdue)
    }
}

// ---------------------------------------------------------------------------
// Intel
// ---------------------------------------------------------------------------

/// Whether a rumor hurts or helps its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RumorTone {
    /// Damages reputation and draws heat.
    Smear,
    /// Improves reputation and contract pay.
    Praise,
}

// ---------------------------------------------------------------------------
// Civic projects and crises
// ---------------------------------------------------------------------------

/// A participant-funded civic project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ProjectKind {
    /// Patch the granary roof. Adds grain on completion.
    GranaryRepair,
    /// Feed the crowds. Lowers unrest.
    PublicFeast,
    /// Hire extra watchmen. Lowers unrest and the owner's heat.
    WatchPatrol,
    /// Raise a shrine. Improves the owner's reputation.
    Shrine,
    /// Dig a canal. Adds grain and slows spoilage for a while.
    Canal,
}

impl ProjectKind {
    /// Human-readable name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::GranaryRepair => "granary repair",
            Self::PublicFeast => "public feast",
            Self::WatchPatrol => "watch patrol",
            Self::Shrine => "shrine",
            Self::Canal => "canal",
        }
    }
}

/// A randomly triggered city-wide crisis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CrisisKind {
    /// A warehouse fire.
    Fire,
    /// Sickness in the lower wards.
    Plague,
    /// The river breaks its banks.
    Flood,
    /// Mobs storm the bread lines.
    BreadRiot,
}

impl CrisisKind {
    /// Every crisis kind.
    pub const ALL: [Self; 4] = [Self::Fire, Self::Plague, Self::Flood, Self::BreadRiot];

    /// Human-readable name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Plague => "plague",
            Self::Flood => "flood",
            Self::BreadRiot => "bread riot",
        }
    }
}

// ---------------------------------------------------------------------------
// Participants and logs
// ---------------------------------------------------------------------------

/// Housekeeping state of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Standing {
    /// Playing normally.
    Active,
    /// Soft-retired after a long absence.
    Dormant,
    /// Hard-retired; data scrubbed, name kept as a tombstone.
    Retired,
}

/// Category of a narrative event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// Something that changed the world.
    World,
    /// A change in grain or unrest tier.
    Tier,
    /// Contract issuance, completion, or failure.
    Contract,
    /// Elections and policy changes.
    Institution,
    /// Rumors, evidence, and surveillance.
    Intel,
    /// Loans and obligations.
    Finance,
    /// Projects and crises.
    Civic,
    /// Travel arrivals.
    Travel,
    /// Colour text with no mechanical effect.
    Flavor,
}
