//! Entity records held by the ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{
    ContractKind, ContractStatus, CrisisKind, District, EventKind, LoanStatus, ObligationStatus,
    Phase, ProjectKind, RumorTone, SeatKind, Stance,
};
use crate::ids::{
    ContractId, CrisisId, EventId, EvidenceId, InterceptId, LoanId, MessageId, ObligationId,
    ParticipantId, ProjectId, RumorId, ScryId,
};

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Terms of a supply contract posted by a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyTerms {
    /// The only participant allowed to accept, if named.
    pub supplier: Option<ParticipantId>,
    /// Sacks the supplier must hand over.
    pub sacks: u32,
    /// Gold held in escrow until delivery or expiry.
    pub escrow: u32,
}

/// Terms of a bounty issued against a high-heat participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountyTerms {
    /// The participant being hunted.
    pub target: ParticipantId,
    /// Gold paid on delivery.
    pub reward: u32,
    /// Pieces of evidence the hunter must hold.
    pub evidence_required: u32,
}

/// Kind-specific contract terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContractTerms {
    /// Ordinary relief run.
    Emergency,
    /// Ordinary run past the watch.
    Smuggling,
    /// Participant-posted grain purchase.
    Supply(SupplyTerms),
    /// Institution-issued hunt.
    Bounty(BountyTerms),
}

impl ContractTerms {
    /// The contract kind these terms describe.
    pub const fn kind(&self) -> ContractKind {
        match self {
            Self::Emergency => ContractKind::Emergency,
            Self::Smuggling => ContractKind::Smuggling,
            Self::Supply(_) => ContractKind::Supply,
            Self::Bounty(_) => ContractKind::Bounty,
        }
    }
}

/// A unit of work offered to participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Identifier.
    pub id: ContractId,
    /// Kind-specific terms.
    pub terms: ContractTerms,
    /// Lifecycle state.
    pub status: ContractStatus,
    /// Ticks left before the contract expires.
    pub deadline_ticks: u32,
    /// Participant who holds the contract.
    pub owner: Option<ParticipantId>,
    /// Participant who posted the contract, for supply contracts.
    pub issuer: Option<ParticipantId>,
    /// How the owner is working the contract.
    pub stance: Option<Stance>,
    /// Grain added to the public stores when fulfilled.
    pub grain_reward: u32,
    /// Gold paid before stance and reputation adjustments.
    pub base_reward: u32,
    /// Tick on which the contract was issued.
    pub issued_tick: u64,
    /// When the current owner accepted.
    pub accepted_at: Option<DateTime<Utc>>,
    /// Short flavor line.
    pub title: String,
}

impl Contract {
    /// The contract kind.
    pub const fn kind(&self) -> ContractKind {
        self.terms.kind()
    }

    /// Whether `pid` currently holds this contract.
    pub fn is_owned_by(&self, pid: ParticipantId) -> bool {
        self.owner == Some(pid)
    }

    /// Bounty target, if this is a bounty.
    pub const fn bounty_target(&self) -> Option<ParticipantId> {
        match self.terms {
            ContractTerms::Bounty(terms) => Some(terms.target),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Institutions
// ---------------------------------------------------------------------------

/// Who occupies a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum SeatHolder {
    /// The seat's caretaker NPC.
    Npc,
    /// A participant.
    Participant(ParticipantId),
}

impl SeatHolder {
    /// The participant holding the seat, if any.
    pub const fn participant(&self) -> Option<ParticipantId> {
        match self {
            Self::Npc => None,
            Self::Participant(pid) => Some(*pid),
        }
    }
}

/// An institutional office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Which office.
    pub kind: SeatKind,
    /// Current occupant.
    pub holder: SeatHolder,
    /// Ticks left in the current term.
    pub tenure_ticks: u32,
    /// Ticks left in an open election, if one is running.
    pub election_ticks: Option<u32>,
}

impl Seat {
    /// Whether `pid` holds this seat.
    pub fn is_held_by(&self, pid: ParticipantId) -> bool {
        self.holder == SeatHolder::Participant(pid)
    }
}

/// City-wide policy levers and the treasury.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyState {
    /// Market tax, 0--30 percent.
    pub tax_rate_pct: u32,
    /// Whether trading grain requires a permit.
    pub permits_required: bool,
    /// Ticks left on the embargo.
    pub embargo_ticks: u32,
    /// Gold collected by taxes, fines, and bribes.
    pub treasury: u32,
}

// ---------------------------------------------------------------------------
// Intel
// ---------------------------------------------------------------------------

/// A rumor working its way through the city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rumor {
    /// Identifier.
    pub id: RumorId,
    /// Who started it.
    pub source: ParticipantId,
    /// Who it is about.
    pub target: ParticipantId,
    /// Smear or praise.
    pub tone: RumorTone,
    /// The claim as told.
    pub claim: String,
    /// 0--100; rumors fade out below the counter threshold.
    pub credibility: u32,
    /// Accumulated spread; the rumor lands at the threshold.
    pub spread: u32,
    /// Ticks before the rumor dies out.
    pub life_ticks: u32,
    /// Whether the rumor's effect has already fired.
    pub landed: bool,
}

/// Evidence gathered against a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Identifier.
    pub id: EvidenceId,
    /// Who holds it.
    pub owner: ParticipantId,
    /// Who it incriminates.
    pub target: ParticipantId,
    /// Weight when published.
    pub strength: u32,
    /// Tick after which it is stale.
    pub expires_tick: u64,
}

/// A scrying report snapshotting another participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScryReport {
    /// Identifier.
    pub id: ScryId,
    /// Who commissioned it.
    pub owner: ParticipantId,
    /// Who was observed.
    pub target: ParticipantId,
    /// Target's name at the time.
    pub target_name: String,
    /// Target's reputation at the time.
    pub reputation: i32,
    /// Target's heat at the time.
    pub heat: u32,
    /// Target's gold at the time.
    pub gold: u32,
    /// Target's grain at the time.
    pub grain: u32,
    /// Where the target was.
    pub location: District,
    /// Tick after which the report is discarded.
    pub expires_tick: u64,
}

/// A tap on another participant's correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intercept {
    /// Identifier.
    pub id: InterceptId,
    /// Who placed the tap.
    pub owner: ParticipantId,
    /// Whose messages are copied.
    pub target: ParticipantId,
    /// Tick after which the tap lapses.
    pub expires_tick: u64,
    /// Messages captured so far, oldest first.
    pub captured: Vec<MessageId>,
}

// ---------------------------------------------------------------------------
// Finance
// ---------------------------------------------------------------------------

/// A gold loan between participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// Identifier.
    pub id: LoanId,
    /// Who offers the gold.
    pub lender: ParticipantId,
    /// Who receives it.
    pub borrower: ParticipantId,
    /// Gold handed over on acceptance.
    pub principal: u32,
    /// Gold still owed, interest included.
    pub outstanding: u32,
    /// Interest percent added at acceptance.
    pub interest_pct: u32,
    /// Ticks from acceptance until due.
    pub term_ticks: u32,
    /// Tick at which the loan falls due, set on acceptance.
    pub due_tick: Option<u64>,
    /// Tick at which an unanswered offer lapses.
    #[serde(default)]
    pub offer_expires_tick: u64,
    /// Lifecycle state.
    pub status: LoanStatus,
}

/// An informal debt recorded between participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    /// Identifier.
    pub id: ObligationId,
    /// Who is owed.
    pub creditor: ParticipantId,
    /// Who owes.
    pub debtor: ParticipantId,
    /// Gold owed.
    pub amount: u32,
    /// What the debt is for.
    pub note: String,
    /// Tick at which the obligation becomes overdue.
    pub due_tick: u64,
    /// Lifecycle state.
    pub status: ObligationStatus,
}

// ---------------------------------------------------------------------------
// Civic
// ---------------------------------------------------------------------------

/// A public works project under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Identifier.
    pub id: ProjectId,
    /// Who funded it.
    pub owner: ParticipantId,
    /// What is being built.
    pub kind: ProjectKind,
    /// Ticks until completion.
    pub remaining_ticks: u32,
    /// Tick on which construction began.
    pub started_tick: u64,
}

/// The city-wide emergency, if one is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crisis {
    /// Identifier.
    pub id: CrisisId,
    /// What went wrong.
    pub kind: CrisisKind,
    /// 1--3.
    pub severity: u32,
    /// Ticks before the crisis resolves.
    pub remaining_ticks: u32,
    /// Mitigation points needed to avert failure.
    pub mitigation_needed: u32,
    /// Mitigation points contributed so far.
    pub mitigation_progress: u32,
    /// Points contributed by each participant.
    pub contributors: BTreeMap<ParticipantId, u32>,
    /// Tick on which the crisis began.
    pub started_tick: u64,
}

impl Crisis {
    /// Whether enough help has arrived.
    pub const fn is_mitigated(&self) -> bool {
        self.mitigation_progress >= self.mitigation_needed
    }
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

/// An entry in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier.
    pub id: EventId,
    /// Tick on which it happened.
    pub tick: u64,
    /// Day on which it happened.
    pub day: u32,
    /// Phase in which it happened.
    pub phase: Phase,
    /// Wall-clock time.
    pub at: DateTime<Utc>,
    /// Category.
    pub kind: EventKind,
    /// Human-readable line.
    pub text: String,
    /// Restricts visibility to one participant; `None` is public.
    pub audience: Option<ParticipantId>,
}

/// A public chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    /// Identifier.
    pub id: crate::ids::ChatId,
    /// When it was said.
    pub at: DateTime<Utc>,
    /// Who said it.
    pub author: ParticipantId,
    /// Author's name at the time.
    pub author_name: String,
    /// What was said.
    pub text: String,
}

/// A private message between participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplomaticMessage {
    /// Identifier.
    pub id: MessageId,
    /// When it was sent.
    pub at: DateTime<Utc>,
    /// Sender.
    pub from: ParticipantId,
    /// Recipient.
    pub to: ParticipantId,
    /// Body.
    pub text: String,
}
