//! Read-only projections of the ledger for rendering collaborators.
//!
//! Views own plain copies of the data they show. Nothing in this module
//! holds a reference back into the ledger, so a view can never be used to
//! mutate world state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    ContractKind, ContractStatus, CrisisKind, District, EventKind, GrainTier, LoanStatus,
    ObligationStatus, Phase, ProjectKind, SeatKind, Stance, Standing, UnrestTier,
};
use crate::ids::{
    ChatId, ContractId, EventId, EvidenceId, LoanId, MessageId, ObligationId, ParticipantId,
    ProjectId, ScryId,
};

/// City-wide state visible to everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldView {
    /// Day number.
    pub day: u32,
    /// Morning or evening.
    pub phase: Phase,
    /// Ticks since genesis.
    pub tick_count: u64,
    /// Grain in the public stores.
    pub grain_supply: u32,
    /// Grain tier.
    pub grain_tier: GrainTier,
    /// Unrest, 0--100.
    pub unrest: u32,
    /// Unrest tier.
    pub unrest_tier: UnrestTier,
    /// Narrative summary.
    pub situation: String,
    /// Ticks left on the market restriction.
    pub market_restriction_ticks: u32,
    /// Current buy price per sack.
    pub buy_price: u32,
    /// Current sell price per sack.
    pub sell_price: u32,
    /// The active crisis, if any.
    pub crisis: Option<CrisisView>,
    /// Projects under construction.
    pub projects: Vec<ProjectView>,
}

/// The active crisis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CrisisView {
    /// What went wrong.
    pub kind: CrisisKind,
    /// 1--3.
    pub severity: u32,
    /// Ticks before it resolves.
    pub remaining_ticks: u32,
    /// Points needed.
    pub mitigation_needed: u32,
    /// Points contributed.
    pub mitigation_progress: u32,
}

/// A project under construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProjectView {
    /// Identifier.
    pub id: ProjectId,
    /// What is being built.
    pub kind: ProjectKind,
    /// Funder's name.
    pub owner_name: String,
    /// Ticks until completion.
    pub remaining_ticks: u32,
}

/// A contract as seen by one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ContractView {
    /// Identifier.
    pub id: ContractId,
    /// Kind.
    pub kind: ContractKind,
    /// Lifecycle state.
    pub status: ContractStatus,
    /// Flavor line.
    pub title: String,
    /// Ticks before expiry.
    pub deadline_ticks: u32,
    /// Holder's name.
    pub owner_name: Option<String>,
    /// Chosen stance.
    pub stance: Option<Stance>,
    /// Grain added to the stores on fulfilment.
    pub grain_reward: u32,
    /// Headline gold reward before adjustments.
    pub reward: u32,
    /// Whether the viewer holds it.
    pub mine: bool,
}

/// An institutional seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeatView {
    /// Which office.
    pub kind: SeatKind,
    /// Holder's display name.
    pub holder_name: String,
    /// Holder's id when a participant sits.
    pub holder: Option<ParticipantId>,
    /// Ticks left in the term.
    pub tenure_ticks: u32,
    /// Ticks left in an open election.
    pub election_ticks: Option<u32>,
}

/// Seats and policy levers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PolicyView {
    /// Market tax percent.
    pub tax_rate_pct: u32,
    /// Whether permits are required.
    pub permits_required: bool,
    /// Ticks left on the embargo.
    pub embargo_ticks: u32,
    /// Gold in the treasury.
    pub treasury: u32,
    /// Every seat.
    pub seats: Vec<SeatView>,
}

/// An event log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventView {
    /// Identifier.
    pub id: EventId,
    /// Tick of occurrence.
    pub tick: u64,
    /// Day of occurrence.
    pub day: u32,
    /// Phase of occurrence.
    pub phase: Phase,
    /// Category.
    pub kind: EventKind,
    /// Narrative text.
    pub text: String,
    /// Whether only the viewer can see it.
    pub private: bool,
}

/// A chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatView {
    /// Identifier.
    pub id: ChatId,
    /// When it was said.
    pub at: DateTime<Utc>,
    /// Speaker.
    pub author_name: String,
    /// Text.
    pub text: String,
}

/// A diplomatic message in the viewer's inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MessageView {
    /// Identifier.
    pub id: MessageId,
    /// When it was sent.
    pub at: DateTime<Utc>,
    /// Sender's name.
    pub from_name: String,
    /// Recipient's name.
    pub to_name: String,
    /// Body.
    pub text: String,
    /// Whether the viewer only sees it through an intercept.
    pub intercepted: bool,
}

/// A loan the viewer is party to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LoanView {
    /// Identifier.
    pub id: LoanId,
    /// Lender's name.
    pub lender_name: String,
    /// Borrower's name.
    pub borrower_name: String,
    /// Gold lent.
    pub principal: u32,
    /// Gold still owed.
    pub outstanding: u32,
    /// Tick at which it falls due.
    pub due_tick: Option<u64>,
    /// Lifecycle state.
    pub status: LoanStatus,
}

/// An obligation the viewer is party to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ObligationView {
    /// Identifier.
    pub id: ObligationId,
    /// Creditor's name.
    pub creditor_name: String,
    /// Debtor's name.
    pub debtor_name: String,
    /// Gold owed.
    pub amount: u32,
    /// What it is for.
    pub note: String,
    /// Tick at which it becomes overdue.
    pub due_tick: u64,
    /// Lifecycle state.
    pub status: ObligationStatus,
}

/// Evidence held by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EvidenceView {
    /// Identifier.
    pub id: EvidenceId,
    /// Who it incriminates.
    pub target_name: String,
    /// Weight when published.
    pub strength: u32,
    /// Tick after which it is stale.
    pub expires_tick: u64,
}

/// A scrying report held by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScryView {
    /// Identifier.
    pub id: ScryId,
    /// Who was observed.
    pub target_name: String,
    /// Observed reputation.
    pub reputation: i32,
    /// Observed heat.
    pub heat: u32,
    /// Observed location.
    pub location: District,
    /// Coarse wealth description.
    pub wealth: String,
    /// Tick after which the report is discarded.
    pub expires_tick: u64,
}

/// A trip in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct JourneyView {
    /// Destination.
    pub destination: District,
    /// Ticks until arrival.
    pub remaining_ticks: u32,
    /// Trip length.
    pub total_ticks: u32,
}

/// Everything one participant may see about themselves and the city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParticipantView {
    /// Identifier.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Gold held.
    pub gold: u32,
    /// Grain held.
    pub grain: u32,
    /// Reputation.
    pub reputation: i32,
    /// Heat.
    pub heat: u32,
    /// Rumor tokens.
    pub rumor_tokens: u32,
    /// Current district.
    pub location: District,
    /// Trip in progress.
    pub journey: Option<JourneyView>,
    /// Lifecycle standing.
    pub standing: Standing,
    /// Ticks of ritual immunity left.
    pub ritual_immunity_ticks: u32,
    /// Ticks of purchased access left.
    pub access_ticks: u32,
    /// Ticks of trade permit left.
    pub permit_ticks: u32,
    /// High-impact actions left today.
    pub high_impact_remaining: u32,
    /// Contracts completed today.
    pub contracts_completed_today: u32,
    /// Seats held.
    pub seats: Vec<SeatKind>,
    /// Contracts the viewer may act on or holds.
    pub contracts: Vec<ContractView>,
    /// Public and private events, newest last.
    pub events: Vec<EventView>,
    /// Public chat, newest last.
    pub chat: Vec<ChatView>,
    /// Messages to or from the viewer, plus intercepted ones.
    pub inbox: Vec<MessageView>,
    /// Loans the viewer is party to.
    pub loans: Vec<LoanView>,
    /// Obligations the viewer is party to.
    pub obligations: Vec<ObligationView>,
    /// Evidence held.
    pub evidence: Vec<EvidenceView>,
    /// Scrying reports held.
    pub reports: Vec<ScryView>,
}
