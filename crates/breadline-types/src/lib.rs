//! Shared type definitions for the Breadline simulation.
//!
//! Everything the other crates agree on lives here: identifiers, tiers and
//! lifecycle enums, the bounded entity records held by the ledger, the
//! participant action catalog, and read-only view types exported to
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Participant UUIDs and serial entity identifiers
//! - [`enums`] -- Tiers, phases, statuses, and other closed sets
//! - [`world`] -- The world singleton with clamped grain and unrest
//! - [`participant`] -- Participants with bounded purses and standing
//! - [`structs`] -- Contracts, seats, intel, debts, projects, crises, logs
//! - [`actions`] -- The action catalog and its outcome
//! - [`views`] -- Read-only projections

pub mod actions;
pub mod enums;
pub mod ids;
pub mod participant;
pub mod structs;
pub mod views;
pub mod world;

pub use actions::{Action, ActionOutcome, OutcomeStatus};
pub use enums::{
    ContractKind, ContractStatus, CrisisKind, District, EventKind, GrainTier, LoanStatus,
    ObligationStatus, Phase, ProjectKind, RumorTone, SeatKind, Stance, Standing, UnrestTier,
};
pub use ids::{
    ChatId, ContractId, CrisisId, EventId, EvidenceId, InterceptId, LoanId, MessageId,
    ObligationId, ParticipantId, ProjectId, RumorId, ScryId,
};
pub use participant::{
    DailyTally, HEAT_MAX, Journey, Participant, REPUTATION_MAX, REPUTATION_MIN, Shortfall,
};
pub use structs::{
    BountyTerms, ChatLine, Contract, ContractTerms, Crisis, DiplomaticMessage, Event, Evidence,
    Intercept, Loan, Obligation, PolicyState, Project, Rumor, ScryReport, Seat, SeatHolder,
    SupplyTerms,
};
pub use views::{
    ChatView, ContractView, CrisisView, EventView, EvidenceView, JourneyView, LoanView,
    MessageView, ObligationView, ParticipantView, PolicyView, ProjectView, ScryView, SeatView,
    WorldView,
};
pub use world::{UNREST_MAX, World};
