//! The world ledger: the single aggregate that owns every entity.
//!
//! Nothing outside the ledger holds an entity beyond the duration of one
//! serialized operation. Request handlers and the tick engine both receive
//! `&mut Ledger` from the access serializer and hand it back when done.
//!
//! # Identifiers
//!
//! Serial identifiers are minted from [`Counters`], which only ever count
//! up. Removing an entity never frees its identifier, so a stale reference
//! held by a client resolves to "not found" rather than to a newer entity.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use breadline_types::{
    ChatId, ChatLine, Contract, ContractId, ContractKind, ContractStatus, Crisis, CrisisId,
    DiplomaticMessage, Event, EventId, EventKind, Evidence, EvidenceId, Intercept, InterceptId,
    Loan, LoanId, MessageId, Obligation, ObligationId, Participant, ParticipantId, PolicyState,
    Project, ProjectId, Rumor, RumorId, RumorTone, ScryId, ScryReport, Seat, SeatHolder, SeatKind,
    Standing, World,
};

use crate::names::generate_name;
use crate::ring::RingLog;
use crate::rules;

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// Last identifier minted for each serial entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    contract: u64,
    loan: u64,
    obligation: u64,
    rumor: u64,
    evidence: u64,
    scry: u64,
    intercept: u64,
    project: u64,
    crisis: u64,
    event: u64,
    chat: u64,
    message: u64,
}

const fn bump(slot: &mut u64) -> u64 {
    *slot = slot.saturating_add(1);
    *slot
}

impl Counters {
    /// Next contract id.
    pub const fn contract(&mut self) -> ContractId {
        ContractId(bump(&mut self.contract))
    }

    /// Next loan id.
    pub const fn loan(&mut self) -> LoanId {
        LoanId(bump(&mut self.loan))
    }

    /// Next obligation id.
    pub const fn obligation(&mut self) -> ObligationId {
        ObligationId(bump(&mut self.obligation))
    }

    /// Next rumor id.
    pub const fn rumor(&mut self) -> RumorId {
        RumorId(bump(&mut self.rumor))
    }

    /// Next evidence id.
    pub const fn evidence(&mut self) -> EvidenceId {
        EvidenceId(bump(&mut self.evidence))
    }

    /// Next scry report id.
    pub const fn scry(&mut self) -> ScryId {
        ScryId(bump(&mut self.scry))
    }

    /// Next intercept id.
    pub const fn intercept(&mut self) -> InterceptId {
        InterceptId(bump(&mut self.intercept))
    }

    /// Next project id.
    pub const fn project(&mut self) -> ProjectId {
        ProjectId(bump(&mut self.project))
    }

    /// Next crisis id.
    pub const fn crisis(&mut self) -> CrisisId {
        CrisisId(bump(&mut self.crisis))
    }

    const fn event(&mut self) -> EventId {
        EventId(bump(&mut self.event))
    }

    const fn chat(&mut self) -> ChatId {
        ChatId(bump(&mut self.chat))
    }

    const fn message(&mut self) -> MessageId {
        MessageId(bump(&mut self.message))
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The in-memory aggregate of all simulation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Clock, grain, and unrest.
    pub world: World,
    /// Tax, permits, embargo, treasury.
    pub policy: PolicyState,
    /// Every participant ever seen, including tombstones.
    pub participants: BTreeMap<ParticipantId, Participant>,
    /// Contracts, including terminal ones until housekeeping prunes them.
    pub contracts: BTreeMap<ContractId, Contract>,
    /// One entry per seat kind.
    pub seats: BTreeMap<SeatKind, Seat>,
    /// Circulating rumors.
    pub rumors: BTreeMap<RumorId, Rumor>,
    /// Unexpired evidence.
    pub evidence: BTreeMap<EvidenceId, Evidence>,
    /// Unexpired scrying reports.
    pub scry_reports: BTreeMap<ScryId, ScryReport>,
    /// Active intercepts.
    pub intercepts: BTreeMap<InterceptId, Intercept>,
    /// Loans in any state.
    pub loans: BTreeMap<LoanId, Loan>,
    /// Obligations in any state.
    pub obligations: BTreeMap<ObligationId, Obligation>,
    /// Projects under construction.
    pub projects: BTreeMap<ProjectId, Project>,
    /// The running crisis, if any.
    pub crisis: Option<Crisis>,
    /// Narrative event log.
    pub events: RingLog<Event>,
    /// Public chat.
    pub chat: RingLog<ChatLine>,
    /// Private correspondence.
    pub messages: RingLog<DiplomaticMessage>,
    /// Serial id counters.
    pub counters: Counters,
    /// UTC date of the most recent daily bootstrap tick.
    pub last_bootstrap_date: Option<NaiveDate>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// A fresh world at genesis with NPCs in every seat.
    pub fn new() -> Self {
        let seats = SeatKind::ALL
            .into_iter()
            .map(|kind| {
                (
                    kind,
                    Seat {
                        kind,
                        holder: SeatHolder::Npc,
                        tenure_ticks: rules::SEAT_TENURE_TICKS,
                        election_ticks: None,
                    },
                )
            })
            .collect();
        Self {
            world: World::new(rules::INITIAL_GRAIN_SUPPLY, rules::INITIAL_UNREST),
            policy: PolicyState {
                tax_rate_pct: rules::INITIAL_TAX_RATE_PCT,
                permits_required: false,
                embargo_ticks: 0,
                treasury: 0,
            },
            participants: BTreeMap::new(),
            contracts: BTreeMap::new(),
            seats,
            rumors: BTreeMap::new(),
            evidence: BTreeMap::new(),
            scry_reports: BTreeMap::new(),
            intercepts: BTreeMap::new(),
            loans: BTreeMap::new(),
            obligations: BTreeMap::new(),
            projects: BTreeMap::new(),
            crisis: None,
            events: RingLog::with_capacity(rules::EVENT_LOG_CAPACITY),
            chat: RingLog::with_capacity(rules::CHAT_LOG_CAPACITY),
            messages: RingLog::with_capacity(rules::MESSAGE_LOG_CAPACITY),
            counters: Counters::default(),
            last_bootstrap_date: None,
        }
    }

    /// Re-derive tiers and clamp bounded fields after loading a snapshot.
    ///
    /// Also restores any seat missing from an older snapshot.
    pub fn normalize(&mut self) {
        self.world.normalize();
        for participant in self.participants.values_mut() {
            participant.normalize();
        }
        self.policy.tax_rate_pct = self.policy.tax_rate_pct.min(rules::MAX_TAX_RATE_PCT);
        for kind in SeatKind::ALL {
            self.seats.entry(kind).or_insert(Seat {
                kind,
                holder: SeatHolder::Npc,
                tenure_ticks: rules::SEAT_TENURE_TICKS,
                election_ticks: None,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Participants
    // -----------------------------------------------------------------------

    /// Look up a participant.
    pub fn participant(&self, pid: ParticipantId) -> Option<&Participant> {
        self.participants.get(&pid)
    }

    /// Look up a participant mutably.
    pub fn participant_mut(&mut self, pid: ParticipantId) -> Option<&mut Participant> {
        self.participants.get_mut(&pid)
    }

    /// Display name of a participant, or a placeholder for unknown ids.
    pub fn name_of(&self, pid: ParticipantId) -> String {
        self.participants
            .get(&pid)
            .map_or_else(|| "a stranger".to_owned(), |p| p.name.clone())
    }

    /// Create a participant with a fresh unique name and the starting kit.
    ///
    /// Returns the existing participant unchanged if `pid` is already known.
    pub fn register_participant<R: Rng + ?Sized>(
        &mut self,
        pid: ParticipantId,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> &mut Participant {
        if !self.participants.contains_key(&pid) {
            let name = generate_name(rng, |candidate| {
                self.participants.values().any(|p| p.name == candidate)
            });
            let mut participant = Participant::new(pid, name, now);
            participant.reset_resources(
                rules::STARTING_GOLD,
                rules::STARTING_GRAIN,
                rules::STARTING_RUMOR_TOKENS,
            );
            tracing::info!(participant = %pid, name = %participant.name, "Participant joined");
            let text = format!("{} arrives in the city.", participant.name);
            self.participants.insert(pid, participant);
            self.announce(now, EventKind::World, text);
        }
        self.participants
            .entry(pid)
            .or_insert_with(|| Participant::new(pid, String::new(), now))
    }

    /// Set a one-shot notice for a participant.
    pub fn set_toast(&mut self, pid: ParticipantId, message: impl Into<String>) {
        if let Some(participant) = self.participants.get_mut(&pid) {
            participant.toast = Some(message.into());
        }
    }

    /// Whether any participant was seen within the online window.
    pub fn any_online(&self, now: DateTime<Utc>, window_secs: i64) -> bool {
        self.participants
            .values()
            .any(|p| p.is_online(now, window_secs))
    }

    /// Participants eligible to stand for office.
    pub fn candidates(&self) -> impl Iterator<Item = &Participant> {
        self.participants
            .values()
            .filter(|p| p.standing == Standing::Active)
    }

    // -----------------------------------------------------------------------
    // Contracts
    // -----------------------------------------------------------------------

    /// The contract a participant currently holds in Accepted state.
    pub fn accepted_contract_of(&self, pid: ParticipantId) -> Option<&Contract> {
        self.contracts
            .values()
            .find(|c| c.status == ContractStatus::Accepted && c.is_owned_by(pid))
    }

    /// Whether a contract of `kind` is Issued or Accepted.
    pub fn has_active_contract(&self, kind: ContractKind) -> bool {
        self.contracts
            .values()
            .any(|c| c.kind() == kind && c.status.is_active())
    }

    /// Whether a non-terminal bounty already targets `pid`.
    pub fn has_open_bounty_on(&self, pid: ParticipantId) -> bool {
        self.contracts
            .values()
            .any(|c| !c.status.is_terminal() && c.bounty_target() == Some(pid))
    }

    /// Gold held in escrow by supply contracts that can still pay out.
    pub fn escrowed_gold(&self) -> u64 {
        self.contracts
            .values()
            .filter(|c| !c.status.is_terminal())
            .filter_map(|c| match c.terms {
                breadline_types::ContractTerms::Supply(terms) => Some(u64::from(terms.escrow)),
                _ => None,
            })
            .fold(0_u64, u64::saturating_add)
    }

    // -----------------------------------------------------------------------
    // Institutions
    // -----------------------------------------------------------------------

    /// Whether `pid` holds the seat of `kind`.
    pub fn holds_seat(&self, pid: ParticipantId, kind: SeatKind) -> bool {
        self.seats.get(&kind).is_some_and(|s| s.is_held_by(pid))
    }

    /// Seats held by `pid`.
    pub fn seats_of(&self, pid: ParticipantId) -> Vec<SeatKind> {
        self.seats
            .values()
            .filter(|s| s.is_held_by(pid))
            .map(|s| s.kind)
            .collect()
    }

    /// Display name of a seat's holder.
    pub fn holder_name(&self, seat: &Seat) -> String {
        match seat.holder {
            SeatHolder::Npc => seat.kind.npc_holder().to_owned(),
            SeatHolder::Participant(pid) => self.name_of(pid),
        }
    }

    /// Add gold to the treasury.
    pub const fn credit_treasury(&mut self, amount: u32) {
        self.policy.treasury = self.policy.treasury.saturating_add(amount);
    }

    // -----------------------------------------------------------------------
    // Intel
    // -----------------------------------------------------------------------

    /// Whether a landed praise rumor currently favours `pid`.
    pub fn has_landed_praise(&self, pid: ParticipantId) -> bool {
        self.rumors
            .values()
            .any(|r| r.target == pid && r.tone == RumorTone::Praise && r.landed)
    }

    // -----------------------------------------------------------------------
    // Logs
    // -----------------------------------------------------------------------

    /// Append a public event.
    pub fn announce(&mut self, now: DateTime<Utc>, kind: EventKind, text: impl Into<String>) {
        self.push_event(now, kind, None, text.into());
    }

    /// Append an event only `pid` can see.
    pub fn notify(
        &mut self,
        now: DateTime<Utc>,
        pid: ParticipantId,
        kind: EventKind,
        text: impl Into<String>,
    ) {
        self.push_event(now, kind, Some(pid), text.into());
    }

    fn push_event(
        &mut self,
        now: DateTime<Utc>,
        kind: EventKind,
        audience: Option<ParticipantId>,
        text: String,
    ) {
        let id = self.counters.event();
        tracing::debug!(event = %id, ?kind, %text, "Event logged");
        self.events.push(Event {
            id,
            tick: self.world.tick_count,
            day: self.world.day,
            phase: self.world.phase,
            at: now,
            kind,
            text,
            audience,
        });
    }

    /// Append a public chat line.
    pub fn post_chat(&mut self, now: DateTime<Utc>, author: ParticipantId, text: String) -> ChatId {
        let id = self.counters.chat();
        let author_name = self.name_of(author);
        self.chat.push(ChatLine {
            id,
            at: now,
            author,
            author_name,
            text,
        });
        id
    }

    /// Deliver a private message, copying it to any intercept on either party.
    pub fn send_message(
        &mut self,
        now: DateTime<Utc>,
        from: ParticipantId,
        to: ParticipantId,
        text: String,
    ) -> MessageId {
        let id = self.counters.message();
        let tick = self.world.tick_count;
        for intercept in self.intercepts.values_mut() {
            let watching = intercept.target == from || intercept.target == to;
            if watching
                && tick < intercept.expires_tick
                && intercept.captured.len() < rules::INTERCEPT_CAPACITY
            {
                intercept.captured.push(id);
            }
        }
        self.messages.push(DiplomaticMessage {
            id,
            at: now,
            from,
            to,
            text,
        });
        id
    }
}
