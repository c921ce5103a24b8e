//! The participant action catalog and the outcome returned for each action.
//!
//! [`Action`] is a closed enum. The processor in `breadline-actions`
//! dispatches on it with an exhaustive `match`, so adding a variant without
//! a handler is a compile error.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{District, ProjectKind, RumorTone, SeatKind, Stance};
use crate::ids::{ContractId, EvidenceId, LoanId, ObligationId, ParticipantId, RumorId};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One participant-submitted action with its typed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Action {
    // -- Market --
    /// Buy grain sacks from the public stores.
    BuyGrain {
        /// Sacks to buy, 1--20.
        sacks: u32,
    },
    /// Sell grain sacks to the public stores.
    SellGrain {
        /// Sacks to sell, 1--20.
        sacks: u32,
    },
    /// Give grain to the hungry.
    DonateRelief {
        /// Sacks to donate, 1--50.
        sacks: u32,
    },
    /// Grease the watch.
    Bribe {
        /// Gold offered, 5--100.
        gold: u32,
    },

    // -- Contracts --
    /// Take an Issued contract.
    AcceptContract {
        /// The contract.
        contract: ContractId,
        /// How the work will be done.
        stance: Stance,
    },
    /// Decline a supply contract naming this participant.
    IgnoreContract {
        /// The contract.
        contract: ContractId,
    },
    /// Hand an accepted contract back.
    AbandonContract {
        /// The contract.
        contract: ContractId,
    },
    /// Deliver an accepted or fulfilled contract.
    DeliverContract {
        /// The contract.
        contract: ContractId,
    },
    /// Post a supply contract, escrowing the reward.
    PostSupplyContract {
        /// Only this participant may accept, if set.
        supplier: Option<ParticipantId>,
        /// Sacks wanted.
        sacks: u32,
        /// Gold offered.
        reward: u32,
    },
    /// Withdraw a supply contract this participant posted.
    CancelContract {
        /// The contract.
        contract: ContractId,
    },

    // -- Institutions --
    /// Buy temporary access to the offices.
    PurchaseAccess,
    /// Treasurer: set the market tax.
    SetTaxRate {
        /// New rate, 0--30.
        percent: u32,
    },
    /// Harbormaster: toggle the high-risk permit requirement.
    TogglePermits,
    /// Harbormaster: close the harbor to smugglers.
    DeclareEmbargo {
        /// Duration, 1--12.
        ticks: u32,
    },
    /// Harbormaster: grant a trade permit.
    IssuePermit {
        /// Recipient.
        target: ParticipantId,
    },
    /// Magistrate: put a participant on the wanted list.
    IssueWarrant {
        /// The accused.
        target: ParticipantId,
    },
    /// Magistrate: clear a participant's name.
    Pardon {
        /// The pardoned.
        target: ParticipantId,
    },
    /// Step down from a held seat.
    ResignSeat {
        /// The seat.
        seat: SeatKind,
    },

    // -- Intel --
    /// Start a rumor.
    SpreadRumor {
        /// Who it is about.
        target: ParticipantId,
        /// Smear or praise.
        tone: RumorTone,
        /// The claim.
        claim: String,
    },
    /// Undercut a circulating rumor.
    CounterRumor {
        /// The rumor.
        rumor: RumorId,
    },
    /// Dig up dirt on a participant.
    GatherEvidence {
        /// Who to investigate.
        target: ParticipantId,
    },
    /// Make gathered evidence public.
    PublishEvidence {
        /// The evidence.
        evidence: EvidenceId,
    },
    /// Commission a scrying report.
    Scry {
        /// Who to observe.
        target: ParticipantId,
    },
    /// Tap a participant's correspondence.
    Intercept {
        /// Whose messages to copy.
        target: ParticipantId,
    },
    /// Perform the temple ritual for protection against smears.
    PerformRitual,

    // -- Finance --
    /// Offer a loan.
    OfferLoan {
        /// Recipient of the gold.
        borrower: ParticipantId,
        /// Gold lent, 1--500.
        principal: u32,
        /// Interest percent, 0--50.
        interest_pct: u32,
        /// Ticks from acceptance until due, 1--48.
        due_ticks: u32,
    },
    /// Accept an offered loan.
    AcceptLoan {
        /// The loan.
        loan: LoanId,
    },
    /// Decline an offered loan.
    DeclineLoan {
        /// The loan.
        loan: LoanId,
    },
    /// Pay down an active loan.
    RepayLoan {
        /// The loan.
        loan: LoanId,
        /// Gold paid.
        gold: u32,
    },
    /// Record a debt owed to this participant.
    RecordObligation {
        /// Who owes.
        debtor: ParticipantId,
        /// Gold owed, 1--500.
        amount: u32,
        /// Ticks until overdue, 1--48.
        due_ticks: u32,
        /// What it is for.
        note: String,
    },
    /// Pay an obligation in full.
    SettleObligation {
        /// The obligation.
        obligation: ObligationId,
    },
    /// Release a debtor.
    ForgiveObligation {
        /// The obligation.
        obligation: ObligationId,
    },

    // -- Civic --
    /// Fund a public works project.
    FundProject {
        /// What to build.
        kind: ProjectKind,
    },
    /// Send gold and grain to the active crisis.
    RespondCrisis {
        /// Gold contributed.
        gold: u32,
        /// Grain sacks contributed.
        grain: u32,
    },

    // -- Movement and talk --
    /// Set out for another district.
    Travel {
        /// Where to go.
        destination: District,
    },
    /// Say something in the public square.
    Chat {
        /// What to say.
        text: String,
    },
    /// Send a private message.
    SendMessage {
        /// Recipient.
        recipient: ParticipantId,
        /// Body.
        text: String,
    },
}

impl Action {
    /// Whether the action counts against the daily high-impact budget.
    pub const fn is_high_impact(&self) -> bool {
        matches!(
            self,
            Self::SetTaxRate { .. }
                | Self::TogglePermits
                | Self::DeclareEmbargo { .. }
                | Self::IssuePermit { .. }
                | Self::IssueWarrant { .. }
                | Self::Pardon { .. }
                | Self::PublishEvidence { .. }
                | Self::FundProject { .. }
                | Self::RespondCrisis { .. }
        )
    }

    /// Stable short name, used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BuyGrain { .. } => "buy_grain",
            Self::SellGrain { .. } => "sell_grain",
            Self::DonateRelief { .. } => "donate_relief",
            Self::Bribe { .. } => "bribe",
            Self::AcceptContract { .. } => "accept_contract",
            Self::IgnoreContract { .. } => "ignore_contract",
            Self::AbandonContract { .. } => "abandon_contract",
            Self::DeliverContract { .. } => "deliver_contract",
            Self::PostSupplyContract { .. } => "post_supply_contract",
            Self::CancelContract { .. } => "cancel_contract",
            Self::PurchaseAccess => "purchase_access",
            Self::SetTaxRate { .. } => "set_tax_rate",
            Self::TogglePermits => "toggle_permits",
            Self::DeclareEmbargo { .. } => "declare_embargo",
            Self::IssuePermit { .. } => "issue_permit",
            Self::IssueWarrant { .. } => "issue_warrant",
            Self::Pardon { .. } => "pardon",
            Self::ResignSeat { .. } => "resign_seat",
            Self::SpreadRumor { .. } => "spread_rumor",
            Self::CounterRumor { .. } => "counter_rumor",
            Self::GatherEvidence { .. } => "gather_evidence",
            Self::PublishEvidence { .. } => "publish_evidence",
            Self::Scry { .. } => "scry",
            Self::Intercept { .. } => "intercept",
            Self::PerformRitual => "perform_ritual",
            Self::OfferLoan { .. } => "offer_loan",
            Self::AcceptLoan { .. } => "accept_loan",
            Self::DeclineLoan { .. } => "decline_loan",
            Self::RepayLoan { .. } => "repay_loan",
            Self::RecordObligation { .. } => "record_obligation",
            Self::SettleObligation { .. } => "settle_obligation",
            Self::ForgiveObligation { .. } => "forgive_obligation",
            Self::FundProject { .. } => "fund_project",
            Self::RespondCrisis { .. } => "respond_crisis",
            Self::Travel { .. } => "travel",
            Self::Chat { .. } => "chat",
            Self::SendMessage { .. } => "send_message",
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Whether an action took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum OutcomeStatus {
    /// The full effect was applied.
    Applied,
    /// A precondition failed; nothing changed.
    Rejected,
}

/// The user-facing result of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionOutcome {
    /// Applied or rejected.
    pub status: OutcomeStatus,
    /// Message shown to the participant.
    pub message: String,
}

impl ActionOutcome {
    /// An applied action with its confirmation message.
    pub fn applied(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Applied,
            message: message.into(),
        }
    }

    /// A rejected action with its reason.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Rejected,
            message: message.into(),
        }
    }

    /// Whether the action took effect.
    pub fn is_applied(&self) -> bool {
        self.status == OutcomeStatus::Applied
    }
}
