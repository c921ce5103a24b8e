//! Per-domain action handlers.
//!
//! Every handler has the same shape: run all precondition checks against
//! `&Ledger`, then mutate. A handler returns the confirmation message on
//! success and a [`Rejection`] on failure; on failure the ledger is exactly
//! as it was.
//!
//! # Submodules
//!
//! - [`market`] -- Buying, selling, relief, bribes
//! - [`contracts`] -- Contract acceptance, delivery, supply orders
//! - [`office`] -- Seats, policy levers, purchased access
//! - [`intel`] -- Rumors, evidence, scrying, intercepts, the ritual
//! - [`finance`] -- Loans and obligations
//! - [`civic`] -- Projects and crisis response
//! - [`movement`] -- Travel, chat, private messages

pub mod civic;
pub mod contracts;
pub mod finance;
pub mod intel;
pub mod market;
pub mod movement;
pub mod office;

use chrono::{DateTime, Utc};
use rand::Rng;

use breadline_ledger::Ledger;
use breadline_types::{Action, ParticipantId};

use crate::error::Rejection;

/// Who is acting, and when.
#[derive(Debug, Clone, Copy)]
pub struct Turn {
    /// The acting participant.
    pub pid: ParticipantId,
    /// Wall-clock time of the request.
    pub now: DateTime<Utc>,
}

/// Route an action to its handler.
pub fn dispatch<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    turn: Turn,
    action: &Action,
    rng: &mut R,
) -> Result<String, Rejection> {
    match action {
        Action::BuyGrain { sacks } => market::buy_grain(ledger, turn, *sacks),
        Action::SellGrain { sacks } => market::sell_grain(ledger, turn, *sacks),
        Action::DonateRelief { sacks } => market::donate_relief(ledger, turn, *sacks),
        Action::Bribe { gold } => market::bribe(ledger, turn, *gold, rng),

        Action::AcceptContract { contract, stance } => {
            contracts::accept(ledger, turn, *contract, *stance)
        }
        Action::IgnoreContract { contract } => contracts::ignore(ledger, turn, *contract),
        Action::AbandonContract { contract } => contracts::abandon(ledger, turn, *contract),
        Action::DeliverContract { contract } => contracts::deliver(ledger, turn, *contract, rng),
        Action::PostSupplyContract {
            supplier,
            sacks,
            reward,
        } => contracts::post_supply(ledger, turn, *supplier, *sacks, *reward),
        Action::CancelContract { contract } => contracts::cancel(ledger, turn, *contract),

        Action::PurchaseAccess => office::purchase_access(ledger, turn),
        Action::SetTaxRate { percent } => office::set_tax_rate(ledger, turn, *percent),
        Action::TogglePermits => office::toggle_permits(ledger, turn),
        Action::DeclareEmbargo { ticks } => office::declare_embargo(ledger, turn, *ticks),
        Action::IssuePermit { target } => office::issue_permit(ledger, turn, *target),
        Action::IssueWarrant { target } => office::issue_warrant(ledger, turn, *target),
        Action::Pardon { target } => office::pardon(ledger, turn, *target),
        Action::ResignSeat { seat } => office::resign(ledger, turn, *seat),

        Action::SpreadRumor {
            target,
            tone,
            claim,
        } => intel::spread_rumor(ledger, turn, *target, *tone, claim, rng),
        Action::CounterRumor { rumor } => intel::counter_rumor(ledger, turn, *rumor),
        Action::GatherEvidence { target } => intel::gather_evidence(ledger, turn, *target, rng),
        Action::PublishEvidence { evidence } => intel::publish_evidence(ledger, turn, *evidence),
        Action::Scry { target } => intel::scry(ledger, turn, *target),
        Action::Intercept { target } => intel::intercept(ledger, turn, *target),
        Action::PerformRitual => intel::perform_ritual(ledger, turn),

        Action::OfferLoan {
            borrower,
            principal,
            interest_pct,
            due_ticks,
        } => finance::offer_loan(
            ledger,
            turn,
            finance::LoanTerms {
                borrower: *borrower,
                principal: *principal,
                interest_pct: *interest_pct,
                due_ticks: *due_ticks,
            },
        ),
        Action::AcceptLoan { loan } => finance::accept_loan(ledger, turn, *loan),
        Action::DeclineLoan { loan } => finance::decline_loan(ledger, turn, *loan),
        Action::RepayLoan { loan, gold } => finance::repay_loan(ledger, turn, *loan, *gold),
        Action::RecordObligation {
            debtor,
            amount,
            due_ticks,
            note,
        } => finance::record_obligation(ledger, turn, *debtor, *amount, *due_ticks, note),
        Action::SettleObligation { obligation } => {
            finance::settle_obligation(ledger, turn, *obligation)
        }
        Action::ForgiveObligation { obligation } => {
            finance::forgive_obligation(ledger, turn, *obligation)
        }

        Action::FundProject { kind } => civic::fund_project(ledger, turn, *kind),
        Action::RespondCrisis { gold, grain } => civic::respond_crisis(ledger, turn, *gold, *grain),

        Action::Travel { destination } => movement::travel(ledger, turn, *destination),
        Action::Chat { text } => movement::chat(ledger, turn, text),
        Action::SendMessage { recipient, text } => {
            movement::send_message(ledger, turn, *recipient, text)
        }
    }
}

/// Roll a percent chance.
pub(crate) fn roll_pct<R: Rng + ?Sized>(rng: &mut R, chance: u32) -> bool {
    rng.random_range(0..100_u32) < chance
}
