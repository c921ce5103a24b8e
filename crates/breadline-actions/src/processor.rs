//! The action pipeline: one participant action, one atomic effect.
//!
//! [`apply_action`] is the only entry point. It runs the shared gates
//! (known participant, daily budget), dispatches to a handler, and on
//! success audits value conservation, records the toast, and charges the
//! high-impact budget. A rejection leaves the ledger unchanged apart from
//! the daily tally rollover.

use chrono::{DateTime, Utc};
use rand::Rng;

use breadline_ledger::{Audit, Holdings, Ledger, conservation};
use breadline_types::{Action, ActionOutcome, ParticipantId};

use crate::budget;
use crate::error::Rejection;
use crate::handlers::{self, Turn};

/// Which totals an action must leave unchanged.
pub const fn audit_for(action: &Action) -> Audit {
    match action {
        Action::BuyGrain { .. }
        | Action::SellGrain { .. }
        | Action::SpreadRumor { .. }
        | Action::CounterRumor { .. }
        | Action::GatherEvidence { .. }
        | Action::Scry { .. }
        | Action::Intercept { .. }
        | Action::FundProject { .. } => Audit::GRAIN_ONLY,
        Action::PerformRitual => Audit::GOLD_ONLY,
        Action::DeliverContract { .. } | Action::RespondCrisis { .. } => Audit::NONE,
        Action::DonateRelief { .. }
        | Action::Bribe { .. }
        | Action::AcceptContract { .. }
        | Action::IgnoreContract { .. }
        | Action::AbandonContract { .. }
        | Action::PostSupplyContract { .. }
        | Action::CancelContract { .. }
        | Action::PurchaseAccess
        | Action::SetTaxRate { .. }
        | Action::TogglePermits
        | Action::DeclareEmbargo { .. }
        | Action::IssuePermit { .. }
        | Action::IssueWarrant { .. }
        | Action::Pardon { .. }
        | Action::ResignSeat { .. }
        | Action::PublishEvidence { .. }
        | Action::OfferLoan { .. }
        | Action::AcceptLoan { .. }
        | Action::DeclineLoan { .. }
        | Action::RepayLoan { .. }
        | Action::RecordObligation { .. }
        | Action::SettleObligation { .. }
        | Action::ForgiveObligation { .. }
        | Action::Travel { .. }
        | Action::Chat { .. }
        | Action::SendMessage { .. } => Audit::BOTH,
    }
}

/// Apply one action for `pid` at `now`.
///
/// The caller holds exclusive access to the ledger for the duration.
pub fn apply_action<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    pid: ParticipantId,
    action: &Action,
    now: DateTime<Utc>,
    rng: &mut R,
) -> ActionOutcome {
    match run(ledger, pid, action, now, rng) {
        Ok(message) => {
            ledger.set_toast(pid, message.clone());
            ActionOutcome::applied(message)
        }
        Err(rejection) => {
            tracing::debug!(
                participant = %pid,
                action = action.name(),
                %rejection,
                "Action rejected"
            );
            ActionOutcome::rejected(rejection.to_string())
        }
    }
}

fn run<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    pid: ParticipantId,
    action: &Action,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<String, Rejection> {
    let participant = ledger
        .participant_mut(pid)
        .ok_or(Rejection::UnknownParticipant)?;
    budget::roll(participant, now);
    let high_impact = action.is_high_impact();
    if high_impact {
        budget::ensure_available(participant)?;
    }

    let before = Holdings::capture(ledger);
    let message = handlers::dispatch(ledger, Turn { pid, now }, action, rng)?;
    let after = Holdings::capture(ledger);
    if let Err(anomaly) = conservation::verify(before, after, audit_for(action)) {
        tracing::error!(
            participant = %pid,
            action = action.name(),
            %anomaly,
            "Conservation audit failed"
        );
    }

    if let Some(participant) = ledger.participant_mut(pid) {
        if high_impact {
            participant.spend_high_impact();
        }
        participant.last_action_at = Some(now);
    }
    tracing::info!(participant = %pid, action = action.name(), "Action applied");
    Ok(message)
}
