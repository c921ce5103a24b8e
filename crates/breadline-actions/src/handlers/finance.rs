//! Loans and obligations between participants.
//!
//! Gold only moves when a loan is accepted, when it is repaid, and when an
//! obligation is settled. Defaults and overdue marks are applied by the
//! tick, not here.

use breadline_ledger::{Ledger, rules};
use breadline_types::{
    EventKind, Loan, LoanId, LoanStatus, Obligation, ObligationId, ObligationStatus,
    ParticipantId,
};

use super::Turn;
use crate::error::Rejection;
use crate::validation;

/// Terms of a loan offer, as proposed by the lender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanTerms {
    /// Who would receive the gold.
    pub borrower: ParticipantId,
    /// Gold disbursed on acceptance.
    pub principal: u32,
    /// Flat interest added to the principal.
    pub interest_pct: u32,
    /// Ticks from acceptance until the loan is due.
    pub due_ticks: u32,
}

impl LoanTerms {
    /// Principal plus flat interest, floored.
    pub fn amount_owed(&self) -> u32 {
        let interest = u64::from(self.principal)
            .saturating_mul(u64::from(self.interest_pct))
            .checked_div(100)
            .unwrap_or(0);
        u32::try_from(u64::from(self.principal).saturating_add(interest)).unwrap_or(u32::MAX)
    }
}

/// Propose a loan. Nothing moves until the borrower accepts.
pub fn offer_loan(ledger: &mut Ledger, turn: Turn, terms: LoanTerms) -> Result<String, Rejection> {
    let lender = validation::actor(ledger, turn.pid)?;
    let borrower_name = validation::counterpart(ledger, turn.pid, terms.borrower)?
        .name
        .clone();
    validation::in_range(terms.principal, 1, rules::MAX_DEBT_AMOUNT, "Principal")?;
    validation::in_range(
        terms.interest_pct,
        0,
        rules::MAX_LOAN_INTEREST_PCT,
        "Interest",
    )?;
    validation::in_range(terms.due_ticks, 1, rules::MAX_DEBT_TERM_TICKS, "Term")?;
    validation::gold(lender, terms.principal)?;
    let open_offers = ledger
        .loans
        .values()
        .filter(|l| l.lender == turn.pid && l.status == LoanStatus::Offered)
        .count();
    if open_offers >= rules::MAX_OPEN_LOAN_OFFERS {
        return Err(Rejection::TooManyOffers {
            max: rules::MAX_OPEN_LOAN_OFFERS,
        });
    }
    let lender_name = lender.name.clone();
    let offer_expires_tick = ledger
        .world
        .tick_count
        .saturating_add(rules::LOAN_OFFER_TICKS);

    let id = ledger.counters.loan();
    ledger.loans.insert(
        id,
        Loan {
            id,
            lender: turn.pid,
            borrower: terms.borrower,
            principal: terms.principal,
            outstanding: terms.amount_owed(),
            interest_pct: terms.interest_pct,
            term_ticks: terms.due_ticks,
            due_tick: None,
            offer_expires_tick,
            status: LoanStatus::Offered,
        },
    );
    ledger.notify(
        turn.now,
        terms.borrower,
        EventKind::Finance,
        format!(
            "{lender_name} offers you {} gold at {}% interest.",
            terms.principal, terms.interest_pct
        ),
    );
    Ok(format!("Loan offered to {borrower_name}."))
}

fn offered_loan(ledger: &Ledger, id: LoanId) -> Result<Loan, Rejection> {
    let loan = *ledger
        .loans
        .get(&id)
        .ok_or(Rejection::NotFound { what: "loan" })?;
    if loan.status != LoanStatus::Offered {
        return Err(Rejection::AgreementClosed);
    }
    Ok(loan)
}

/// Take an offered loan. The principal moves from lender to borrower and
/// the due tick is fixed from now.
pub fn accept_loan(ledger: &mut Ledger, turn: Turn, id: LoanId) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    let loan = offered_loan(ledger, id)?;
    if loan.borrower != turn.pid {
        return Err(Rejection::NotYours);
    }
    let lender = ledger
        .participant(loan.lender)
        .ok_or(Rejection::NotFound { what: "lender" })?;
    if lender.gold() < loan.principal {
        return Err(Rejection::LenderShort);
    }
    let lender_name = lender.name.clone();

    ledger
        .participant_mut(loan.lender)
        .ok_or(Rejection::LenderShort)?
        .debit_gold(loan.principal)
        .map_err(|_shortfall| Rejection::LenderShort)?;
    ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?
        .credit_gold(loan.principal);
    let due_tick = ledger
        .world
        .tick_count
        .saturating_add(u64::from(loan.term_ticks));
    if let Some(entry) = ledger.loans.get_mut(&id) {
        entry.status = LoanStatus::Active;
        entry.due_tick = Some(due_tick);
    }
    let borrower_name = ledger.name_of(turn.pid);
    ledger.notify(
        turn.now,
        loan.lender,
        EventKind::Finance,
        format!("{borrower_name} accepted your loan of {} gold.", loan.principal),
    );
    tracing::info!(
        loan = %id,
        lender = %loan.lender,
        borrower = %turn.pid,
        due_tick,
        "Loan disbursed"
    );
    Ok(format!(
        "{lender_name} hands over {} gold. You owe {}.",
        loan.principal, loan.outstanding
    ))
}

/// Withdraw or refuse an offer. Either party may do this.
pub fn decline_loan(ledger: &mut Ledger, turn: Turn, id: LoanId) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    let loan = offered_loan(ledger, id)?;
    if loan.borrower != turn.pid && loan.lender != turn.pid {
        return Err(Rejection::NotYours);
    }
    ledger.loans.remove(&id);
    let other = if loan.borrower == turn.pid {
        loan.lender
    } else {
        loan.borrower
    };
    let name = ledger.name_of(turn.pid);
    ledger.notify(
        turn.now,
        other,
        EventKind::Finance,
        format!("{name} called off loan {id}."),
    );
    Ok("The loan offer is off the table.".to_owned())
}

/// Pay gold towards an active loan.
pub fn repay_loan(
    ledger: &mut Ledger,
    turn: Turn,
    id: LoanId,
    gold: u32,
) -> Result<String, Rejection> {
    let borrower = validation::actor(ledger, turn.pid)?;
    let loan = *ledger
        .loans
        .get(&id)
        .ok_or(Rejection::NotFound { what: "loan" })?;
    if loan.borrower != turn.pid {
        return Err(Rejection::NotYours);
    }
    if loan.status != LoanStatus::Active {
        return Err(Rejection::AgreementClosed);
    }
    if gold == 0 {
        return Err(Rejection::NothingOffered);
    }
    if gold > loan.outstanding {
        return Err(Rejection::Overpayment {
            owed: loan.outstanding,
        });
    }
    validation::gold(borrower, gold)?;

    ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?
        .debit_gold(gold)
        .map_err(Rejection::gold)?;
    if let Some(lender) = ledger.participant_mut(loan.lender) {
        lender.credit_gold(gold);
    } else {
        ledger.credit_treasury(gold);
    }
    let remaining = loan.outstanding.saturating_sub(gold);
    if let Some(entry) = ledger.loans.get_mut(&id) {
        entry.outstanding = remaining;
        if remaining == 0 {
            entry.status = LoanStatus::Repaid;
        }
    }
    let name = ledger.name_of(turn.pid);
    if remaining == 0 {
        ledger.notify(
            turn.now,
            loan.lender,
            EventKind::Finance,
            format!("{name} repaid loan {id} in full."),
        );
        return Ok("The loan is repaid in full.".to_owned());
    }
    ledger.notify(
        turn.now,
        loan.lender,
        EventKind::Finance,
        format!("{name} paid {gold} gold towards loan {id}."),
    );
    Ok(format!("You still owe {remaining} gold."))
}

/// Write down a debt someone owes the actor.
pub fn record_obligation(
    ledger: &mut Ledger,
    turn: Turn,
    debtor: ParticipantId,
    amount: u32,
    due_ticks: u32,
    note: &str,
) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    let debtor_name = validation::counterpart(ledger, turn.pid, debtor)?
        .name
        .clone();
    validation::in_range(amount, 1, rules::MAX_DEBT_AMOUNT, "Amount")?;
    validation::in_range(due_ticks, 1, rules::MAX_DEBT_TERM_TICKS, "Term")?;
    let note = validation::text(note, rules::OBLIGATION_NOTE_MAX_CHARS)?;

    let id = ledger.counters.obligation();
    let due_tick = ledger
        .world
        .tick_count
        .saturating_add(u64::from(due_ticks));
    ledger.obligations.insert(
        id,
        Obligation {
            id,
            creditor: turn.pid,
            debtor,
            amount,
            note: note.clone(),
            due_tick,
            status: ObligationStatus::Open,
        },
    );
    let creditor_name = ledger.name_of(turn.pid);
    ledger.notify(
        turn.now,
        debtor,
        EventKind::Finance,
        format!("{creditor_name} records that you owe {amount} gold: {note}"),
    );
    Ok(format!("{debtor_name} now owes you {amount} gold."))
}

fn outstanding_obligation(ledger: &Ledger, id: ObligationId) -> Result<Obligation, Rejection> {
    let obligation = ledger
        .obligations
        .get(&id)
        .ok_or(Rejection::NotFound { what: "obligation" })?;
    if !obligation.status.is_outstanding() {
        return Err(Rejection::AgreementClosed);
    }
    Ok(obligation.clone())
}

/// Pay an obligation in full. Overdue obligations can still be settled.
pub fn settle_obligation(
    ledger: &mut Ledger,
    turn: Turn,
    id: ObligationId,
) -> Result<String, Rejection> {
    let debtor = validation::actor(ledger, turn.pid)?;
    let obligation = outstanding_obligation(ledger, id)?;
    if obligation.debtor != turn.pid {
        return Err(Rejection::NotYours);
    }
    validation::gold(debtor, obligation.amount)?;

    let debtor = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    debtor
        .debit_gold(obligation.amount)
        .map_err(Rejection::gold)?;
    debtor.adjust_reputation(rules::SETTLE_REPUTATION);
    if let Some(creditor) = ledger.participant_mut(obligation.creditor) {
        creditor.credit_gold(obligation.amount);
    } else {
        ledger.credit_treasury(obligation.amount);
    }
    if let Some(entry) = ledger.obligations.get_mut(&id) {
        entry.status = ObligationStatus::Settled;
    }
    let name = ledger.name_of(turn.pid);
    ledger.notify(
        turn.now,
        obligation.creditor,
        EventKind::Finance,
        format!("{name} settled {} gold owed to you.", obligation.amount),
    );
    Ok("Debt settled. Your word is good.".to_owned())
}

/// Release a debtor. Only the creditor can forgive.
pub fn forgive_obligation(
    ledger: &mut Ledger,
    turn: Turn,
    id: ObligationId,
) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    let obligation = outstanding_obligation(ledger, id)?;
    if obligation.creditor != turn.pid {
        return Err(Rejection::NotYours);
    }
    if let Some(entry) = ledger.obligations.get_mut(&id) {
        entry.status = ObligationStatus::Forgiven;
    }
    let name = ledger.name_of(turn.pid);
    let debtor_name = ledger.name_of(obligation.debtor);
    ledger.notify(
        turn.now,
        obligation.debtor,
        EventKind::Finance,
        format!("{name} forgave the {} gold you owed.", obligation.amount),
    );
    Ok(format!("You release {debtor_name} from the debt."))
}
