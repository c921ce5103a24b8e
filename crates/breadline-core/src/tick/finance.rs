//! Loan defaults and overdue obligations.

use chrono::{DateTime, Utc};
use tracing::info;

use breadline_ledger::{Ledger, rules};
use breadline_types::{EventKind, LoanStatus, ObligationStatus};

use super::TickSummary;

pub(super) fn step(ledger: &mut Ledger, now: DateTime<Utc>, summary: &mut TickSummary) {
    let tick = ledger.world.tick_count;
    lapse_offers(ledger, now, tick, summary);

    let defaulted: Vec<_> = ledger
        .loans
        .values_mut()
        .filter(|l| {
            l.status == LoanStatus::Active
                && l.outstanding > 0
                && l.due_tick.is_some_and(|due| tick >= due)
        })
        .map(|l| {
            l.status = LoanStatus::Defaulted;
            (l.id, l.lender, l.borrower, l.outstanding)
        })
        .collect();
    for &(id, lender, borrower, outstanding) in &defaulted {
        if let Some(p) = ledger.participant_mut(borrower) {
            p.adjust_reputation(rules::DEFAULT_BORROWER_REPUTATION);
            p.adjust_heat(rules::DEFAULT_BORROWER_HEAT);
        }
        if let Some(p) = ledger.participant_mut(lender) {
            p.adjust_reputation(rules::DEFAULT_LENDER_REPUTATION);
        }
        ledger.policy.embargo_ticks = ledger.policy.embargo_ticks.max(rules::DEFAULT_EMBARGO_FLOOR);
        let borrower_name = ledger.name_of(borrower);
        ledger.notify(
            now,
            lender,
            EventKind::Finance,
            format!("{borrower_name} defaulted on loan {id}, still owing {outstanding} gold."),
        );
        ledger.notify(
            now,
            borrower,
            EventKind::Finance,
            format!("You defaulted on loan {id}. The harbor tightens its watch."),
        );
        info!(loan = %id, %borrower, outstanding, "Loan defaulted");
    }

    let overdue: Vec<_> = ledger
        .obligations
        .values_mut()
        .filter(|o| o.status == ObligationStatus::Open && tick >= o.due_tick)
        .map(|o| {
            o.status = ObligationStatus::Overdue;
            (o.id, o.creditor, o.debtor, o.amount)
        })
        .collect();
    for &(id, creditor, debtor, amount) in &overdue {
        if let Some(p) = ledger.participant_mut(debtor) {
            p.adjust_reputation(rules::OVERDUE_DEBTOR_REPUTATION);
            p.adjust_heat(rules::OVERDUE_DEBTOR_HEAT);
        }
        if let Some(p) = ledger.participant_mut(creditor) {
            p.adjust_reputation(rules::OVERDUE_CREDITOR_REPUTATION);
        }
        let debtor_name = ledger.name_of(debtor);
        ledger.notify(
            now,
            creditor,
            EventKind::Finance,
            format!("{debtor_name} is late on {amount} gold ({id})."),
        );
        ledger.notify(
            now,
            debtor,
            EventKind::Finance,
            format!("Your debt of {amount} gold ({id}) is overdue."),
        );
    }

    let failures = defaulted.len().saturating_add(overdue.len());
    summary.defaults = u32::try_from(defaulted.len()).unwrap_or(u32::MAX);
    summary.overdue = u32::try_from(overdue.len()).unwrap_or(u32::MAX);
    if failures > 0 {
        let count = i32::try_from(failures).unwrap_or(i32::MAX);
        ledger
            .world
            .adjust_unrest(count.saturating_mul(rules::UNREST_PER_FINANCIAL_FAILURE));
    }
}

/// Drop loan offers nobody answered in time. No gold has moved yet.
fn lapse_offers(ledger: &mut Ledger, now: DateTime<Utc>, tick: u64, summary: &mut TickSummary) {
    let lapsed: Vec<_> = ledger
        .loans
        .values()
        .filter(|l| l.status == LoanStatus::Offered && tick >= l.offer_expires_tick)
        .map(|l| (l.id, l.lender, l.principal))
        .collect();
    for &(id, lender, principal) in &lapsed {
        ledger.loans.remove(&id);
        ledger.notify(
            now,
            lender,
            EventKind::Finance,
            format!("Your offer of {principal} gold ({id}) went unanswered and lapsed."),
        );
    }
    summary.offers_lapsed = u32::try_from(lapsed.len()).unwrap_or(u32::MAX);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::{Loan, Obligation, ParticipantId};

    use super::*;

    #[test]
    fn overdue_is_marked_once() {
        let mut ledger = Ledger::new();
        let (creditor, debtor) = (ParticipantId::new(), ParticipantId::new());
        ledger.register_participant(creditor, Utc::now(), &mut SmallRng::seed_from_u64(1));
        ledger.register_participant(debtor, Utc::now(), &mut SmallRng::seed_from_u64(2));
        let id = ledger.counters.obligation();
        ledger.obligations.insert(
            id,
            Obligation {
                id,
                creditor,
                debtor,
                amount: 9,
                note: "two sacks".into(),
                due_tick: 2,
                status: ObligationStatus::Open,
            },
        );
        ledger.world.tick_count = 2;
        let unrest = ledger.world.unrest();
        let mut first = TickSummary::default();
        step(&mut ledger, Utc::now(), &mut first);
        let mut second = TickSummary::default();
        step(&mut ledger, Utc::now(), &mut second);
        assert_eq!((first.overdue, second.overdue), (1, 0));
        assert_eq!(ledger.obligations[&id].status, ObligationStatus::Overdue);
        assert_eq!(ledger.participant(debtor).unwrap().reputation(), -3);
        assert_eq!(ledger.participant(creditor).unwrap().reputation(), 1);
        assert_eq!(ledger.world.unrest(), unrest.saturating_add(2));
    }

    #[test]
    fn unanswered_offer_lapses_without_penalty() {
        let mut ledger = Ledger::new();
        let (lender, borrower) = (ParticipantId::new(), ParticipantId::new());
        ledger.register_participant(lender, Utc::now(), &mut SmallRng::seed_from_u64(1));
        ledger.register_participant(borrower, Utc::now(), &mut SmallRng::seed_from_u64(2));
        let id = ledger.counters.loan();
        ledger.loans.insert(
            id,
            Loan {
                id,
                lender,
                borrower,
                principal: 20,
                outstanding: 22,
                interest_pct: 10,
                term_ticks: 4,
                due_tick: None,
                offer_expires_tick: 12,
                status: LoanStatus::Offered,
            },
        );
        let unrest = ledger.world.unrest();

        ledger.world.tick_count = 11;
        let mut early = TickSummary::default();
        step(&mut ledger, Utc::now(), &mut early);
        assert_eq!(early.offers_lapsed, 0);
        assert!(ledger.loans.contains_key(&id));

        ledger.world.tick_count = 12;
        let mut due = TickSummary::default();
        step(&mut ledger, Utc::now(), &mut due);
        assert_eq!(due.offers_lapsed, 1);
        assert!(ledger.loans.is_empty());
        assert_eq!(ledger.participant(lender).unwrap().reputation(), 0);
        assert_eq!(ledger.world.unrest(), unrest);
    }
}
