//! Participant lifecycle and ledger pruning.
//!
//! Participants are never deleted. A long absence first makes them
//! Dormant, which frees their contract slot and keeps them off the ballot.
//! A much longer absence retires them: their purse, intel, and debts are
//! scrubbed but the name stays behind as a tombstone so old log lines still
//! read correctly. Any contact brings either kind back.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use breadline_ledger::{Ledger, rules};
use breadline_types::{
    ContractStatus, ContractTerms, EventKind, LoanStatus, ParticipantId, SeatHolder, Standing,
};

use crate::clock::elapsed_secs;
use crate::config::HousekeepingConfig;

/// Terminal records older than this many ticks are dropped.
pub const PRUNE_AFTER_TICKS: u64 = 48;

const SECS_PER_DAY: u64 = 86_400;

/// What a sweep changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HousekeepingReport {
    /// Participants who went Dormant.
    pub dormant: Vec<ParticipantId>,
    /// Participants who were retired.
    pub retired: Vec<ParticipantId>,
    /// Terminal contracts, loans, and obligations removed.
    pub pruned: usize,
}

/// Record a request from `pid`, creating or reviving the participant.
///
/// Returns `true` when the participant was created or revived from
/// retirement.
pub fn contact<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    pid: ParticipantId,
    now: DateTime<Utc>,
    rng: &mut R,
) -> bool {
    let fresh = match ledger.participant(pid).map(|p| p.standing) {
        None => {
            ledger.register_participant(pid, now, rng);
            true
        }
        Some(Standing::Retired) => {
            if let Some(p) = ledger.participant_mut(pid) {
                p.reset_resources(
                    rules::STARTING_GOLD,
                    rules::STARTING_GRAIN,
                    rules::STARTING_RUMOR_TOKENS,
                );
                p.standing = Standing::Active;
            }
            let name = ledger.name_of(pid);
            ledger.announce(now, EventKind::World, format!("{name} returns to the city."));
            info!(participant = %pid, "Retired participant returned");
            true
        }
        Some(_) => false,
    };
    if let Some(p) = ledger.participant_mut(pid) {
        p.touch(now);
        p.roll_daily(now.date_naive());
    }
    fresh
}

/// Retire absent participants and drop stale terminal records.
pub fn sweep(
    ledger: &mut Ledger,
    now: DateTime<Utc>,
    config: &HousekeepingConfig,
) -> HousekeepingReport {
    let soft = days_to_secs(config.soft_retire_days);
    let hard = days_to_secs(config.hard_retire_days);
    let mut report = HousekeepingReport::default();

    let absent: Vec<(ParticipantId, Standing, u64)> = ledger
        .participants
        .values()
        .filter(|p| p.standing != Standing::Retired)
        .map(|p| (p.id, p.standing, elapsed_secs(p.last_seen, now)))
        .collect();

    for (pid, standing, idle) in absent {
        if idle >= hard {
            retire(ledger, pid);
            report.retired.push(pid);
        } else if idle >= soft && standing == Standing::Active {
            make_dormant(ledger, pid);
            report.dormant.push(pid);
        }
    }

    report.pruned = prune(ledger);
    info!(
        dormant = report.dormant.len(),
        retired = report.retired.len(),
        pruned = report.pruned,
        "Housekeeping complete"
    );
    report
}

fn days_to_secs(days: i64) -> u64 {
    u64::try_from(days.max(0))
        .unwrap_or(0)
        .saturating_mul(SECS_PER_DAY)
}

/// Hand back every contract `pid` is holding.
fn release_contracts(ledger: &mut Ledger, pid: ParticipantId) {
    for contract in ledger.contracts.values_mut() {
        if !contract.is_owned_by(pid) {
            continue;
        }
        match contract.status {
            ContractStatus::Accepted => {
                contract.status = ContractStatus::Issued;
                contract.owner = None;
                contract.stance = None;
                contract.accepted_at = None;
            }
            ContractStatus::Fulfilled => contract.owner = None,
            _ => {}
        }
    }
}

fn make_dormant(ledger: &mut Ledger, pid: ParticipantId) {
    if let Some(p) = ledger.participant_mut(pid) {
        p.standing = Standing::Dormant;
    }
    release_contracts(ledger, pid);
    info!(participant = %pid, "Participant went dormant");
}

fn retire(ledger: &mut Ledger, pid: ParticipantId) {
    release_contracts(ledger, pid);
    if let Some(p) = ledger.participant_mut(pid) {
        p.reset_resources(0, 0, 0);
        p.standing = Standing::Retired;
    }

    ledger.rumors.retain(|_, r| r.source != pid && r.target != pid);
    ledger.evidence.retain(|_, e| e.owner != pid && e.target != pid);
    ledger.scry_reports.retain(|_, s| s.owner != pid && s.target != pid);
    ledger.intercepts.retain(|_, i| i.owner != pid && i.target != pid);
    ledger.loans.retain(|_, l| l.lender != pid && l.borrower != pid);
    ledger
        .obligations
        .retain(|_, o| o.creditor != pid && o.debtor != pid);
    ledger.projects.retain(|_, p| p.owner != pid);

    let mut forfeited: u32 = 0;
    for contract in ledger.contracts.values_mut() {
        if contract.issuer != Some(pid) || contract.status.is_terminal() {
            continue;
        }
        if let ContractTerms::Supply(mut terms) = contract.terms {
            forfeited = forfeited.saturating_add(terms.escrow);
            terms.escrow = 0;
            contract.terms = ContractTerms::Supply(terms);
            contract.status = ContractStatus::Cancelled;
        }
    }
    ledger.credit_treasury(forfeited);

    for seat in ledger.seats.values_mut() {
        if seat.is_held_by(pid) {
            seat.holder = SeatHolder::Npc;
        }
    }
    info!(participant = %pid, forfeited, "Participant retired");
}

fn prune(ledger: &mut Ledger) -> usize {
    let horizon = ledger.world.tick_count.saturating_sub(PRUNE_AFTER_TICKS);
    let before = ledger
        .contracts
        .len()
        .saturating_add(ledger.loans.len())
        .saturating_add(ledger.obligations.len());

    ledger
        .contracts
        .retain(|_, c| !(c.status.is_terminal() && c.issued_tick < horizon));
    ledger.loans.retain(|_, l| {
        let closed = matches!(l.status, LoanStatus::Repaid | LoanStatus::Defaulted);
        !(closed && l.due_tick.unwrap_or(0) < horizon)
    });
    ledger
        .obligations
        .retain(|_, o| o.status.is_outstanding() || o.due_tick >= horizon);

    let after = ledger
        .contracts
        .len()
        .saturating_add(ledger.loans.len())
        .saturating_add(ledger.obligations.len());
    before.saturating_sub(after)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::{Contract, ContractId, SeatKind, Stance, SupplyTerms};

    use super::*;

    fn days_ago(days: i64) -> DateTime<Utc> {
        Utc::now()
            .checked_sub_signed(TimeDelta::try_days(days).unwrap())
            .unwrap()
    }

    fn join(ledger: &mut Ledger, seed: u64) -> ParticipantId {
        let pid = ParticipantId::new();
        contact(ledger, pid, Utc::now(), &mut SmallRng::seed_from_u64(seed));
        pid
    }

    fn supply(ledger: &mut Ledger, issuer: ParticipantId, escrow: u32) -> ContractId {
        let id = ledger.counters.contract();
        ledger.contracts.insert(
            id,
            Contract {
                id,
                terms: ContractTerms::Supply(SupplyTerms {
                    supplier: None,
                    sacks: 3,
                    escrow,
                }),
                status: ContractStatus::Issued,
                deadline_ticks: 10,
                owner: None,
                issuer: Some(issuer),
                stance: None,
                grain_reward: 0,
                base_reward: escrow,
                issued_tick: ledger.world.tick_count,
                accepted_at: None,
                title: "a supply order".to_owned(),
            },
        );
        id
    }

    #[test]
    fn first_contact_registers_once() {
        let mut ledger = Ledger::new();
        let pid = ParticipantId::new();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(contact(&mut ledger, pid, Utc::now(), &mut rng));
        assert!(!contact(&mut ledger, pid, Utc::now(), &mut rng));
        assert_eq!(ledger.participants.len(), 1);
    }

    #[test]
    fn absence_makes_dormant_and_frees_contract() {
        let mut ledger = Ledger::new();
        let pid = join(&mut ledger, 2);
        let id = supply(&mut ledger, ParticipantId::new(), 5);
        let contract = ledger.contracts.get_mut(&id).unwrap();
        contract.status = ContractStatus::Accepted;
        contract.owner = Some(pid);
        contract.stance = Some(Stance::Quiet);
        ledger.participant_mut(pid).unwrap().last_seen = days_ago(20);

        let report = sweep(&mut ledger, Utc::now(), &HousekeepingConfig::default());
        assert_eq!(report.dormant, vec![pid]);
        assert_eq!(ledger.participant(pid).unwrap().standing, Standing::Dormant);
        assert_eq!(ledger.contracts[&id].status, ContractStatus::Issued);
        assert!(ledger.candidates().all(|p| p.id != pid));

        contact(&mut ledger, pid, Utc::now(), &mut SmallRng::seed_from_u64(3));
        assert_eq!(ledger.participant(pid).unwrap().standing, Standing::Active);
    }

    #[test]
    fn long_absence_retires_and_scrubs() {
        let mut ledger = Ledger::new();
        let pid = join(&mut ledger, 4);
        let name = ledger.name_of(pid);
        let order = supply(&mut ledger, pid, 12);
        ledger.seats.get_mut(&SeatKind::Treasurer).unwrap().holder = SeatHolder::Participant(pid);
        ledger.participant_mut(pid).unwrap().last_seen = days_ago(90);
        let treasury = ledger.policy.treasury;

        let report = sweep(&mut ledger, Utc::now(), &HousekeepingConfig::default());
        assert_eq!(report.retired, vec![pid]);
        let p = ledger.participant(pid).unwrap();
        assert_eq!(p.standing, Standing::Retired);
        assert_eq!((p.gold(), p.grain()), (0, 0));
        assert_eq!(p.name, name);
        assert_eq!(ledger.contracts[&order].status, ContractStatus::Cancelled);
        assert_eq!(ledger.policy.treasury, treasury.saturating_add(12));
        assert_eq!(ledger.seats[&SeatKind::Treasurer].holder, SeatHolder::Npc);

        assert!(contact(&mut ledger, pid, Utc::now(), &mut SmallRng::seed_from_u64(5)));
        let p = ledger.participant(pid).unwrap();
        assert_eq!(p.standing, Standing::Active);
        assert_eq!(p.gold(), rules::STARTING_GOLD);
    }

    #[test]
    fn stale_terminal_contracts_are_pruned() {
        let mut ledger = Ledger::new();
        let issuer = join(&mut ledger, 6);
        let old = supply(&mut ledger, issuer, 0);
        ledger.contracts.get_mut(&old).unwrap().status = ContractStatus::Completed;
        ledger.world.tick_count = 100;
        let fresh = supply(&mut ledger, issuer, 0);
        ledger.contracts.get_mut(&fresh).unwrap().status = ContractStatus::Completed;

        let report = sweep(&mut ledger, Utc::now(), &HousekeepingConfig::default());
        assert_eq!(report.pruned, 1);
        assert!(!ledger.contracts.contains_key(&old));
        assert!(ledger.contracts.contains_key(&fresh));
    }
}
