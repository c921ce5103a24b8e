//! Contract resolution and faction issuance.
//!
//! Ordinary contracts (Emergency and Smuggling) are worked by the city
//! itself: every tick they roll a fulfilment chance that depends on the
//! grain tier. Bounty and Supply contracts only ever resolve through a
//! participant's delivery, so the tick merely runs their deadline down.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info};

use breadline_ledger::{Ledger, rules};
use breadline_types::{
    BountyTerms, Contract, ContractId, ContractKind, ContractStatus, ContractTerms, EventKind,
    GrainTier, ParticipantId, Standing, UnrestTier,
};

use super::TickSummary;

/// Resolve every non-terminal contract in id order.
pub(super) fn resolve<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    now: DateTime<Utc>,
    rng: &mut R,
    summary: &mut TickSummary,
) {
    let ids: Vec<ContractId> = ledger
        .contracts
        .values()
        .filter(|c| !c.status.is_terminal())
        .map(|c| c.id)
        .collect();

    for id in ids {
        let Some(terms) = ledger.contracts.get(&id).map(|c| c.terms) else {
            continue;
        };
        match terms {
            ContractTerms::Bounty(bounty) => {
                if count_down(ledger, id) {
                    expire_bounty(ledger, now, id, bounty);
                    summary.contracts_failed = summary.contracts_failed.saturating_add(1);
                }
            }
            ContractTerms::Supply(_) => {
                if count_down(ledger, id) {
                    expire_supply(ledger, now, id);
                    summary.contracts_failed = summary.contracts_failed.saturating_add(1);
                }
            }
            ContractTerms::Emergency | ContractTerms::Smuggling => {
                resolve_ordinary(ledger, now, rng, id, summary);
            }
        }
    }
}

/// Decrement a contract's deadline; true once it has run out.
fn count_down(ledger: &mut Ledger, id: ContractId) -> bool {
    let Some(contract) = ledger.contracts.get_mut(&id) else {
        return false;
    };
    contract.deadline_ticks = contract.deadline_ticks.saturating_sub(1);
    contract.deadline_ticks == 0
}

fn expire_bounty(ledger: &mut Ledger, now: DateTime<Utc>, id: ContractId, terms: BountyTerms) {
    let Some(contract) = ledger.contracts.get_mut(&id) else {
        return;
    };
    let hunter = (contract.status == ContractStatus::Accepted)
        .then_some(contract.owner)
        .flatten();
    contract.status = ContractStatus::Failed;
    let title = contract.title.clone();

    if let Some(hunter) = hunter {
        if let Some(p) = ledger.participant_mut(hunter) {
            p.adjust_reputation(rules::BOUNTY_EXPIRY_HUNTER_REPUTATION);
        }
        ledger.notify(
            now,
            hunter,
            EventKind::Contract,
            format!("You let {title} lapse."),
        );
    }
    if let Some(target) = ledger.participant_mut(terms.target) {
        target.adjust_heat(rules::BOUNTY_EXPIRY_TARGET_HEAT);
    }
    ledger.announce(now, EventKind::Contract, format!("{title} has expired."));
    debug!(contract = %id, "Bounty expired");
}

fn expire_supply(ledger: &mut Ledger, now: DateTime<Utc>, id: ContractId) {
    let Some(contract) = ledger.contracts.get_mut(&id) else {
        return;
    };
    let ContractTerms::Supply(mut terms) = contract.terms else {
        return;
    };
    let acceptor = (contract.status == ContractStatus::Accepted)
        .then_some(contract.owner)
        .flatten();
    let escrow = terms.escrow;
    terms.escrow = 0;
    contract.terms = ContractTerms::Supply(terms);
    contract.status = ContractStatus::Failed;
    let issuer = contract.issuer;
    let title = contract.title.clone();

    let refund = escrow.saturating_mul(rules::SUPPLY_REFUND_PCT) / 100;
    let forfeit = escrow.saturating_sub(refund);
    match issuer.and_then(|pid| ledger.participant_mut(pid)) {
        Some(p) => p.credit_gold(refund),
        None => ledger.credit_treasury(refund),
    }
    ledger.credit_treasury(forfeit);

    if let Some(acceptor) = acceptor {
        if let Some(p) = ledger.participant_mut(acceptor) {
            p.adjust_reputation(rules::SUPPLY_EXPIRY_REPUTATION);
        }
        ledger.notify(
            now,
            acceptor,
            EventKind::Contract,
            format!("{title} expired before you delivered."),
        );
    }
    if let Some(issuer) = issuer {
        ledger.notify(
            now,
            issuer,
            EventKind::Contract,
            format!("{title} expired. {refund} gold comes back to you."),
        );
    }
    debug!(contract = %id, refund, forfeit, "Supply order expired");
}

fn resolve_ordinary<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    now: DateTime<Utc>,
    rng: &mut R,
    id: ContractId,
    summary: &mut TickSummary,
) {
    let Some(contract) = ledger.contracts.get(&id) else {
        return;
    };
    let status = contract.status;
    let owner = contract.owner;

    if status == ContractStatus::Fulfilled {
        if owner.is_none() {
            complete_unowned(ledger, id);
        }
        return;
    }

    if status == ContractStatus::Accepted && owner_gone(ledger, owner, now) {
        if contract.deadline_ticks >= rules::RECLAIM_MIN_DEADLINE {
            reclaim(ledger, now, id, owner);
            summary.contracts_reclaimed = summary.contracts_reclaimed.saturating_add(1);
        } else {
            fail_ordinary(ledger, now, id);
            summary.contracts_failed = summary.contracts_failed.saturating_add(1);
            return;
        }
    }

    let Some(contract) = ledger.contracts.get(&id) else {
        return;
    };
    let mut chance = rules::fulfil_chance_pct(ledger.world.grain_tier());
    if contract.status == ContractStatus::Accepted {
        chance = chance.saturating_add(rules::ACCEPTED_FULFIL_BONUS_PCT);
    }

    if rng.random_range(0..100_u32) < chance {
        fulfil(ledger, now, id);
        summary.contracts_fulfilled = summary.contracts_fulfilled.saturating_add(1);
    } else if count_down(ledger, id) {
        fail_ordinary(ledger, now, id);
        summary.contracts_failed = summary.contracts_failed.saturating_add(1);
    }
}

fn owner_gone(ledger: &Ledger, owner: Option<ParticipantId>, now: DateTime<Utc>) -> bool {
    owner
        .and_then(|pid| ledger.participant(pid))
        .is_none_or(|p| !p.is_online(now, rules::CONTRACT_INACTIVITY_SECS))
}

fn reclaim(ledger: &mut Ledger, now: DateTime<Utc>, id: ContractId, owner: Option<ParticipantId>) {
    let Some(contract) = ledger.contracts.get_mut(&id) else {
        return;
    };
    contract.status = ContractStatus::Issued;
    contract.owner = None;
    contract.stance = None;
    contract.accepted_at = None;
    let title = contract.title.clone();
    if let Some(owner) = owner {
        ledger.notify(
            now,
            owner,
            EventKind::Contract,
            format!("You went quiet, so {title} went back on the board."),
        );
    }
    debug!(contract = %id, "Contract reclaimed");
}

fn fail_ordinary(ledger: &mut Ledger, now: DateTime<Utc>, id: ContractId) {
    let Some(contract) = ledger.contracts.get_mut(&id) else {
        return;
    };
    contract.status = ContractStatus::Failed;
    let owner = contract.owner;
    let title = contract.title.clone();
    if let Some(owner) = owner {
        if let Some(p) = ledger.participant_mut(owner) {
            p.adjust_reputation(rules::CONTRACT_FAILURE_REPUTATION);
        }
        ledger.notify(
            now,
            owner,
            EventKind::Contract,
            format!("{title} failed. Your name suffers for it."),
        );
    }
    ledger.announce(now, EventKind::Contract, format!("{title} has failed."));
}

fn fulfil(ledger: &mut Ledger, now: DateTime<Utc>, id: ContractId) {
    let Some(contract) = ledger.contracts.get_mut(&id) else {
        return;
    };
    contract.status = ContractStatus::Fulfilled;
    let grain = contract.grain_reward;
    let owner = contract.owner;
    let title = contract.title.clone();
    ledger.world.add_grain(grain);

    match owner {
        Some(owner) => ledger.notify(
            now,
            owner,
            EventKind::Contract,
            format!("{title} is done. Deliver it to collect your pay."),
        ),
        None => complete_unowned(ledger, id),
    }
    ledger.announce(
        now,
        EventKind::Contract,
        format!("{title} brings {grain} sacks into the stores."),
    );
}

fn complete_unowned(ledger: &mut Ledger, id: ContractId) {
    if let Some(contract) = ledger.contracts.get_mut(&id) {
        contract.status = ContractStatus::Completed;
    }
}

/// Post standing faction contracts and bounties for the current state.
pub(super) fn issue_standing(ledger: &mut Ledger, now: DateTime<Utc>, summary: &mut TickSummary) {
    let grain = ledger.world.grain_tier();
    let unrest = ledger.world.unrest_tier();

    if (unrest >= UnrestTier::Unstable || grain == GrainTier::Critical)
        && !ledger.has_active_contract(ContractKind::Emergency)
    {
        post(
            ledger,
            now,
            Draft {
                terms: ContractTerms::Emergency,
                deadline_ticks: rules::EMERGENCY_DEADLINE,
                grain_reward: rules::EMERGENCY_GRAIN_REWARD,
                base_reward: rules::EMERGENCY_GOLD,
                title: "an emergency relief run".to_owned(),
            },
        );
        summary.contracts_issued = summary.contracts_issued.saturating_add(1);
    }

    if unrest == UnrestTier::Rioting {
        ledger.world.market_restriction_ticks = ledger
            .world
            .market_restriction_ticks
            .max(rules::RIOT_RESTRICTION_TICKS);
    }

    if grain >= GrainTier::Scarce && !ledger.has_active_contract(ContractKind::Smuggling) {
        post(
            ledger,
            now,
            Draft {
                terms: ContractTerms::Smuggling,
                deadline_ticks: rules::SMUGGLING_DEADLINE,
                grain_reward: rules::SMUGGLING_GRAIN_REWARD,
                base_reward: rules::SMUGGLING_GOLD,
                title: "a grain run past the harbor watch".to_owned(),
            },
        );
        summary.contracts_issued = summary.contracts_issued.saturating_add(1);
    }

    let wanted: Vec<(ParticipantId, u32, String)> = ledger
        .participants
        .values()
        .filter(|p| {
            p.standing == Standing::Active
                && p.heat() >= rules::BOUNTY_HEAT_THRESHOLD
                && p.is_online(now, rules::CONTRACT_INACTIVITY_SECS)
        })
        .map(|p| (p.id, p.heat(), p.name.clone()))
        .collect();

    for (target, heat, name) in wanted {
        if ledger.has_open_bounty_on(target) {
            continue;
        }
        let reward = rules::bounty_reward(heat);
        post(
            ledger,
            now,
            Draft {
                terms: ContractTerms::Bounty(BountyTerms {
                    target,
                    reward,
                    evidence_required: rules::bounty_evidence_required(heat),
                }),
                deadline_ticks: rules::BOUNTY_DEADLINE,
                grain_reward: 0,
                base_reward: reward,
                title: format!("a bounty on {name}"),
            },
        );
        ledger.notify(
            now,
            target,
            EventKind::Contract,
            "The watch has put a price on your head.",
        );
        summary.contracts_issued = summary.contracts_issued.saturating_add(1);
    }
}

/// Fields of a contract posted by the faction.
struct Draft {
    terms: ContractTerms,
    deadline_ticks: u32,
    grain_reward: u32,
    base_reward: u32,
    title: String,
}

fn post(ledger: &mut Ledger, now: DateTime<Utc>, draft: Draft) -> ContractId {
    let id = ledger.counters.contract();
    let kind = draft.terms.kind();
    ledger.announce(
        now,
        EventKind::Contract,
        format!("Posted on the board: {}.", draft.title),
    );
    ledger.contracts.insert(
        id,
        Contract {
            id,
            terms: draft.terms,
            status: ContractStatus::Issued,
            deadline_ticks: draft.deadline_ticks,
            owner: None,
            issuer: None,
            stance: None,
            grain_reward: draft.grain_reward,
            base_reward: draft.base_reward,
            issued_tick: ledger.world.tick_count,
            accepted_at: None,
            title: draft.title,
        },
    );
    info!(contract = %id, ?kind, "Contract issued");
    id
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::{Stance, SupplyTerms};

    use super::*;

    fn join(ledger: &mut Ledger, seed: u64) -> ParticipantId {
        let pid = ParticipantId::new();
        ledger.register_participant(pid, Utc::now(), &mut SmallRng::seed_from_u64(seed));
        pid
    }

    fn ordinary(ledger: &mut Ledger, deadline_ticks: u32) -> ContractId {
        post(
            ledger,
            Utc::now(),
            Draft {
                terms: ContractTerms::Emergency,
                deadline_ticks,
                grain_reward: 12,
                base_reward: 14,
                title: "a relief run".to_owned(),
            },
        )
    }

    fn take(ledger: &mut Ledger, id: ContractId, pid: ParticipantId) {
        let contract = ledger.contracts.get_mut(&id).unwrap();
        contract.status = ContractStatus::Accepted;
        contract.owner = Some(pid);
        contract.stance = Some(Stance::Careful);
    }

    fn go_quiet(ledger: &mut Ledger, pid: ParticipantId) {
        let p = ledger.participant_mut(pid).unwrap();
        p.last_seen = Utc::now()
            .checked_sub_signed(TimeDelta::try_minutes(30).unwrap())
            .unwrap();
    }

    #[test]
    fn emergency_posted_once_under_famine() {
        let mut ledger = Ledger::new();
        ledger.world.set_grain_supply(10);
        let mut summary = TickSummary::default();
        issue_standing(&mut ledger, Utc::now(), &mut summary);
        issue_standing(&mut ledger, Utc::now(), &mut summary);
        assert!(ledger.has_active_contract(ContractKind::Emergency));
        assert!(ledger.has_active_contract(ContractKind::Smuggling));
        assert_eq!(summary.contracts_issued, 2);
    }

    #[test]
    fn rioting_restricts_market() {
        let mut ledger = Ledger::new();
        ledger.world.set_unrest(90);
        issue_standing(&mut ledger, Utc::now(), &mut TickSummary::default());
        assert_eq!(
            ledger.world.market_restriction_ticks,
            rules::RIOT_RESTRICTION_TICKS
        );
    }

    #[test]
    fn wanted_participant_gets_one_bounty() {
        let mut ledger = Ledger::new();
        let pid = join(&mut ledger, 1);
        ledger.participant_mut(pid).unwrap().adjust_heat(12);
        let mut summary = TickSummary::default();
        issue_standing(&mut ledger, Utc::now(), &mut summary);
        issue_standing(&mut ledger, Utc::now(), &mut summary);
        let bounties: Vec<&Contract> = ledger
            .contracts
            .values()
            .filter(|c| c.bounty_target() == Some(pid))
            .collect();
        assert_eq!(bounties.len(), 1);
        assert_eq!(bounties.first().unwrap().base_reward, 42);
    }

    #[test]
    fn quiet_participant_escapes_bounty() {
        let mut ledger = Ledger::new();
        let pid = join(&mut ledger, 2);
        ledger.participant_mut(pid).unwrap().adjust_heat(12);
        go_quiet(&mut ledger, pid);
        issue_standing(&mut ledger, Utc::now(), &mut TickSummary::default());
        assert!(!ledger.has_open_bounty_on(pid));
    }

    #[test]
    fn inactive_owner_loses_contract() {
        let mut ledger = Ledger::new();
        let pid = join(&mut ledger, 3);
        let id = ordinary(&mut ledger, 6);
        take(&mut ledger, id, pid);
        go_quiet(&mut ledger, pid);
        let mut summary = TickSummary::default();
        resolve(&mut ledger, Utc::now(), &mut SmallRng::seed_from_u64(5), &mut summary);
        assert_eq!(summary.contracts_reclaimed, 1);
        let contract = &ledger.contracts[&id];
        assert_ne!(contract.owner, Some(pid));
        assert_ne!(contract.status, ContractStatus::Accepted);
    }

    #[test]
    fn inactive_owner_near_deadline_fails() {
        let mut ledger = Ledger::new();
        let pid = join(&mut ledger, 4);
        let id = ordinary(&mut ledger, 1);
        take(&mut ledger, id, pid);
        go_quiet(&mut ledger, pid);
        let mut summary = TickSummary::default();
        resolve(&mut ledger, Utc::now(), &mut SmallRng::seed_from_u64(5), &mut summary);
        assert_eq!(ledger.contracts[&id].status, ContractStatus::Failed);
        assert_eq!(ledger.participant(pid).unwrap().reputation(), -3);
        assert_eq!(summary.contracts_failed, 1);
    }

    #[test]
    fn unowned_contracts_resolve_by_roll() {
        let mut ledger = Ledger::new();
        let mut rng = SmallRng::seed_from_u64(8);
        let ids: Vec<ContractId> = (0..20).map(|_| ordinary(&mut ledger, 6)).collect();
        let mut summary = TickSummary::default();
        for _ in 0..6 {
            resolve(&mut ledger, Utc::now(), &mut rng, &mut summary);
        }
        for id in ids {
            let status = ledger.contracts[&id].status;
            assert!(matches!(
                status,
                ContractStatus::Completed | ContractStatus::Failed
            ));
        }
        assert_eq!(
            summary.contracts_fulfilled.saturating_add(summary.contracts_failed),
            20
        );
    }

    #[test]
    fn expired_supply_refunds_issuer() {
        let mut ledger = Ledger::new();
        let issuer = join(&mut ledger, 6);
        let id = ledger.counters.contract();
        ledger.contracts.insert(
            id,
            Contract {
                id,
                terms: ContractTerms::Supply(SupplyTerms {
                    supplier: None,
                    sacks: 5,
                    escrow: 10,
                }),
                status: ContractStatus::Issued,
                deadline_ticks: 1,
                owner: None,
                issuer: Some(issuer),
                stance: None,
                grain_reward: 0,
                base_reward: 10,
                issued_tick: 0,
                accepted_at: None,
                title: "a supply order".to_owned(),
            },
        );
        let gold = ledger.participant(issuer).unwrap().gold();
        let treasury = ledger.policy.treasury;
        resolve(
            &mut ledger,
            Utc::now(),
            &mut SmallRng::seed_from_u64(1),
            &mut TickSummary::default(),
        );
        assert_eq!(ledger.contracts[&id].status, ContractStatus::Failed);
        assert_eq!(ledger.participant(issuer).unwrap().gold(), gold.saturating_add(8));
        assert_eq!(ledger.policy.treasury, treasury.saturating_add(2));
        assert_eq!(ledger.escrowed_gold(), 0);
    }

    #[test]
    fn expired_bounty_cools_target() {
        let mut ledger = Ledger::new();
        let target = join(&mut ledger, 7);
        let hunter = join(&mut ledger, 8);
        ledger.participant_mut(target).unwrap().adjust_heat(12);
        issue_standing(&mut ledger, Utc::now(), &mut TickSummary::default());
        let id = ledger
            .contracts
            .values()
            .find(|c| c.bounty_target() == Some(target))
            .unwrap()
            .id;
        take(&mut ledger, id, hunter);
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..rules::BOUNTY_DEADLINE {
            resolve(&mut ledger, Utc::now(), &mut rng, &mut TickSummary::default());
        }
        assert_eq!(ledger.contracts[&id].status, ContractStatus::Failed);
        assert_eq!(ledger.participant(target).unwrap().heat(), 10);
        assert_eq!(ledger.participant(hunter).unwrap().reputation(), -1);
    }
}
