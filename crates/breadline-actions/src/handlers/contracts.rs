//! Contract actions.
//!
//! Acceptance is exclusive twice over: a contract has at most one owner,
//! and a participant holds at most one Accepted contract. Both checks run
//! under the access serializer, so concurrent accepts of the same contract
//! resolve to exactly one winner and one "Taken by" rejection.

use rand::Rng;

use breadline_ledger::{Ledger, rules};
use breadline_types::{
    BountyTerms, Contract, ContractId, ContractKind, ContractStatus, ContractTerms, EventKind,
    ParticipantId, Stance, SupplyTerms,
};

use super::{Turn, roll_pct};
use crate::budget;
use crate::error::Rejection;
use crate::pricing;
use crate::validation;

fn find(ledger: &Ledger, id: ContractId) -> Result<&Contract, Rejection> {
    ledger
        .contracts
        .get(&id)
        .ok_or(Rejection::NotFound { what: "contract" })
}

fn find_mut(ledger: &mut Ledger, id: ContractId) -> Result<&mut Contract, Rejection> {
    ledger
        .contracts
        .get_mut(&id)
        .ok_or(Rejection::NotFound { what: "contract" })
}

// ---------------------------------------------------------------------------
// Accept / ignore / abandon
// ---------------------------------------------------------------------------

/// Take an Issued contract.
pub fn accept(
    ledger: &mut Ledger,
    turn: Turn,
    id: ContractId,
    stance: Stance,
) -> Result<String, Rejection> {
    let worker = validation::actor(ledger, turn.pid)?;
    let contract = find(ledger, id)?;
    match contract.status {
        ContractStatus::Issued => {}
        ContractStatus::Accepted | ContractStatus::Fulfilled => {
            let name = contract
                .owner
                .map_or_else(|| "another".to_owned(), |pid| ledger.name_of(pid));
            return Err(Rejection::TakenBy { name });
        }
        status => return Err(Rejection::WrongStatus { status }),
    }
    if ledger.accepted_contract_of(turn.pid).is_some() {
        return Err(Rejection::AlreadyHoldingContract);
    }
    budget::ensure_completion_room(worker)?;
    match contract.terms {
        ContractTerms::Bounty(terms) if terms.target == turn.pid => {
            return Err(Rejection::SelfTarget);
        }
        ContractTerms::Supply(terms) => {
            if contract.issuer == Some(turn.pid) {
                return Err(Rejection::SelfTarget);
            }
            if terms.supplier.is_some_and(|s| s != turn.pid) {
                return Err(Rejection::NotTheSupplier);
            }
        }
        ContractTerms::Smuggling => {
            if ledger.policy.embargo_ticks > 0 {
                return Err(Rejection::Embargo);
            }
            if ledger.policy.permits_required
                && worker.permit_ticks == 0
                && worker.access_ticks == 0
            {
                return Err(Rejection::PermitRequired);
            }
        }
        _ => {}
    }
    let title = contract.title.clone();

    let contract = find_mut(ledger, id)?;
    contract.status = ContractStatus::Accepted;
    contract.owner = Some(turn.pid);
    contract.stance = Some(stance);
    contract.accepted_at = Some(turn.now);
    tracing::info!(contract = %id, participant = %turn.pid, ?stance, "Contract accepted");
    Ok(format!("You take on {title} ({stance:?})."))
}

/// Decline a supply contract that names this participant.
pub fn ignore(ledger: &mut Ledger, turn: Turn, id: ContractId) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    let contract = find(ledger, id)?;
    let ContractTerms::Supply(terms) = contract.terms else {
        return Err(Rejection::NotTheSupplier);
    };
    if terms.supplier != Some(turn.pid) {
        return Err(Rejection::NotTheSupplier);
    }
    if contract.status != ContractStatus::Issued {
        return Err(Rejection::WrongStatus {
            status: contract.status,
        });
    }
    let issuer = contract.issuer;
    let title = contract.title.clone();
    let name = ledger.name_of(turn.pid);

    find_mut(ledger, id)?.status = ContractStatus::Ignored;
    if let Some(issuer) = issuer {
        ledger.notify(
            turn.now,
            issuer,
            EventKind::Contract,
            format!("{name} declines {title}."),
        );
    }
    Ok(format!("You ignore {title}."))
}

/// Hand an accepted contract back to the board.
pub fn abandon(ledger: &mut Ledger, turn: Turn, id: ContractId) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    let contract = find(ledger, id)?;
    if !contract.is_owned_by(turn.pid) {
        return Err(Rejection::NotYours);
    }
    if contract.status != ContractStatus::Accepted {
        return Err(Rejection::WrongStatus {
            status: contract.status,
        });
    }
    let title = contract.title.clone();

    let contract = find_mut(ledger, id)?;
    contract.status = ContractStatus::Issued;
    contract.owner = None;
    contract.stance = None;
    contract.accepted_at = None;
    if let Some(worker) = ledger.participant_mut(turn.pid) {
        worker.adjust_reputation(rules::ABANDON_REPUTATION);
    }
    Ok(format!("You walk away from {title}."))
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Deliver a held contract.
pub fn deliver<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    turn: Turn,
    id: ContractId,
    rng: &mut R,
) -> Result<String, Rejection> {
    let worker = validation::actor(ledger, turn.pid)?;
    let contract = find(ledger, id)?;
    if !contract.is_owned_by(turn.pid) {
        return Err(Rejection::NotYours);
    }
    if !matches!(
        contract.status,
        ContractStatus::Accepted | ContractStatus::Fulfilled
    ) {
        return Err(Rejection::WrongStatus {
            status: contract.status,
        });
    }
    budget::ensure_completion_room(worker)?;
    let terms = contract.terms;
    match terms {
        ContractTerms::Emergency | ContractTerms::Smuggling => {
            deliver_ordinary(ledger, turn, id, rng)
        }
        ContractTerms::Bounty(terms) => deliver_bounty(ledger, turn, id, terms),
        ContractTerms::Supply(terms) => deliver_supply(ledger, turn, id, terms),
    }
}

fn deliver_ordinary<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    turn: Turn,
    id: ContractId,
    rng: &mut R,
) -> Result<String, Rejection> {
    let contract = find(ledger, id)?;
    if contract.status == ContractStatus::Fulfilled {
        return complete_ordinary(ledger, turn, id);
    }

    let worker = validation::actor(ledger, turn.pid)?;
    if let Some(last) = worker.last_delivery_at {
        let elapsed = turn.now.signed_duration_since(last).num_seconds();
        if elapsed < rules::DELIVERY_COOLDOWN_SECS {
            return Err(Rejection::DeliveryCooldown {
                secs: rules::DELIVERY_COOLDOWN_SECS.saturating_sub(elapsed),
            });
        }
    }
    validation::gold(worker, rules::DELIVERY_FEE)?;
    let grain_reward = contract.grain_reward;
    let success = roll_pct(rng, rules::delivery_chance_pct(ledger.world.grain_tier()));

    let worker = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    worker
        .debit_gold(rules::DELIVERY_FEE)
        .map_err(Rejection::gold)?;
    worker.last_delivery_at = Some(turn.now);
    if !success {
        worker.adjust_reputation(rules::DELIVERY_FAILURE_REPUTATION);
        ledger.credit_treasury(rules::DELIVERY_FEE);
        return Ok("The run goes badly. You lose the fee and some standing.".to_owned());
    }
    ledger.credit_treasury(rules::DELIVERY_FEE);
    ledger.world.add_grain(grain_reward);
    complete_ordinary(ledger, turn, id)
}

fn complete_ordinary(ledger: &mut Ledger, turn: Turn, id: ContractId) -> Result<String, Rejection> {
    let contract = find(ledger, id)?;
    let kind = contract.kind();
    let stance = contract.stance;
    let title = contract.title.clone();
    let worker = validation::actor(ledger, turn.pid)?;
    let payout = pricing::contract_payout(
        contract.base_reward,
        stance,
        worker.reputation(),
        ledger.has_landed_praise(turn.pid),
        ledger.policy.tax_rate_pct,
    );
    let name = worker.name.clone();

    find_mut(ledger, id)?.status = ContractStatus::Completed;
    let worker = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    worker.credit_gold(payout.net);
    worker.daily.contracts_completed = worker.daily.contracts_completed.saturating_add(1);
    match stance {
        Some(Stance::Careful) => worker.adjust_reputation(2),
        Some(Stance::Fast) => worker.adjust_heat(2),
        Some(Stance::Quiet) => {
            worker.adjust_heat(-1);
            worker.rumor_tokens = worker.rumor_tokens.saturating_add(1);
        }
        None => {}
    }
    match kind {
        ContractKind::Emergency => worker.adjust_reputation(1),
        ContractKind::Smuggling => worker.adjust_heat(2),
        ContractKind::Supply | ContractKind::Bounty => {}
    }
    ledger.credit_treasury(payout.tax);
    ledger.announce(
        turn.now,
        EventKind::Contract,
        format!("{name} completes {title}."),
    );
    tracing::info!(
        contract = %id,
        participant = %turn.pid,
        gold = payout.net,
        "Contract completed"
    );
    Ok(format!(
        "{title} is done. You are paid {} gold ({} withheld in tax).",
        payout.net, payout.tax
    ))
}

fn deliver_bounty(
    ledger: &mut Ledger,
    turn: Turn,
    id: ContractId,
    terms: BountyTerms,
) -> Result<String, Rejection> {
    let tick = ledger.world.tick_count;
    let proof: Vec<_> = ledger
        .evidence
        .values()
        .filter(|e| e.owner == turn.pid && e.target == terms.target && tick < e.expires_tick)
        .map(|e| (e.id, e.strength))
        .collect();
    let held = proof
        .iter()
        .map(|(_, strength)| *strength)
        .fold(0_u32, u32::saturating_add);
    if held < terms.evidence_required {
        return Err(Rejection::InsufficientEvidence {
            needed: terms.evidence_required,
            held,
        });
    }
    let hunter = ledger.name_of(turn.pid);
    let quarry = ledger.name_of(terms.target);

    for (evidence, _) in &proof {
        ledger.evidence.remove(evidence);
    }
    let from_treasury = terms.reward.min(ledger.policy.treasury);
    ledger.policy.treasury = ledger.policy.treasury.saturating_sub(from_treasury);
    find_mut(ledger, id)?.status = ContractStatus::Completed;
    if let Some(worker) = ledger.participant_mut(turn.pid) {
        worker.credit_gold(terms.reward);
        worker.daily.contracts_completed = worker.daily.contracts_completed.saturating_add(1);
    }
    if let Some(target) = ledger.participant_mut(terms.target) {
        target.adjust_heat(rules::BOUNTY_TARGET_HEAT);
        target.adjust_reputation(rules::BOUNTY_TARGET_REPUTATION);
    }
    ledger.announce(
        turn.now,
        EventKind::Contract,
        format!("{hunter} brings {quarry} before the magistrate."),
    );
    tracing::info!(contract = %id, hunter = %turn.pid, target = %terms.target, "Bounty collected");
    Ok(format!("You collect the {} gold bounty on {quarry}.", terms.reward))
}

fn deliver_supply(
    ledger: &mut Ledger,
    turn: Turn,
    id: ContractId,
    terms: SupplyTerms,
) -> Result<String, Rejection> {
    let supplier = validation::actor(ledger, turn.pid)?;
    validation::grain(supplier, terms.sacks)?;
    let issuer = find(ledger, id)?
        .issuer
        .ok_or(Rejection::NotFound { what: "issuer" })?;
    if ledger.participant(issuer).is_none() {
        return Err(Rejection::NotFound { what: "issuer" });
    }
    let name = supplier.name.clone();

    let supplier = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    supplier.debit_grain(terms.sacks).map_err(Rejection::grain)?;
    supplier.credit_gold(terms.escrow);
    supplier.daily.contracts_completed = supplier.daily.contracts_completed.saturating_add(1);
    if let Some(issuer) = ledger.participant_mut(issuer) {
        issuer.credit_grain(terms.sacks);
    }
    let contract = find_mut(ledger, id)?;
    contract.status = ContractStatus::Completed;
    contract.terms = ContractTerms::Supply(SupplyTerms {
        escrow: 0,
        ..terms
    });
    ledger.notify(
        turn.now,
        issuer,
        EventKind::Contract,
        format!("{name} delivers {} sacks on your order.", terms.sacks),
    );
    Ok(format!(
        "You deliver {} sacks and collect {} gold.",
        terms.sacks, terms.escrow
    ))
}

// ---------------------------------------------------------------------------
// Supply orders
// ---------------------------------------------------------------------------

/// Post a supply order, moving the reward into escrow.
pub fn post_supply(
    ledger: &mut Ledger,
    turn: Turn,
    supplier: Option<ParticipantId>,
    sacks: u32,
    reward: u32,
) -> Result<String, Rejection> {
    let issuer = validation::actor(ledger, turn.pid)?;
    validation::in_range(sacks, 1, rules::SUPPLY_MAX_SACKS, "Sacks")?;
    validation::in_range(reward, 1, rules::SUPPLY_MAX_REWARD, "Reward")?;
    if let Some(supplier) = supplier {
        validation::counterpart(ledger, turn.pid, supplier)?;
    }
    validation::gold(issuer, reward)?;
    let name = issuer.name.clone();

    ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?
        .debit_gold(reward)
        .map_err(Rejection::gold)?;
    let id = ledger.counters.contract();
    let title = format!("{name}'s order for {sacks} sacks");
    ledger.contracts.insert(
        id,
        Contract {
            id,
            terms: ContractTerms::Supply(SupplyTerms {
                supplier,
                sacks,
                escrow: reward,
            }),
            status: ContractStatus::Issued,
            deadline_ticks: rules::SUPPLY_DEADLINE,
            owner: None,
            issuer: Some(turn.pid),
            stance: None,
            grain_reward: 0,
            base_reward: reward,
            issued_tick: ledger.world.tick_count,
            accepted_at: None,
            title: title.clone(),
        },
    );
    if let Some(supplier) = supplier {
        ledger.notify(
            turn.now,
            supplier,
            EventKind::Contract,
            format!("{name} asks you to supply {sacks} sacks for {reward} gold."),
        );
    }
    Ok(format!("You post {title}, escrowing {reward} gold."))
}

/// Withdraw an unaccepted supply order and recover the escrow.
pub fn cancel(ledger: &mut Ledger, turn: Turn, id: ContractId) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    let contract = find(ledger, id)?;
    if contract.issuer != Some(turn.pid) {
        return Err(Rejection::NotYours);
    }
    let ContractTerms::Supply(terms) = contract.terms else {
        return Err(Rejection::NotYours);
    };
    if !matches!(
        contract.status,
        ContractStatus::Issued | ContractStatus::Ignored
    ) {
        return Err(Rejection::WrongStatus {
            status: contract.status,
        });
    }

    let contract = find_mut(ledger, id)?;
    contract.status = ContractStatus::Cancelled;
    contract.terms = ContractTerms::Supply(SupplyTerms {
        escrow: 0,
        ..terms
    });
    if let Some(issuer) = ledger.participant_mut(turn.pid) {
        issuer.credit_gold(terms.escrow);
    }
    Ok(format!(
        "You cancel the order and recover {} gold.",
        terms.escrow
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::Evidence;

    use super::*;

    fn issue(ledger: &mut Ledger, terms: ContractTerms) -> ContractId {
        let id = ledger.counters.contract();
        ledger.contracts.insert(
            id,
            Contract {
                id,
                terms,
                status: ContractStatus::Issued,
                deadline_ticks: 6,
                owner: None,
                issuer: None,
                stance: None,
                grain_reward: 12,
                base_reward: 14,
                issued_tick: 0,
                accepted_at: None,
                title: "a relief run".to_owned(),
            },
        );
        id
    }

    fn join(ledger: &mut Ledger, seed: u64) -> Turn {
        let turn = Turn {
            pid: ParticipantId::new(),
            now: Utc::now(),
        };
        ledger.register_participant(turn.pid, turn.now, &mut SmallRng::seed_from_u64(seed));
        turn
    }

    #[test]
    fn second_accept_is_taken() {
        let mut ledger = Ledger::new();
        let a = join(&mut ledger, 1);
        let b = join(&mut ledger, 2);
        let id = issue(&mut ledger, ContractTerms::Emergency);
        accept(&mut ledger, a, id, Stance::Careful).unwrap();
        let err = accept(&mut ledger, b, id, Stance::Fast).unwrap_err();
        let name = ledger.name_of(a.pid);
        assert_eq!(err.to_string(), format!("Taken by {name}"));
        assert_eq!(ledger.contracts[&id].owner, Some(a.pid));
    }

    #[test]
    fn one_accepted_contract_per_participant() {
        let mut ledger = Ledger::new();
        let a = join(&mut ledger, 1);
        let first = issue(&mut ledger, ContractTerms::Emergency);
        let second = issue(&mut ledger, ContractTerms::Smuggling);
        accept(&mut ledger, a, first, Stance::Quiet).unwrap();
        assert_eq!(
            accept(&mut ledger, a, second, Stance::Quiet),
            Err(Rejection::AlreadyHoldingContract)
        );
    }

    #[test]
    fn embargo_blocks_smuggling() {
        let mut ledger = Ledger::new();
        let a = join(&mut ledger, 1);
        let id = issue(&mut ledger, ContractTerms::Smuggling);
        ledger.policy.embargo_ticks = 2;
        assert_eq!(
            accept(&mut ledger, a, id, Stance::Fast),
            Err(Rejection::Embargo)
        );
    }

    #[test]
    fn abandon_returns_to_board_with_penalty() {
        let mut ledger = Ledger::new();
        let a = join(&mut ledger, 1);
        let id = issue(&mut ledger, ContractTerms::Emergency);
        accept(&mut ledger, a, id, Stance::Careful).unwrap();
        abandon(&mut ledger, a, id).unwrap();
        assert_eq!(ledger.contracts[&id].status, ContractStatus::Issued);
        assert_eq!(ledger.contracts[&id].owner, None);
        assert_eq!(ledger.participant(a.pid).unwrap().reputation(), -2);
    }

    #[test]
    fn fulfilled_contract_pays_on_delivery() {
        let mut ledger = Ledger::new();
        let a = join(&mut ledger, 1);
        let id = issue(&mut ledger, ContractTerms::Emergency);
        accept(&mut ledger, a, id, Stance::Careful).unwrap();
        ledger.contracts.get_mut(&id).unwrap().status = ContractStatus::Fulfilled;
        deliver(&mut ledger, a, id, &mut SmallRng::seed_from_u64(0)).unwrap();
        let p = ledger.participant(a.pid).unwrap();
        // 14 * 0.85 = 11.9 -> 11; 5% tax -> 0.
        assert_eq!(p.gold(), rules::STARTING_GOLD + 11);
        assert_eq!(p.reputation(), 3);
        assert_eq!(p.daily.contracts_completed, 1);
        assert_eq!(ledger.contracts[&id].status, ContractStatus::Completed);
    }

    #[test]
    fn delivery_attempts_respect_cooldown() {
        let mut ledger = Ledger::new();
        let a = join(&mut ledger, 1);
        let id = issue(&mut ledger, ContractTerms::Emergency);
        accept(&mut ledger, a, id, Stance::Careful).unwrap();
        ledger.participant_mut(a.pid).unwrap().last_delivery_at = Some(a.now);
        let err = deliver(&mut ledger, a, id, &mut SmallRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, Rejection::DeliveryCooldown { .. }));
    }

    #[test]
    fn bounty_needs_evidence_and_pays_from_treasury() {
        let mut ledger = Ledger::new();
        let hunter = join(&mut ledger, 1);
        let target = join(&mut ledger, 2);
        ledger.participant_mut(target.pid).unwrap().adjust_heat(12);
        ledger.policy.treasury = 30;
        let id = issue(
            &mut ledger,
            ContractTerms::Bounty(BountyTerms {
                target: target.pid,
                reward: 42,
                evidence_required: 4,
            }),
        );
        assert_eq!(
            accept(&mut ledger, target, id, Stance::Fast),
            Err(Rejection::SelfTarget)
        );
        accept(&mut ledger, hunter, id, Stance::Fast).unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            deliver(&mut ledger, hunter, id, &mut rng),
            Err(Rejection::InsufficientEvidence { needed: 4, held: 0 })
        );
        let eid = ledger.counters.evidence();
        ledger.evidence.insert(
            eid,
            Evidence {
                id: eid,
                owner: hunter.pid,
                target: target.pid,
                strength: 5,
                expires_tick: 18,
            },
        );
        deliver(&mut ledger, hunter, id, &mut rng).unwrap();
        assert!(ledger.evidence.is_empty());
        assert_eq!(ledger.policy.treasury, 0);
        assert_eq!(
            ledger.participant(hunter.pid).unwrap().gold(),
            rules::STARTING_GOLD + 42
        );
        let t = ledger.participant(target.pid).unwrap();
        assert_eq!(t.heat(), 6);
        assert_eq!(t.reputation(), -3);
    }

    #[test]
    fn supply_order_lifecycle() {
        let mut ledger = Ledger::new();
        let buyer = join(&mut ledger, 1);
        let seller = join(&mut ledger, 2);
        post_supply(&mut ledger, buyer, Some(seller.pid), 3, 15).unwrap();
        let id = *ledger.contracts.keys().next().unwrap();
        assert_eq!(ledger.escrowed_gold(), 15);
        assert_eq!(
            cancel(&mut ledger, seller, id),
            Err(Rejection::NotYours)
        );
        accept(&mut ledger, seller, id, Stance::Careful).unwrap();
        deliver(&mut ledger, seller, id, &mut SmallRng::seed_from_u64(0)).unwrap();
        assert_eq!(
            ledger.participant(buyer.pid).unwrap().grain(),
            rules::STARTING_GRAIN + 3
        );
        assert_eq!(
            ledger.participant(seller.pid).unwrap().gold(),
            rules::STARTING_GOLD + 15
        );
        assert_eq!(ledger.escrowed_gold(), 0);
    }

    #[test]
    fn only_named_supplier_may_ignore() {
        let mut ledger = Ledger::new();
        let buyer = join(&mut ledger, 1);
        let seller = join(&mut ledger, 2);
        let stranger = join(&mut ledger, 3);
        post_supply(&mut ledger, buyer, Some(seller.pid), 1, 5).unwrap();
        let id = *ledger.contracts.keys().next().unwrap();
        assert_eq!(
            ignore(&mut ledger, stranger, id),
            Err(Rejection::NotTheSupplier)
        );
        ignore(&mut ledger, seller, id).unwrap();
        cancel(&mut ledger, buyer, id).unwrap();
        assert_eq!(
            ledger.participant(buyer.pid).unwrap().gold(),
            rules::STARTING_GOLD
        );
    }
}
