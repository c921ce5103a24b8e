//! Read-only views for rendering collaborators.
//!
//! Every function here takes `&Ledger` and returns owned view structs, so
//! a caller can build a page after the world lock is released.

use chrono::{DateTime, Utc};

use breadline_actions::{budget, pricing};
use breadline_ledger::Ledger;
use breadline_types::{
    ChatView, Contract, ContractStatus, ContractTerms, ContractView, CrisisView, EventView,
    EvidenceView, JourneyView, LoanView, MessageView, ObligationView, ParticipantId,
    ParticipantView, PolicyView, ProjectView, ScryView, SeatView, WorldView,
};

/// Most entries shown in any one feed.
pub const FEED_LIMIT: usize = 30;

/// The public state of the city.
pub fn world_view(ledger: &Ledger) -> WorldView {
    let world = &ledger.world;
    let tier = world.grain_tier();
    let tax = ledger.policy.tax_rate_pct;
    WorldView {
        day: world.day,
        phase: world.phase,
        tick_count: world.tick_count,
        grain_supply: world.grain_supply(),
        grain_tier: tier,
        unrest: world.unrest(),
        unrest_tier: world.unrest_tier(),
        situation: world.situation().to_owned(),
        market_restriction_ticks: world.market_restriction_ticks,
        buy_price: pricing::buy_unit_price(tier, tax, world.is_market_restricted()),
        sell_price: pricing::sell_unit_price(tier, tax),
        crisis: ledger.crisis.as_ref().map(|c| CrisisView {
            kind: c.kind,
            severity: c.severity,
            remaining_ticks: c.remaining_ticks,
            mitigation_needed: c.mitigation_needed,
            mitigation_progress: c.mitigation_progress,
        }),
        projects: ledger
            .projects
            .values()
            .map(|p| ProjectView {
                id: p.id,
                kind: p.kind,
                owner_name: ledger.name_of(p.owner),
                remaining_ticks: p.remaining_ticks,
            })
            .collect(),
    }
}

/// Seats, levers, and the treasury.
pub fn policy_view(ledger: &Ledger) -> PolicyView {
    PolicyView {
        tax_rate_pct: ledger.policy.tax_rate_pct,
        permits_required: ledger.policy.permits_required,
        embargo_ticks: ledger.policy.embargo_ticks,
        treasury: ledger.policy.treasury,
        seats: ledger
            .seats
            .values()
            .map(|seat| SeatView {
                kind: seat.kind,
                holder_name: ledger.holder_name(seat),
                holder: seat.holder.participant(),
                tenure_ticks: seat.tenure_ticks,
                election_ticks: seat.election_ticks,
            })
            .collect(),
    }
}

/// Whether `viewer` may see `contract` on the board.
fn visible_to(contract: &Contract, viewer: ParticipantId) -> bool {
    if contract.is_owned_by(viewer) || contract.issuer == Some(viewer) {
        return true;
    }
    if contract.status.is_terminal() || contract.status == ContractStatus::Ignored {
        return false;
    }
    match contract.terms {
        ContractTerms::Supply(terms) => terms.supplier.is_none_or(|s| s == viewer),
        _ => true,
    }
}

/// One contract as `viewer` would see it, with the payout they would earn.
pub fn contract_view(ledger: &Ledger, contract: &Contract, viewer: ParticipantId) -> ContractView {
    let reward = match contract.terms {
        ContractTerms::Emergency | ContractTerms::Smuggling => {
            let reputation = ledger.participant(viewer).map_or(0, |p| p.reputation());
            pricing::contract_payout(
                contract.base_reward,
                contract.stance,
                reputation,
                ledger.has_landed_praise(viewer),
                ledger.policy.tax_rate_pct,
            )
            .net
        }
        ContractTerms::Supply(_) | ContractTerms::Bounty(_) => contract.base_reward,
    };
    ContractView {
        id: contract.id,
        kind: contract.kind(),
        status: contract.status,
        title: contract.title.clone(),
        deadline_ticks: contract.deadline_ticks,
        owner_name: contract.owner.map(|pid| ledger.name_of(pid)),
        stance: contract.stance,
        grain_reward: contract.grain_reward,
        reward,
        mine: contract.is_owned_by(viewer),
    }
}

/// Coarse wealth band shown on scry reports.
fn wealth_band(gold: u32, grain: u32) -> &'static str {
    match gold.saturating_add(grain.saturating_mul(3)) {
        0..10 => "destitute",
        10..50 => "getting by",
        50..150 => "comfortable",
        _ => "wealthy",
    }
}

/// Everything one participant sees on their page.
pub fn participant_view(
    ledger: &Ledger,
    pid: ParticipantId,
    now: DateTime<Utc>,
) -> Option<ParticipantView> {
    let p = ledger.participant(pid)?;
    let today = now.date_naive() == p.daily.date;

    let contracts = ledger
        .contracts
        .values()
        .filter(|c| visible_to(c, pid))
        .map(|c| contract_view(ledger, c, pid))
        .collect();

    let events = ledger
        .events
        .iter()
        .rev()
        .filter(|e| e.audience.is_none_or(|a| a == pid))
        .take(FEED_LIMIT)
        .map(|e| EventView {
            id: e.id,
            tick: e.tick,
            day: e.day,
            phase: e.phase,
            kind: e.kind,
            text: e.text.clone(),
            private: e.audience.is_some(),
        })
        .collect();

    let chat = ledger
        .chat
        .iter()
        .rev()
        .take(FEED_LIMIT)
        .map(|line| ChatView {
            id: line.id,
            at: line.at,
            author_name: line.author_name.clone(),
            text: line.text.clone(),
        })
        .collect();

    let tapped: Vec<_> = ledger
        .intercepts
        .values()
        .filter(|i| i.owner == pid)
        .flat_map(|i| i.captured.iter().copied())
        .collect();
    let inbox = ledger
        .messages
        .iter()
        .rev()
        .filter(|m| m.from == pid || m.to == pid || tapped.contains(&m.id))
        .take(FEED_LIMIT)
        .map(|m| MessageView {
            id: m.id,
            at: m.at,
            from_name: ledger.name_of(m.from),
            to_name: ledger.name_of(m.to),
            text: m.text.clone(),
            intercepted: m.from != pid && m.to != pid,
        })
        .collect();

    let loans = ledger
        .loans
        .values()
        .filter(|l| l.lender == pid || l.borrower == pid)
        .map(|l| LoanView {
            id: l.id,
            lender_name: ledger.name_of(l.lender),
            borrower_name: ledger.name_of(l.borrower),
            principal: l.principal,
            outstanding: l.outstanding,
            due_tick: l.due_tick,
            status: l.status,
        })
        .collect();

    let obligations = ledger
        .obligations
        .values()
        .filter(|o| o.creditor == pid || o.debtor == pid)
        .map(|o| ObligationView {
            id: o.id,
            creditor_name: ledger.name_of(o.creditor),
            debtor_name: ledger.name_of(o.debtor),
            amount: o.amount,
            note: o.note.clone(),
            due_tick: o.due_tick,
            status: o.status,
        })
        .collect();

    let evidence = ledger
        .evidence
        .values()
        .filter(|e| e.owner == pid)
        .map(|e| EvidenceView {
            id: e.id,
            target_name: ledger.name_of(e.target),
            strength: e.strength,
            expires_tick: e.expires_tick,
        })
        .collect();

    let reports = ledger
        .scry_reports
        .values()
        .filter(|r| r.owner == pid)
        .map(|r| ScryView {
            id: r.id,
            target_name: r.target_name.clone(),
            reputation: r.reputation,
            heat: r.heat,
            location: r.location,
            wealth: wealth_band(r.gold, r.grain).to_owned(),
            expires_tick: r.expires_tick,
        })
        .collect();

    Some(ParticipantView {
        id: p.id,
        name: p.name.clone(),
        gold: p.gold(),
        grain: p.grain(),
        reputation: p.reputation(),
        heat: p.heat(),
        rumor_tokens: p.rumor_tokens,
        location: p.location,
        journey: p.journey.map(|j| JourneyView {
            destination: j.destination,
            remaining_ticks: j.remaining_ticks,
            total_ticks: j.total_ticks,
        }),
        standing: p.standing,
        ritual_immunity_ticks: p.ritual_immunity_ticks,
        access_ticks: p.access_ticks,
        permit_ticks: p.permit_ticks,
        high_impact_remaining: if today {
            budget::remaining(p)
        } else {
            breadline_ledger::rules::DAILY_HIGH_IMPACT_BUDGET
        },
        contracts_completed_today: if today { p.daily.contracts_completed } else { 0 },
        seats: ledger.seats_of(pid),
        contracts,
        events,
        chat,
        inbox,
        loans,
        obligations,
        evidence,
        reports,
    })
}
