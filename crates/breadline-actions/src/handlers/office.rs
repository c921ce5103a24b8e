//! Institutional actions: seat powers, resignation, and purchased access.

use breadline_ledger::{Ledger, rules};
use breadline_types::{EventKind, ParticipantId, SeatHolder, SeatKind};

use super::Turn;
use crate::error::Rejection;
use crate::validation;

/// Buy temporary access to the offices.
pub fn purchase_access(ledger: &mut Ledger, turn: Turn) -> Result<String, Rejection> {
    let buyer = validation::actor(ledger, turn.pid)?;
    if buyer.access_ticks > 0 {
        return Err(Rejection::AccessActive);
    }
    validation::gold(buyer, rules::ACCESS_COST)?;

    let buyer = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    buyer
        .debit_gold(rules::ACCESS_COST)
        .map_err(Rejection::gold)?;
    buyer.access_ticks = rules::ACCESS_TICKS;
    ledger.credit_treasury(rules::ACCESS_COST);
    Ok(format!(
        "A clerk waves you through. Access lasts {} ticks.",
        rules::ACCESS_TICKS
    ))
}

/// Treasurer: set the market tax.
pub fn set_tax_rate(ledger: &mut Ledger, turn: Turn, percent: u32) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    validation::seat(ledger, turn.pid, SeatKind::Treasurer)?;
    validation::in_range(percent, 0, rules::MAX_TAX_RATE_PCT, "Tax rate")?;
    let name = ledger.name_of(turn.pid);

    ledger.policy.tax_rate_pct = percent;
    ledger.announce(
        turn.now,
        EventKind::Institution,
        format!("Treasurer {name} sets the market tax at {percent}%."),
    );
    tracing::info!(participant = %turn.pid, percent, "Tax rate changed");
    Ok(format!("The tax is now {percent}%."))
}

/// Harbormaster: toggle the high-risk permit requirement.
pub fn toggle_permits(ledger: &mut Ledger, turn: Turn) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    validation::seat(ledger, turn.pid, SeatKind::Harbormaster)?;
    let required = !ledger.policy.permits_required;

    ledger.policy.permits_required = required;
    let text = if required {
        "The harbormaster now demands permits for risky cargo."
    } else {
        "The harbormaster lifts the permit requirement."
    };
    ledger.announce(turn.now, EventKind::Institution, text);
    Ok(text.to_owned())
}

/// Harbormaster: close the harbor to smugglers.
pub fn declare_embargo(ledger: &mut Ledger, turn: Turn, ticks: u32) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    validation::seat(ledger, turn.pid, SeatKind::Harbormaster)?;
    validation::in_range(
        ticks,
        rules::EMBARGO_MIN_TICKS,
        rules::EMBARGO_MAX_TICKS,
        "Embargo",
    )?;

    ledger.policy.embargo_ticks = ledger.policy.embargo_ticks.max(ticks);
    ledger.announce(
        turn.now,
        EventKind::Institution,
        format!("The harbor is closed to smugglers for {ticks} ticks."),
    );
    Ok(format!("Embargo declared for {ticks} ticks."))
}

/// Harbormaster: grant a trade permit.
pub fn issue_permit(
    ledger: &mut Ledger,
    turn: Turn,
    target: ParticipantId,
) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    validation::seat(ledger, turn.pid, SeatKind::Harbormaster)?;
    let holder = ledger
        .participant(target)
        .ok_or(Rejection::NotFound {
            what: "participant",
        })?;
    let holder_name = holder.name.clone();

    if let Some(holder) = ledger.participant_mut(target) {
        holder.permit_ticks = rules::PERMIT_TICKS;
    }
    ledger.notify(
        turn.now,
        target,
        EventKind::Institution,
        format!("You are granted a trade permit for {} ticks.", rules::PERMIT_TICKS),
    );
    Ok(format!("Permit issued to {holder_name}."))
}

/// Magistrate: put a participant on the wanted list.
pub fn issue_warrant(
    ledger: &mut Ledger,
    turn: Turn,
    target: ParticipantId,
) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    validation::seat(ledger, turn.pid, SeatKind::Magistrate)?;
    let accused = validation::counterpart(ledger, turn.pid, target)?.name.clone();

    if let Some(accused) = ledger.participant_mut(target) {
        accused.adjust_heat(rules::WARRANT_HEAT);
    }
    ledger.announce(
        turn.now,
        EventKind::Institution,
        format!("A warrant is posted for {accused}."),
    );
    Ok(format!("Warrant issued for {accused}."))
}

/// Magistrate: clear a participant's name.
pub fn pardon(ledger: &mut Ledger, turn: Turn, target: ParticipantId) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    validation::seat(ledger, turn.pid, SeatKind::Magistrate)?;
    let pardoned = validation::counterpart(ledger, turn.pid, target)?.name.clone();

    if let Some(pardoned) = ledger.participant_mut(target) {
        pardoned.adjust_heat(rules::PARDON_HEAT);
    }
    ledger.announce(
        turn.now,
        EventKind::Institution,
        format!("The magistrate pardons {pardoned}."),
    );
    Ok(format!("{pardoned} is pardoned."))
}

/// Step down from a held seat. The NPC caretaker resumes.
pub fn resign(ledger: &mut Ledger, turn: Turn, seat: SeatKind) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    validation::seat(ledger, turn.pid, seat)?;
    let name = ledger.name_of(turn.pid);

    if let Some(office) = ledger.seats.get_mut(&seat) {
        office.holder = SeatHolder::Npc;
        office.tenure_ticks = rules::SEAT_TENURE_TICKS;
        office.election_ticks = None;
    }
    ledger.announce(
        turn.now,
        EventKind::Institution,
        format!(
            "{name} resigns as {}. {} resumes the duties.",
            seat.title(),
            seat.npc_holder()
        ),
    );
    tracing::info!(participant = %turn.pid, seat = seat.title(), "Seat resigned");
    Ok(format!("You resign as {}.", seat.title()))
}
