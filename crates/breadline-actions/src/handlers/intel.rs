//! Intel actions: rumors, evidence, scrying, intercepts, and the ritual.

use rand::Rng;

use breadline_ledger::{Ledger, rules};
use breadline_types::{
    District, EventKind, Evidence, EvidenceId, Intercept, ParticipantId, Rumor, RumorId,
    RumorTone, ScryReport,
};

use super::Turn;
use crate::error::Rejection;
use crate::validation;

/// Start a rumor about another participant.
///
/// Costs a rumor token when one is held, otherwise gold.
pub fn spread_rumor<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    turn: Turn,
    target: ParticipantId,
    tone: RumorTone,
    claim: &str,
    rng: &mut R,
) -> Result<String, Rejection> {
    let source = validation::actor(ledger, turn.pid)?;
    let target_name = validation::counterpart(ledger, turn.pid, target)?.name.clone();
    let claim = validation::text(claim, rules::RUMOR_CLAIM_MAX_CHARS)?;
    let use_token = source.rumor_tokens > 0;
    if !use_token {
        validation::gold(source, rules::RUMOR_GOLD_COST)?;
    }
    let credibility = rules::RUMOR_BASE_CREDIBILITY
        .saturating_add(source.reputation() / 4)
        .saturating_add(rng.random_range(0..=rules::RUMOR_CREDIBILITY_ROLL_MAX))
        .clamp(rules::RUMOR_CREDIBILITY_MIN, rules::RUMOR_CREDIBILITY_MAX);

    let source = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    if use_token {
        source.rumor_tokens = source.rumor_tokens.saturating_sub(1);
    } else {
        source
            .debit_gold(rules::RUMOR_GOLD_COST)
            .map_err(Rejection::gold)?;
    }
    let id = ledger.counters.rumor();
    ledger.rumors.insert(
        id,
        Rumor {
            id,
            source: turn.pid,
            target,
            tone,
            claim: claim.clone(),
            credibility: u32::try_from(credibility).unwrap_or(0),
            spread: 0,
            life_ticks: rules::RUMOR_LIFE_TICKS,
            landed: false,
        },
    );
    ledger.announce(
        turn.now,
        EventKind::Intel,
        format!("Whispers about {target_name}: \"{claim}\""),
    );
    Ok(format!("The rumor about {target_name} is loose."))
}

/// Undercut a rumor's credibility. Rumors that fall too low die out.
pub fn counter_rumor(ledger: &mut Ledger, turn: Turn, id: RumorId) -> Result<String, Rejection> {
    let actor = validation::actor(ledger, turn.pid)?;
    if !ledger.rumors.contains_key(&id) {
        return Err(Rejection::NotFound { what: "rumor" });
    }
    validation::gold(actor, rules::COUNTER_RUMOR_COST)?;

    ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?
        .debit_gold(rules::COUNTER_RUMOR_COST)
        .map_err(Rejection::gold)?;
    let Some(rumor) = ledger.rumors.get_mut(&id) else {
        return Err(Rejection::NotFound { what: "rumor" });
    };
    rumor.credibility = rumor
        .credibility
        .saturating_sub(rules::COUNTER_RUMOR_CREDIBILITY);
    if rumor.credibility <= rules::RUMOR_DEAD_CREDIBILITY {
        ledger.rumors.remove(&id);
        return Ok("The rumor collapses under scrutiny.".to_owned());
    }
    Ok("You cast doubt on the rumor.".to_owned())
}

/// Dig up evidence against a participant.
pub fn gather_evidence<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    turn: Turn,
    target: ParticipantId,
    rng: &mut R,
) -> Result<String, Rejection> {
    let investigator = validation::actor(ledger, turn.pid)?;
    let suspect = validation::counterpart(ledger, turn.pid, target)?;
    validation::gold(investigator, rules::EVIDENCE_COST)?;
    let wanted_bonus = if suspect.heat() >= rules::BOUNTY_HEAT_THRESHOLD {
        rules::EVIDENCE_WANTED_BONUS
    } else {
        0
    };
    let strength = rng
        .random_range(0..=rules::EVIDENCE_ROLL_MAX)
        .saturating_add(1)
        .saturating_add(wanted_bonus)
        .clamp(1, rules::EVIDENCE_MAX_STRENGTH);
    let suspect_name = suspect.name.clone();

    ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?
        .debit_gold(rules::EVIDENCE_COST)
        .map_err(Rejection::gold)?;
    let id = ledger.counters.evidence();
    let expires_tick = ledger
        .world
        .tick_count
        .saturating_add(rules::EVIDENCE_TTL_TICKS);
    ledger.evidence.insert(
        id,
        Evidence {
            id,
            owner: turn.pid,
            target,
            strength,
            expires_tick,
        },
    );
    Ok(format!(
        "You gather evidence against {suspect_name} (strength {strength})."
    ))
}

/// Make evidence public, damaging its target.
pub fn publish_evidence(
    ledger: &mut Ledger,
    turn: Turn,
    id: EvidenceId,
) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    let evidence = *ledger
        .evidence
        .get(&id)
        .ok_or(Rejection::NotFound { what: "evidence" })?;
    if evidence.owner != turn.pid {
        return Err(Rejection::NotYours);
    }
    if ledger.world.tick_count >= evidence.expires_tick {
        return Err(Rejection::Stale);
    }
    let target_name = ledger.name_of(evidence.target);
    let strength = i32::try_from(evidence.strength).unwrap_or(0);

    ledger.evidence.remove(&id);
    if let Some(target) = ledger.participant_mut(evidence.target) {
        target.adjust_reputation(strength.saturating_neg());
        target.adjust_heat(strength.saturating_add(1) / 2);
    }
    ledger.announce(
        turn.now,
        EventKind::Intel,
        format!("Damning papers about {target_name} are nailed to the market board."),
    );
    tracing::info!(
        participant = %turn.pid,
        target = %evidence.target,
        strength,
        "Evidence published"
    );
    Ok(format!("You expose {target_name}."))
}

/// Commission a scrying report on another participant.
pub fn scry(ledger: &mut Ledger, turn: Turn, target: ParticipantId) -> Result<String, Rejection> {
    let seer = validation::actor(ledger, turn.pid)?;
    let observed = validation::counterpart(ledger, turn.pid, target)?;
    validation::gold(seer, rules::SCRY_COST)?;
    let target_name = observed.name.clone();
    let (reputation, heat, gold, grain, location) = (
        observed.reputation(),
        observed.heat(),
        observed.gold(),
        observed.grain(),
        observed.location,
    );

    ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?
        .debit_gold(rules::SCRY_COST)
        .map_err(Rejection::gold)?;
    let id = ledger.counters.scry();
    let expires_tick = ledger
        .world
        .tick_count
        .saturating_add(rules::SCRY_TTL_TICKS);
    ledger.scry_reports.insert(
        id,
        ScryReport {
            id,
            owner: turn.pid,
            target,
            target_name: target_name.clone(),
            reputation,
            heat,
            gold,
            grain,
            location,
            expires_tick,
        },
    );
    Ok(format!("The bowl clouds, then clears: you see {target_name}."))
}

/// Tap another participant's correspondence.
pub fn intercept(
    ledger: &mut Ledger,
    turn: Turn,
    target: ParticipantId,
) -> Result<String, Rejection> {
    let spy = validation::actor(ledger, turn.pid)?;
    let target_name = validation::counterpart(ledger, turn.pid, target)?.name.clone();
    if spy.access_ticks == 0 && ledger.seats_of(turn.pid).is_empty() {
        return Err(Rejection::NoAccess);
    }
    validation::gold(spy, rules::INTERCEPT_COST)?;

    ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?
        .debit_gold(rules::INTERCEPT_COST)
        .map_err(Rejection::gold)?;
    let id = ledger.counters.intercept();
    let expires_tick = ledger
        .world
        .tick_count
        .saturating_add(rules::INTERCEPT_TTL_TICKS);
    ledger.intercepts.insert(
        id,
        Intercept {
            id,
            owner: turn.pid,
            target,
            expires_tick,
            captured: Vec::new(),
        },
    );
    Ok(format!("Your people now read {target_name}'s letters."))
}

/// Temple ritual: offer grain for protection against smears.
pub fn perform_ritual(ledger: &mut Ledger, turn: Turn) -> Result<String, Rejection> {
    let pilgrim = validation::actor(ledger, turn.pid)?;
    validation::not_traveling(pilgrim)?;
    if pilgrim.location != District::Temple {
        return Err(Rejection::WrongDistrict {
            district: District::Temple,
        });
    }
    if pilgrim.is_immune() {
        return Err(Rejection::RitualActive);
    }
    validation::grain(pilgrim, rules::RITUAL_GRAIN_COST)?;

    let pilgrim = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    pilgrim
        .debit_grain(rules::RITUAL_GRAIN_COST)
        .map_err(Rejection::grain)?;
    pilgrim.ritual_immunity_ticks = rules::RITUAL_IMMUNITY_TICKS;
    pilgrim.adjust_reputation(rules::RITUAL_REPUTATION);
    Ok("Incense and grain smoke rise. Slander will not stick to you for a while.".to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::{SeatHolder, SeatKind};

    use super::*;

    fn pair() -> (Ledger, Turn, ParticipantId) {
        let mut ledger = Ledger::new();
        let turn = Turn {
            pid: ParticipantId::new(),
            now: Utc::now(),
        };
        let other = ParticipantId::new();
        ledger.register_participant(turn.pid, turn.now, &mut SmallRng::seed_from_u64(1));
        ledger.register_participant(other, turn.now, &mut SmallRng::seed_from_u64(2));
        (ledger, turn, other)
    }

    #[test]
    fn first_rumor_uses_token_then_gold() {
        let (mut ledger, turn, other) = pair();
        let mut rng = SmallRng::seed_from_u64(4);
        spread_rumor(&mut ledger, turn, other, RumorTone::Smear, "cheats at dice", &mut rng)
            .unwrap();
        let p = ledger.participant(turn.pid).unwrap();
        assert_eq!(p.rumor_tokens, 0);
        assert_eq!(p.gold(), rules::STARTING_GOLD);
        spread_rumor(&mut ledger, turn, other, RumorTone::Praise, "fed orphans", &mut rng)
            .unwrap();
        let p = ledger.participant(turn.pid).unwrap();
        assert_eq!(p.gold(), rules::STARTING_GOLD - rules::RUMOR_GOLD_COST);
        assert_eq!(ledger.rumors.len(), 2);
        assert!(
            ledger
                .rumors
                .values()
                .all(|r| (10..=90).contains(&r.credibility))
        );
    }

    #[test]
    fn counter_kills_weak_rumor() {
        let (mut ledger, turn, other) = pair();
        let mut rng = SmallRng::seed_from_u64(4);
        spread_rumor(&mut ledger, turn, other, RumorTone::Smear, "a thief", &mut rng).unwrap();
        let id = *ledger.rumors.keys().next().unwrap();
        ledger.rumors.get_mut(&id).unwrap().credibility = 30;
        counter_rumor(&mut ledger, turn, id).unwrap();
        assert!(!ledger.rumors.contains_key(&id));
    }

    #[test]
    fn published_evidence_hurts_target() {
        let (mut ledger, turn, other) = pair();
        gather_evidence(&mut ledger, turn, other, &mut SmallRng::seed_from_u64(5)).unwrap();
        let (id, strength) = ledger
            .evidence
            .values()
            .map(|e| (e.id, e.strength))
            .next()
            .unwrap();
        assert!((1..=5).contains(&strength));
        publish_evidence(&mut ledger, turn, id).unwrap();
        let target = ledger.participant(other).unwrap();
        assert_eq!(target.reputation(), -i32::try_from(strength).unwrap());
        assert!(ledger.evidence.is_empty());
    }

    #[test]
    fn intercept_needs_standing() {
        let (mut ledger, turn, other) = pair();
        assert_eq!(intercept(&mut ledger, turn, other), Err(Rejection::NoAccess));
        ledger.seats.get_mut(&SeatKind::Magistrate).unwrap().holder =
            SeatHolder::Participant(turn.pid);
        intercept(&mut ledger, turn, other).unwrap();
        assert_eq!(ledger.intercepts.len(), 1);
    }

    #[test]
    fn scry_snapshots_target() {
        let (mut ledger, turn, other) = pair();
        ledger.participant_mut(other).unwrap().adjust_heat(7);
        scry(&mut ledger, turn, other).unwrap();
        let report = ledger.scry_reports.values().next().unwrap();
        assert_eq!(report.heat, 7);
        assert_eq!(report.target, other);
    }

    #[test]
    fn ritual_requires_temple() {
        let (mut ledger, turn, _) = pair();
        assert_eq!(
            perform_ritual(&mut ledger, turn),
            Err(Rejection::WrongDistrict {
                district: District::Temple
            })
        );
        ledger.participant_mut(turn.pid).unwrap().location = District::Temple;
        perform_ritual(&mut ledger, turn).unwrap();
        assert_eq!(perform_ritual(&mut ledger, turn), Err(Rejection::RitualActive));
    }
}
