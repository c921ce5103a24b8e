//! Travel between districts, public chat, and private messages.

use breadline_ledger::{Ledger, rules};
use breadline_types::{District, EventKind, Journey, ParticipantId};

use super::Turn;
use crate::error::Rejection;
use crate::validation;

/// Ticks needed to walk between two districts.
pub const fn travel_ticks(from: District, to: District) -> u32 {
    let distance = from.position().abs_diff(to.position());
    if distance < rules::TRAVEL_MIN_TICKS {
        rules::TRAVEL_MIN_TICKS
    } else if distance > rules::TRAVEL_MAX_TICKS {
        rules::TRAVEL_MAX_TICKS
    } else {
        distance
    }
}

/// Set out for another district. Arrival happens on a later tick.
pub fn travel(ledger: &mut Ledger, turn: Turn, destination: District) -> Result<String, Rejection> {
    let walker = validation::actor(ledger, turn.pid)?;
    validation::not_traveling(walker)?;
    if walker.location == destination {
        return Err(Rejection::AlreadyThere);
    }
    let ticks = travel_ticks(walker.location, destination);

    let walker = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    walker.journey = Some(Journey {
        destination,
        remaining_ticks: ticks,
        total_ticks: ticks,
    });
    Ok(format!(
        "You set out for {} ({ticks} ticks).",
        destination.label()
    ))
}

/// Say something in the public square.
pub fn chat(ledger: &mut Ledger, turn: Turn, text: &str) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    let text = validation::text(text, rules::CHAT_MAX_CHARS)?;
    ledger.post_chat(turn.now, turn.pid, text);
    Ok("Your words carry across the square.".to_owned())
}

/// Send a private letter. Intercepts on either party capture it.
pub fn send_message(
    ledger: &mut Ledger,
    turn: Turn,
    recipient: ParticipantId,
    text: &str,
) -> Result<String, Rejection> {
    validation::actor(ledger, turn.pid)?;
    let recipient_name = validation::counterpart(ledger, turn.pid, recipient)?
        .name
        .clone();
    let text = validation::text(text, rules::MESSAGE_MAX_CHARS)?;

    ledger.send_message(turn.now, turn.pid, recipient, text);
    let sender = ledger.name_of(turn.pid);
    ledger.notify(
        turn.now,
        recipient,
        EventKind::World,
        format!("A letter arrives from {sender}."),
    );
    Ok(format!("Your letter is on its way to {recipient_name}."))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::{SeatHolder, SeatKind};

    use super::*;
    use crate::handlers::intel;

    fn pair() -> (Ledger, Turn, ParticipantId) {
        let mut ledger = Ledger::new();
        let turn = Turn {
            pid: ParticipantId::new(),
            now: Utc::now(),
        };
        let other = ParticipantId::new();
        ledger.register_participant(turn.pid, turn.now, &mut SmallRng::seed_from_u64(8));
        ledger.register_participant(other, turn.now, &mut SmallRng::seed_from_u64(9));
        (ledger, turn, other)
    }

    #[test]
    fn travel_time_is_clamped() {
        assert_eq!(travel_ticks(District::Market, District::Granary), 1);
        assert_eq!(travel_ticks(District::Market, District::Temple), 2);
        assert_eq!(travel_ticks(District::Granary, District::Palace), 3);
    }

    #[test]
    fn cannot_travel_twice() {
        let (mut ledger, turn, _) = pair();
        assert_eq!(
            travel(&mut ledger, turn, District::Market),
            Err(Rejection::AlreadyThere)
        );
        travel(&mut ledger, turn, District::Palace).unwrap();
        let journey = ledger.participant(turn.pid).unwrap().journey.unwrap();
        assert_eq!(journey.remaining_ticks, 3);
        assert_eq!(
            travel(&mut ledger, turn, District::Docks),
            Err(Rejection::Traveling)
        );
    }

    #[test]
    fn chat_is_bounded() {
        let (mut ledger, turn, _) = pair();
        let long = "a".repeat(rules::CHAT_MAX_CHARS + 1);
        assert_eq!(
            chat(&mut ledger, turn, &long),
            Err(Rejection::TooLong {
                max: rules::CHAT_MAX_CHARS
            })
        );
        chat(&mut ledger, turn, "bread for all").unwrap();
        assert_eq!(ledger.chat.len(), 1);
    }

    #[test]
    fn intercepted_letters_are_captured() {
        let (mut ledger, turn, other) = pair();
        ledger.seats.get_mut(&SeatKind::Harbormaster).unwrap().holder =
            SeatHolder::Participant(turn.pid);
        intel::intercept(&mut ledger, turn, other).unwrap();
        let reply = Turn {
            pid: other,
            now: turn.now,
        };
        send_message(&mut ledger, reply, turn.pid, "meet at the docks").unwrap();
        let tap = ledger.intercepts.values().next().unwrap();
        assert_eq!(tap.captured.len(), 1);
        assert_eq!(ledger.messages.len(), 1);
    }
}
