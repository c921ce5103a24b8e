//! Precondition helpers shared by the action handlers.
//!
//! Every helper either returns `Ok` or a [`Rejection`] and never touches
//! the ledger mutably, so a handler can run all of its checks before its
//! first write.

use breadline_ledger::Ledger;
use breadline_types::{Participant, ParticipantId, SeatKind};

use crate::error::Rejection;

/// The acting participant.
pub fn actor(ledger: &Ledger, pid: ParticipantId) -> Result<&Participant, Rejection> {
    ledger
        .participant(pid)
        .ok_or(Rejection::UnknownParticipant)
}

/// A different, known participant.
pub fn counterpart(
    ledger: &Ledger,
    pid: ParticipantId,
    target: ParticipantId,
) -> Result<&Participant, Rejection> {
    if pid == target {
        return Err(Rejection::SelfTarget);
    }
    ledger
        .participant(target)
        .ok_or(Rejection::NotFound {
            what: "participant",
        })
}

/// Reject values outside `min..=max`.
pub const fn in_range(
    value: u32,
    min: u32,
    max: u32,
    what: &'static str,
) -> Result<(), Rejection> {
    if value < min || value > max {
        return Err(Rejection::OutOfRange { what, min, max });
    }
    Ok(())
}

/// Trim text and check it is non-empty and at most `max` characters.
pub fn text(raw: &str, max: usize) -> Result<String, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::EmptyText);
    }
    if trimmed.chars().count() > max {
        return Err(Rejection::TooLong { max });
    }
    Ok(trimmed.to_owned())
}

/// Reject participants who are mid-journey.
pub const fn not_traveling(participant: &Participant) -> Result<(), Rejection> {
    if participant.is_traveling() {
        return Err(Rejection::Traveling);
    }
    Ok(())
}

/// Require that `pid` holds `seat`.
pub fn seat(ledger: &Ledger, pid: ParticipantId, seat: SeatKind) -> Result<(), Rejection> {
    if ledger.holds_seat(pid, seat) {
        Ok(())
    } else {
        Err(Rejection::NotSeatHolder { seat })
    }
}

/// Require `gold` in the participant's purse.
pub const fn gold(participant: &Participant, gold: u32) -> Result<(), Rejection> {
    if participant.gold() < gold {
        return Err(Rejection::InsufficientGold {
            needed: gold,
            available: participant.gold(),
        });
    }
    Ok(())
}

/// Require `sacks` in the participant's store.
pub const fn grain(participant: &Participant, sacks: u32) -> Result<(), Rejection> {
    if participant.grain() < sacks {
        return Err(Rejection::InsufficientGrain {
            needed: sacks,
            available: participant.grain(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(in_range(1, 1, 20, "Sacks").is_ok());
        assert!(in_range(20, 1, 20, "Sacks").is_ok());
        assert_eq!(
            in_range(21, 1, 20, "Sacks"),
            Err(Rejection::OutOfRange {
                what: "Sacks",
                min: 1,
                max: 20
            })
        );
    }

    #[test]
    fn text_is_trimmed_and_bounded() {
        assert_eq!(text("  hello ", 10), Ok("hello".to_owned()));
        assert_eq!(text("   ", 10), Err(Rejection::EmptyText));
        assert_eq!(text("abcdef", 5), Err(Rejection::TooLong { max: 5 }));
    }

    #[test]
    fn self_is_not_a_counterpart() {
        let ledger = Ledger::new();
        let pid = ParticipantId::new();
        assert_eq!(
            counterpart(&ledger, pid, pid).map(|p| p.id),
            Err(Rejection::SelfTarget)
        );
    }
}
