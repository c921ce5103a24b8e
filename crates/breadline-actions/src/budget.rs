//! Daily high-impact budget.
//!
//! Counters live on the participant's [`DailyTally`] and reset on the first
//! action of a new UTC date.
//!
//! [`DailyTally`]: breadline_types::DailyTally

use chrono::{DateTime, Utc};

use breadline_ledger::rules;
use breadline_types::Participant;

use crate::error::Rejection;

/// Reset the tally if `now` falls on a new UTC date.
pub fn roll(participant: &mut Participant, now: DateTime<Utc>) {
    participant.roll_daily(now.date_naive());
}

/// Reject when today's high-impact actions are spent.
pub const fn ensure_available(participant: &Participant) -> Result<(), Rejection> {
    if participant.has_high_impact_left(rules::DAILY_HIGH_IMPACT_BUDGET) {
        Ok(())
    } else {
        Err(Rejection::HighImpactSpent)
    }
}

/// High-impact actions left today.
pub const fn remaining(participant: &Participant) -> u32 {
    rules::DAILY_HIGH_IMPACT_BUDGET.saturating_sub(participant.daily.high_impact_used)
}

/// Reject when today's completion cap is reached.
pub const fn ensure_completion_room(participant: &Participant) -> Result<(), Rejection> {
    if participant.daily.contracts_completed < rules::DAILY_COMPLETION_CAP {
        Ok(())
    } else {
        Err(Rejection::DailyCap)
    }
}
