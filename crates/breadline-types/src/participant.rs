//! Participants: the players of the shared world.
//!
//! Gold, grain, reputation, and heat are private and bounded. Debits fail
//! with [`Shortfall`] rather than going negative; signed adjustments clamp
//! into their legal range.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{District, Standing};
use crate::ids::ParticipantId;

/// Lowest possible reputation.
pub const REPUTATION_MIN: i32 = -100;
/// Highest possible reputation.
pub const REPUTATION_MAX: i32 = 100;
/// Highest possible heat.
pub const HEAT_MAX: u32 = 20;

/// A debit that would have taken a balance below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("needed {needed}, had {available}")]
pub struct Shortfall {
    /// Amount requested.
    pub needed: u32,
    /// Amount actually held.
    pub available: u32,
}

/// A trip between districts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journey {
    /// Where the participant is heading.
    pub destination: District,
    /// Ticks until arrival.
    pub remaining_ticks: u32,
    /// Length of the whole trip.
    pub total_ticks: u32,
}

/// Per-UTC-day counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTally {
    /// The day the counters belong to.
    pub date: NaiveDate,
    /// Contracts completed today.
    pub contracts_completed: u32,
    /// High-impact actions used today.
    pub high_impact_used: u32,
}

impl DailyTally {
    /// Fresh counters for `date`.
    pub const fn new(date: NaiveDate) -> Self {
        Self {
            date,
            contracts_completed: 0,
            high_impact_used: 0,
        }
    }
}

/// A player of the shared world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable identifier.
    pub id: ParticipantId,
    /// Generated display name.
    pub name: String,
    gold: u32,
    grain: u32,
    reputation: i32,
    heat: u32,
    /// Tokens that make rumors free to spread.
    pub rumor_tokens: u32,
    /// Daily counters.
    pub daily: DailyTally,
    /// Ticks of protection against smears.
    pub ritual_immunity_ticks: u32,
    /// Ticks of purchased institutional access.
    pub access_ticks: u32,
    /// Ticks left on a trade permit.
    pub permit_ticks: u32,
    /// Current district.
    pub location: District,
    /// Trip in progress, if any.
    pub journey: Option<Journey>,
    /// Last time the participant was seen.
    pub last_seen: DateTime<Utc>,
    /// Last time an action was accepted for this participant.
    pub last_action_at: Option<DateTime<Utc>>,
    /// Last manual delivery attempt.
    pub last_delivery_at: Option<DateTime<Utc>>,
    /// One-shot notice shown on the next page view.
    pub toast: Option<String>,
    /// Lifecycle standing.
    pub standing: Standing,
    /// When the participant first appeared.
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    /// A new participant in the Market with empty purses.
    pub fn new(id: ParticipantId, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            gold: 0,
            grain: 0,
            reputation: 0,
            heat: 0,
            rumor_tokens: 0,
            daily: DailyTally::new(now.date_naive()),
            ritual_immunity_ticks: 0,
            access_ticks: 0,
            permit_ticks: 0,
            location: District::Market,
            journey: None,
            last_seen: now,
            last_action_at: None,
            last_delivery_at: None,
            toast: None,
            standing: Standing::Active,
            joined_at: now,
        }
    }

    /// Gold held.
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Grain sacks held.
    pub const fn grain(&self) -> u32 {
        self.grain
    }

    /// Reputation, -100..=100.
    pub const fn reputation(&self) -> i32 {
        self.reputation
    }

    /// Heat, 0..=20.
    pub const fn heat(&self) -> u32 {
        self.heat
    }

    /// Add gold.
    pub const fn credit_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Remove gold, failing if the purse is too light.
    pub const fn debit_gold(&mut self, amount: u32) -> Result<(), Shortfall> {
        match self.gold.checked_sub(amount) {
            Some(rest) => {
                self.gold = rest;
                Ok(())
            }
            None => Err(Shortfall {
                needed: amount,
                available: self.gold,
            }),
        }
    }

    /// Add grain sacks.
    pub const fn credit_grain(&mut self, amount: u32) {
        self.grain = self.grain.saturating_add(amount);
    }

    /// Remove grain sacks, failing if too few are held.
    pub const fn debit_grain(&mut self, amount: u32) -> Result<(), Shortfall> {
        match self.grain.checked_sub(amount) {
            Some(rest) => {
                self.grain = rest;
                Ok(())
            }
            None => Err(Shortfall {
                needed: amount,
                available: self.grain,
            }),
        }
    }

    /// Shift reputation, clamped to -100..=100.
    pub fn adjust_reputation(&mut self, delta: i32) {
        self.reputation = self
            .reputation
            .saturating_add(delta)
            .clamp(REPUTATION_MIN, REPUTATION_MAX);
    }

    /// Shift heat, clamped to 0..=20.
    pub fn adjust_heat(&mut self, delta: i32) {
        let next = i64::from(self.heat)
            .saturating_add(i64::from(delta))
            .clamp(0, i64::from(HEAT_MAX));
        self.heat = u32::try_from(next).unwrap_or(0);
    }

    /// Whether the participant is mid-journey.
    pub const fn is_traveling(&self) -> bool {
        self.journey.is_some()
    }

    /// Whether the participant was seen within `window_secs` of `now`.
    pub fn is_online(&self, now: DateTime<Utc>, window_secs: i64) -> bool {
        self.standing == Standing::Active
            && now.signed_duration_since(self.last_seen).num_seconds() <= window_secs
    }

    /// Record a request from this participant.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
        if self.standing == Standing::Dormant {
            self.standing = Standing::Active;
        }
    }

    /// Reset daily counters when the UTC date changes.
    pub fn roll_daily(&mut self, date: NaiveDate) {
        if self.daily.date != date {
            self.daily = DailyTally::new(date);
        }
    }

    /// Whether the participant may still use a high-impact action today.
    pub const fn has_high_impact_left(&self, budget: u32) -> bool {
        self.daily.high_impact_used < budget
    }

    /// Count one high-impact action against today's budget.
    pub const fn spend_high_impact(&mut self) {
        self.daily.high_impact_used = self.daily.high_impact_used.saturating_add(1);
    }

    /// Whether smears currently slide off this participant.
    pub const fn is_immune(&self) -> bool {
        self.ritual_immunity_ticks > 0
    }

    /// Restart with the given kit, keeping identity and name.
    pub fn reset_resources(&mut self, gold: u32, grain: u32, rumor_tokens: u32) {
        self.gold = gold;
        self.grain = grain;
        self.reputation = 0;
        self.heat = 0;
        self.rumor_tokens = rumor_tokens;
        self.ritual_immunity_ticks = 0;
        self.access_ticks = 0;
        self.permit_ticks = 0;
        self.location = District::Market;
        self.journey = None;
        self.toast = None;
    }

    /// Clamp bounded fields after loading a snapshot.
    pub fn normalize(&mut self) {
        self.reputation = self.reputation.clamp(REPUTATION_MIN, REPUTATION_MAX);
        self.heat = self.heat.min(HEAT_MAX);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fresh() -> Participant {
        Participant::new(ParticipantId::new(), "Ada Miller".to_owned(), Utc::now())
    }

    #[test]
    fn debit_fails_without_funds() {
        let mut p = fresh();
        p.credit_gold(5);
        let err = p.debit_gold(6).unwrap_err();
        assert_eq!(err.needed, 6);
        assert_eq!(err.available, 5);
        assert_eq!(p.gold(), 5);
        p.debit_gold(5).unwrap();
        assert_eq!(p.gold(), 0);
    }

    #[test]
    fn reputation_and_heat_clamp() {
        let mut p = fresh();
        p.adjust_reputation(250);
        assert_eq!(p.reputation(), REPUTATION_MAX);
        p.adjust_reputation(-500);
        assert_eq!(p.reputation(), REPUTATION_MIN);
        p.adjust_heat(-3);
        assert_eq!(p.heat(), 0);
        p.adjust_heat(99);
        assert_eq!(p.heat(), HEAT_MAX);
    }

    #[test]
    fn daily_counters_roll_on_new_date() {
        let mut p = fresh();
        p.spend_high_impact();
        p.spend_high_impact();
        assert!(p.has_high_impact_left(3));
        p.spend_high_impact();
        assert!(!p.has_high_impact_left(3));
        let tomorrow = p.daily.date.succ_opt().unwrap();
        p.roll_daily(tomorrow);
        assert_eq!(p.daily.high_impact_used, 0);
    }

    #[test]
    fn online_window_respects_standing() {
        let now = Utc::now();
        let mut p = fresh();
        p.touch(now);
        assert!(p.is_online(now, 120));
        p.standing = Standing::Retired;
        assert!(!p.is_online(now, 120));
    }
}
