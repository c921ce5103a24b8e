//! The world singleton: clock, grain economy, and unrest.
//!
//! Grain supply and unrest are private. Every mutation goes through a
//! setter that clamps the value, recomputes the derived tier, and refreshes
//! the narrative situation line, so a stored tier can never disagree with
//! its numeric source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{GrainTier, Phase, UnrestTier};

/// Upper bound of the unrest scale.
pub const UNREST_MAX: u32 = 100;

/// Global world state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    /// Simulated day number, starting at 1.
    pub day: u32,
    /// Current half of the day.
    pub phase: Phase,
    /// Number of ticks applied since genesis.
    pub tick_count: u64,
    /// Grain in the public stores.
    grain_supply: u32,
    /// Derived from `grain_supply`.
    grain_tier: GrainTier,
    /// Social unrest, 0--100.
    unrest: u32,
    /// Derived from `unrest`.
    unrest_tier: UnrestTier,
    /// Narrative summary derived from both tiers.
    situation: String,
    /// Ticks left on the emergency market restriction.
    pub market_restriction_ticks: u32,
    /// Consecutive ticks spent in the Critical grain tier.
    pub critical_streak: u32,
    /// Whether the one-shot famine penalty fired during the current streak.
    pub critical_penalty_applied: bool,
    /// Ticks left on the spoilage-relief buff granted by a canal.
    pub decay_relief_ticks: u32,
    /// Wall-clock time of the most recent tick.
    pub last_tick_at: Option<DateTime<Utc>>,
}

impl World {
    /// Create a world on day 1 with the given grain supply and unrest.
    pub fn new(grain_supply: u32, unrest: u32) -> Self {
        let mut world = Self {
            day: 1,
            phase: Phase::Morning,
            tick_count: 0,
            grain_supply,
            grain_tier: GrainTier::from_supply(grain_supply),
            unrest: unrest.min(UNREST_MAX),
            unrest_tier: UnrestTier::from_unrest(unrest.min(UNREST_MAX)),
            situation: String::new(),
            market_restriction_ticks: 0,
            critical_streak: 0,
            critical_penalty_applied: false,
            decay_relief_ticks: 0,
            last_tick_at: None,
        };
        world.refresh_derived();
        world
    }

    /// Grain in the public stores.
    pub const fn grain_supply(&self) -> u32 {
        self.grain_supply
    }

    /// Current grain tier.
    pub const fn grain_tier(&self) -> GrainTier {
        self.grain_tier
    }

    /// Current unrest value.
    pub const fn unrest(&self) -> u32 {
        self.unrest
    }

    /// Current unrest tier.
    pub const fn unrest_tier(&self) -> UnrestTier {
        self.unrest_tier
    }

    /// Narrative summary of the current tiers.
    pub fn situation(&self) -> &str {
        &self.situation
    }

    /// Whether the emergency market restriction is in force.
    pub const fn is_market_restricted(&self) -> bool {
        self.market_restriction_ticks > 0
    }

    /// Replace the grain supply.
    pub fn set_grain_supply(&mut self, supply: u32) {
        self.grain_supply = supply;
        self.refresh_derived();
    }

    /// Add grain to the public stores.
    pub fn add_grain(&mut self, amount: u32) {
        self.set_grain_supply(self.grain_supply.saturating_add(amount));
    }

    /// Remove up to `amount` grain, flooring at zero. Returns what was removed.
    pub fn remove_grain(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.grain_supply);
        self.set_grain_supply(self.grain_supply.saturating_sub(removed));
        removed
    }

    /// Apply a signed grain delta, flooring at zero.
    pub fn adjust_grain(&mut self, delta: i64) {
        let next = i64::from(self.grain_supply).saturating_add(delta).max(0);
        self.set_grain_supply(u32::try_from(next).unwrap_or(u32::MAX));
    }

    /// Replace the unrest value, clamped to 0--100.
    pub fn set_unrest(&mut self, value: u32) {
        self.unrest = value.min(UNREST_MAX);
        self.refresh_derived();
    }

    /// Apply a signed unrest delta, clamped to 0--100.
    pub fn adjust_unrest(&mut self, delta: i32) {
        let next = i64::from(self.unrest).saturating_add(i64::from(delta));
        let clamped = next.clamp(0, i64::from(UNREST_MAX));
        self.set_unrest(u32::try_from(clamped).unwrap_or(0));
    }

    /// Re-derive tiers and the situation line from the stored numbers.
    ///
    /// Called after loading a snapshot so that a hand-edited or stale file
    /// cannot smuggle in a mismatched tier.
    pub fn normalize(&mut self) {
        self.unrest = self.unrest.min(UNREST_MAX);
        self.refresh_derived();
    }

    fn refresh_derived(&mut self) {
        self.grain_tier = GrainTier::from_supply(self.grain_supply);
        self.unrest_tier = UnrestTier::from_unrest(self.unrest);
        situation_for(self.grain_tier, self.unrest_tier).clone_into(&mut self.situation);
    }
}

/// Narrative line describing the city for a pair of tiers.
pub const fn situation_for(grain: GrainTier, unrest: UnrestTier) -> &'static str {
    match (grain, unrest) {
        (GrainTier::Stable, UnrestTier::Calm) => {
            "The granaries are full and the streets are quiet."
        }
        (GrainTier::Stable, UnrestTier::Uneasy) => {
            "Bread is plentiful, yet the taverns mutter about the council."
        }
        (GrainTier::Stable, _) => "Full bellies have not stopped angry crowds from gathering.",
        (GrainTier::Tight, UnrestTier::Calm | UnrestTier::Uneasy) => {
            "Bakers ration their loaves and queues grow longer."
        }
        (GrainTier::Tight, _) => "Thin rations and hot tempers fill the market square.",
        (GrainTier::Scarce, UnrestTier::Calm | UnrestTier::Uneasy) => {
            "Empty shelves line the market; smugglers are doing brisk trade."
        }
        (GrainTier::Scarce, _) => "Hunger stalks the wards and the watch is stretched thin.",
        (GrainTier::Critical, UnrestTier::Rioting) => {
            "Famine and riot: the city is tearing itself apart."
        }
        (GrainTier::Critical, _) => "The granary floor is bare. The city is starving.",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_world_derives_tiers() {
        let world = World::new(300, 10);
        assert_eq!(world.grain_tier(), GrainTier::Stable);
        assert_eq!(world.unrest_tier(), UnrestTier::Calm);
        assert_eq!(
            world.situation(),
            situation_for(GrainTier::Stable, UnrestTier::Calm)
        );
    }

    #[test]
    fn grain_floors_at_zero() {
        let mut world = World::new(10, 0);
        assert_eq!(world.remove_grain(25), 10);
        assert_eq!(world.grain_supply(), 0);
        world.adjust_grain(-5);
        assert_eq!(world.grain_supply(), 0);
        assert_eq!(world.grain_tier(), GrainTier::Critical);
    }

    #[test]
    fn unrest_is_clamped() {
        let mut world = World::new(300, 95);
        world.adjust_unrest(40);
        assert_eq!(world.unrest(), 100);
        world.adjust_unrest(-250);
        assert_eq!(world.unrest(), 0);
        world.set_unrest(180);
        assert_eq!(world.unrest(), UNREST_MAX);
    }

    #[test]
    fn situation_follows_tier_changes() {
        let mut world = World::new(300, 0);
        let before = world.situation().to_owned();
        world.set_grain_supply(10);
        assert_ne!(world.situation(), before);
        assert_eq!(
            world.situation(),
            situation_for(GrainTier::Critical, UnrestTier::Calm)
        );
    }

    #[test]
    fn normalize_repairs_tiers_after_deserialize() {
        let world = World::new(300, 0);
        let mut json = serde_json::to_value(&world).unwrap();
        json["grain_supply"] = serde_json::json!(20);
        let mut restored: World = serde_json::from_value(json).unwrap();
        assert_eq!(restored.grain_supply(), 20);
        restored.normalize();
        assert_eq!(restored.grain_tier(), GrainTier::Critical);
    }
}
