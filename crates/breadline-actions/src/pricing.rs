//! Market prices and contract payouts.
//!
//! All fractional math runs in [`Decimal`] and is rounded back to whole
//! gold at the end: buy prices round up, sell prices and payouts round
//! down. Intermediate overflow saturates rather than panicking.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use breadline_ledger::rules;
use breadline_types::{ContractKind, GrainTier, Stance};

/// `value` percent as a multiplier.
fn pct(value: u32) -> Decimal {
    Decimal::new(i64::from(value), 2)
}

fn mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or(Decimal::MAX)
}

fn whole(value: Decimal) -> u32 {
    value.to_u32().unwrap_or(if value.is_sign_negative() { 0 } else { u32::MAX })
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// A priced market order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Gold changing hands.
    pub total: u32,
    /// Share of the total owed to the treasury.
    pub tax: u32,
}

/// Price of one sack bought from the stores, tax included.
pub fn buy_unit_price(tier: GrainTier, tax_pct: u32, restricted: bool) -> u32 {
    let surcharge = if restricted {
        pct(rules::RESTRICTED_PRICE_PCT)
    } else {
        Decimal::ONE
    };
    let base = mul(Decimal::from(rules::base_sack_price(tier)), surcharge);
    whole(mul(base, pct(100_u32.saturating_add(tax_pct))).ceil())
}

/// Price of one sack sold to the stores, after tax.
pub fn sell_unit_price(tier: GrainTier, tax_pct: u32) -> u32 {
    let gross = mul(
        Decimal::from(rules::base_sack_price(tier)),
        pct(rules::SELL_PRICE_PCT),
    );
    let net = mul(gross, pct(100_u32.saturating_sub(tax_pct)));
    whole(net.floor()).max(1)
}

/// Quote for buying `sacks`.
pub fn quote_buy(tier: GrainTier, tax_pct: u32, restricted: bool, sacks: u32) -> Quote {
    let total = buy_unit_price(tier, tax_pct, restricted).saturating_mul(sacks);
    let untaxed = buy_unit_price(tier, 0, restricted).saturating_mul(sacks);
    Quote {
        total,
        tax: total.saturating_sub(untaxed),
    }
}

/// Quote for selling `sacks`. `total` is what the seller receives.
pub fn quote_sell(tier: GrainTier, tax_pct: u32, sacks: u32) -> Quote {
    let total = sell_unit_price(tier, tax_pct).saturating_mul(sacks);
    let untaxed = sell_unit_price(tier, 0).saturating_mul(sacks);
    Quote {
        total,
        tax: untaxed.saturating_sub(total),
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Base gold for an ordinary contract kind.
pub const fn base_reward(kind: ContractKind) -> u32 {
    match kind {
        ContractKind::Emergency => rules::EMERGENCY_GOLD,
        ContractKind::Smuggling => rules::SMUGGLING_GOLD,
        ContractKind::Supply | ContractKind::Bounty => 0,
    }
}

/// Pay multiplier of a stance, percent.
pub const fn stance_pct(stance: Stance) -> u32 {
    match stance {
        Stance::Careful => 85,
        Stance::Fast => 115,
        Stance::Quiet => 95,
    }
}

/// Reputation pay multiplier, percent, clamped to 75--150.
pub fn reputation_pct(reputation: i32) -> u32 {
    let raw = i64::from(reputation)
        .checked_div(2)
        .unwrap_or(0)
        .saturating_add(100)
        .clamp(
            rules::REPUTATION_MULTIPLIER_MIN_PCT,
            rules::REPUTATION_MULTIPLIER_MAX_PCT,
        );
    u32::try_from(raw).unwrap_or(100)
}

/// A contract payout split between the worker and the treasury.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    /// Gold paid to the worker.
    pub net: u32,
    /// Gold withheld for the treasury.
    pub tax: u32,
}

/// Payout for an ordinary contract.
///
/// `stance` is `None` only for contracts completed without an owner, which
/// pay at face value.
pub fn contract_payout(
    base: u32,
    stance: Option<Stance>,
    reputation: i32,
    praised: bool,
    tax_pct: u32,
) -> Payout {
    let mut gross = Decimal::from(base);
    if let Some(stance) = stance {
        gross = mul(gross, pct(stance_pct(stance)));
    }
    gross = mul(gross, pct(reputation_pct(reputation)));
    if praised {
        gross = mul(gross, pct(rules::RUMOR_BONUS_PCT));
    }
    let gross = whole(gross.floor());
    let tax = whole(mul(Decimal::from(gross), pct(tax_pct)).floor());
    Payout {
        net: gross.saturating_sub(tax),
        tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_price_applies_tax_and_restriction() {
        assert_eq!(buy_unit_price(GrainTier::Stable, 0, false), 3);
        assert_eq!(buy_unit_price(GrainTier::Stable, 5, false), 4);
        assert_eq!(buy_unit_price(GrainTier::Critical, 10, false), 14);
        assert_eq!(buy_unit_price(GrainTier::Critical, 0, true), 18);
    }

    #[test]
    fn sell_price_never_drops_below_one() {
        assert_eq!(sell_unit_price(GrainTier::Stable, 30), 1);
        assert_eq!(sell_unit_price(GrainTier::Critical, 0), 7);
        assert_eq!(sell_unit_price(GrainTier::Critical, 10), 6);
    }

    #[test]
    fn quotes_split_out_tax() {
        let quote = quote_buy(GrainTier::Scarce, 10, false, 2);
        assert_eq!(quote.total, 18);
        assert_eq!(quote.tax, 2);
        let sale = quote_sell(GrainTier::Critical, 10, 3);
        assert_eq!(sale.total, 18);
        assert_eq!(sale.tax, 3);
    }

    #[test]
    fn reputation_multiplier_is_clamped() {
        assert_eq!(reputation_pct(0), 100);
        assert_eq!(reputation_pct(40), 120);
        assert_eq!(reputation_pct(100), 150);
        assert_eq!(reputation_pct(-100), 75);
    }

    #[test]
    fn payout_combines_factors() {
        // 22 * 1.15 * 1.0 = 25.3 -> 25; tax 5% -> 1.
        let payout = contract_payout(22, Some(Stance::Fast), 0, false, 5);
        assert_eq!(payout, Payout { net: 24, tax: 1 });
        // 14 * 0.85 * 1.5 * 1.1 = 19.635 -> 19.
        let praised = contract_payout(14, Some(Stance::Careful), 100, true, 0);
        assert_eq!(praised, Payout { net: 19, tax: 0 });
    }
}
