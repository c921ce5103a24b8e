//! Market stall actions: buying, selling, relief, and bribes.

use rand::Rng;

use breadline_ledger::{Ledger, rules};
use breadline_types::{EventKind, SeatHolder, SeatKind};

use super::{Turn, roll_pct};
use crate::error::Rejection;
use crate::pricing::{quote_buy, quote_sell};
use crate::validation;

/// Buy sacks from the public stores.
pub fn buy_grain(ledger: &mut Ledger, turn: Turn, sacks: u32) -> Result<String, Rejection> {
    let buyer = validation::actor(ledger, turn.pid)?;
    validation::not_traveling(buyer)?;
    validation::in_range(sacks, 1, rules::MAX_MARKET_SACKS, "Sacks")?;
    let restricted = ledger.world.is_market_restricted();
    if restricted && sacks > rules::RESTRICTED_MAX_SACKS {
        return Err(Rejection::MarketRestricted {
            max: rules::RESTRICTED_MAX_SACKS,
        });
    }
    if ledger.world.grain_supply() < sacks {
        return Err(Rejection::StoresEmpty {
            available: ledger.world.grain_supply(),
        });
    }
    let quote = quote_buy(
        ledger.world.grain_tier(),
        ledger.policy.tax_rate_pct,
        restricted,
        sacks,
    );
    validation::gold(buyer, quote.total)?;

    let buyer = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    buyer.debit_gold(quote.total).map_err(Rejection::gold)?;
    buyer.credit_grain(sacks);
    ledger.world.remove_grain(sacks);
    ledger.credit_treasury(quote.tax);
    Ok(format!("You buy {sacks} sacks for {} gold.", quote.total))
}

/// Sell sacks to the public stores.
pub fn sell_grain(ledger: &mut Ledger, turn: Turn, sacks: u32) -> Result<String, Rejection> {
    let seller = validation::actor(ledger, turn.pid)?;
    validation::not_traveling(seller)?;
    validation::in_range(sacks, 1, rules::MAX_MARKET_SACKS, "Sacks")?;
    validation::grain(seller, sacks)?;
    let quote = quote_sell(ledger.world.grain_tier(), ledger.policy.tax_rate_pct, sacks);

    let seller = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    seller.debit_grain(sacks).map_err(Rejection::grain)?;
    seller.credit_gold(quote.total);
    ledger.world.add_grain(sacks);
    ledger.credit_treasury(quote.tax);
    Ok(format!("You sell {sacks} sacks for {} gold.", quote.total))
}

/// Give sacks to the public stores for the hungry.
pub fn donate_relief(ledger: &mut Ledger, turn: Turn, sacks: u32) -> Result<String, Rejection> {
    let donor = validation::actor(ledger, turn.pid)?;
    validation::in_range(sacks, 1, rules::MAX_RELIEF_SACKS, "Sacks")?;
    validation::grain(donor, sacks)?;
    let name = donor.name.clone();
    let reputation = (sacks / 5).max(1);

    let donor = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    donor.debit_grain(sacks).map_err(Rejection::grain)?;
    donor.adjust_reputation(i32::try_from(reputation).unwrap_or(i32::MAX));
    ledger.world.add_grain(sacks);
    ledger
        .world
        .adjust_unrest(i32::try_from(sacks / 3).unwrap_or(0).saturating_neg());
    ledger.announce(
        turn.now,
        EventKind::World,
        format!("{name} hands out {sacks} sacks of relief grain."),
    );
    Ok(format!("You donate {sacks} sacks. The crowd remembers."))
}

/// Bribe the watch to look away.
pub fn bribe<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    turn: Turn,
    gold: u32,
    rng: &mut R,
) -> Result<String, Rejection> {
    let briber = validation::actor(ledger, turn.pid)?;
    validation::in_range(gold, rules::BRIBE_MIN, rules::BRIBE_MAX, "Bribe")?;
    validation::gold(briber, gold)?;
    let name = briber.name.clone();
    let caught = roll_pct(rng, rules::BRIBE_CAUGHT_CHANCE_PCT);
    let magistrate = ledger
        .seats
        .get(&SeatKind::Magistrate)
        .and_then(|s| match s.holder {
            SeatHolder::Participant(pid) if pid != turn.pid => Some(pid),
            _ => None,
        });

    let briber = ledger
        .participant_mut(turn.pid)
        .ok_or(Rejection::UnknownParticipant)?;
    briber.debit_gold(gold).map_err(Rejection::gold)?;
    if caught {
        briber.adjust_heat(rules::BRIBE_CAUGHT_HEAT);
        briber.adjust_reputation(rules::BRIBE_CAUGHT_REPUTATION);
        ledger.credit_treasury(gold);
        ledger.announce(
            turn.now,
            EventKind::World,
            format!("{name} is caught slipping coin to the watch."),
        );
        tracing::info!(participant = %turn.pid, gold, "Bribe caught");
        return Ok("The watch takes your gold and your name.".to_owned());
    }
    briber.adjust_heat(i32::try_from(gold / 5).unwrap_or(0).saturating_neg());
    match magistrate.and_then(|pid| ledger.participant_mut(pid)) {
        Some(official) => official.credit_gold(gold),
        None => ledger.credit_treasury(gold),
    }
    Ok(format!("The watch pockets {gold} gold and forgets your face."))
}
