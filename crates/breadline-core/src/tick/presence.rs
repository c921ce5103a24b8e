//! Per-participant countdowns.

use breadline_ledger::Ledger;

pub(super) fn step(ledger: &mut Ledger) {
    for p in ledger.participants.values_mut() {
        p.ritual_immunity_ticks = p.ritual_immunity_ticks.saturating_sub(1);
        p.access_ticks = p.access_ticks.saturating_sub(1);
        p.permit_ticks = p.permit_ticks.saturating_sub(1);
    }
}
