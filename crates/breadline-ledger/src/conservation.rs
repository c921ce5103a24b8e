//! Gold and grain conservation audit.
//!
//! Many actions only move value between holders: a participant pays the
//! treasury, a lender hands gold to a borrower, grain leaves the public
//! stores for a participant's sack. For those actions the total held
//! across the world must be the same before and after. The processor
//! captures [`Holdings`] on both sides and calls [`verify`].
//!
//! Sources and sinks (contract rewards, decay, project costs) legitimately
//! change the totals, so actions involving them opt out per resource via
//! [`Audit`].

use crate::ledger::Ledger;

/// Which totals an operation must leave unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Audit {
    /// Gold must be conserved.
    pub gold: bool,
    /// Grain must be conserved.
    pub grain: bool,
}

impl Audit {
    /// Both totals conserved.
    pub const BOTH: Self = Self {
        gold: true,
        grain: true,
    };
    /// Only grain conserved.
    pub const GRAIN_ONLY: Self = Self {
        gold: false,
        grain: true,
    };
    /// Only gold conserved.
    pub const GOLD_ONLY: Self = Self {
        gold: true,
        grain: false,
    };
    /// Nothing checked.
    pub const NONE: Self = Self {
        gold: false,
        grain: false,
    };
}

/// World-wide totals of gold and grain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holdings {
    /// Participants' purses plus escrow plus the treasury.
    pub gold: u64,
    /// Participants' sacks plus the public stores.
    pub grain: u64,
}

impl Holdings {
    /// Sum every holder in the ledger.
    pub fn capture(ledger: &Ledger) -> Self {
        let purses = ledger
            .participants
            .values()
            .map(|p| u64::from(p.gold()))
            .fold(0_u64, u64::saturating_add);
        let sacks = ledger
            .participants
            .values()
            .map(|p| u64::from(p.grain()))
            .fold(0_u64, u64::saturating_add);
        Self {
            gold: purses
                .saturating_add(ledger.escrowed_gold())
                .saturating_add(u64::from(ledger.policy.treasury)),
            grain: sacks.saturating_add(u64::from(ledger.world.grain_supply())),
        }
    }
}

/// A conservation violation: a total changed during a pure transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LedgerAnomaly {
    /// Gold appeared or vanished.
    #[error("gold total drifted from {before} to {after}")]
    Gold {
        /// Total before the operation.
        before: u64,
        /// Total after the operation.
        after: u64,
    },
    /// Grain appeared or vanished.
    #[error("grain total drifted from {before} to {after}")]
    Grain {
        /// Total before the operation.
        before: u64,
        /// Total after the operation.
        after: u64,
    },
}

/// Compare totals captured around an operation.
pub const fn verify(before: Holdings, after: Holdings, audit: Audit) -> Result<(), LedgerAnomaly> {
    if audit.gold && before.gold != after.gold {
        return Err(LedgerAnomaly::Gold {
            before: before.gold,
            after: after.gold,
        });
    }
    if audit.grain && before.grain != after.grain {
        return Err(LedgerAnomaly::Grain {
            before: before.grain,
            after: after.grain,
        });
    }
    Ok(())
}
