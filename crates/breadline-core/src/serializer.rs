//! The single lock around the ledger.
//!
//! [`SharedWorld`] is the only way into the [`Ledger`] at runtime. Request
//! handlers and the scheduler both lock it, do their in-memory work, and
//! release it before any I/O. Because the lock covers validation, effect,
//! and log emission together, every state transition is totally ordered.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::{Mutex, MutexGuard};

use breadline_actions::apply_action;
use breadline_ledger::Ledger;
use breadline_types::{Action, ActionOutcome, ParticipantId};

use crate::tick::{self, TickError, TickSummary};

/// Everything the lock protects: the ledger and the generator that drives it.
#[derive(Debug)]
pub struct Authority {
    /// The shared world.
    pub ledger: Ledger,
    /// Process-local randomness for ticks and actions.
    pub rng: SmallRng,
}

impl Authority {
    /// Advance the world by one tick.
    ///
    /// # Errors
    ///
    /// Propagates [`TickError`] from the tick engine.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<TickSummary, TickError> {
        tick::advance_tick(&mut self.ledger, now, &mut self.rng)
    }

    /// Apply one participant action.
    pub fn apply(
        &mut self,
        pid: ParticipantId,
        action: &Action,
        now: DateTime<Utc>,
    ) -> ActionOutcome {
        apply_action(&mut self.ledger, pid, action, now, &mut self.rng)
    }
}

/// Cloneable handle to the locked world.
#[derive(Debug, Clone)]
pub struct SharedWorld {
    inner: Arc<Mutex<Authority>>,
}

impl SharedWorld {
    /// Wrap a ledger with an OS-seeded generator.
    pub fn new(ledger: Ledger) -> Self {
        Self::with_rng(ledger, SmallRng::from_os_rng())
    }

    /// Wrap a ledger with a caller-supplied generator.
    pub fn with_rng(mut ledger: Ledger, rng: SmallRng) -> Self {
        ledger.normalize();
        Self {
            inner: Arc::new(Mutex::new(Authority { ledger, rng })),
        }
    }

    /// Acquire exclusive access.
    pub async fn lock(&self) -> MutexGuard<'_, Authority> {
        self.inner.lock().await
    }

    /// A consistent copy of the ledger.
    pub async fn snapshot(&self) -> Ledger {
        self.inner.lock().await.ledger.clone()
    }
}
