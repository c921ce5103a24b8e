//! The request-layer entry points.
//!
//! A request handler that has established who is calling hands the
//! participant id and the parsed [`Action`] to [`Simulation::submit`]. The
//! gateway then:
//!
//! 1. Locks the world.
//! 2. Creates, touches, or revives the participant.
//! 3. Enforces the per-participant action cooldown.
//! 4. Runs the once-per-UTC-day bootstrap tick if this is the first contact
//!    of a new day.
//! 5. Applies the action and captures a snapshot.
//! 6. Releases the lock, then saves the snapshot best effort.
//!
//! Snapshots are numbered under the lock. A save that lost the race to a
//! newer one is skipped, so the store never moves backwards.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use breadline_actions::Rejection;
use breadline_ledger::Ledger;
use breadline_types::{Action, ActionOutcome, ParticipantId, ParticipantView, PolicyView, WorldView};

use crate::clock::{self, ClockError, TickCadence};
use crate::config::{HousekeepingConfig, SchedulerConfig, SimulationConfig};
use crate::housekeeping::{self, HousekeepingReport};
use crate::persistence::SnapshotStore;
use crate::projection;
use crate::scheduler;
use crate::serializer::{Authority, SharedWorld};
use crate::tick::{TickError, TickSummary};

/// The simulation as seen by request handlers and the scheduler.
#[derive(Debug)]
pub struct Simulation<S> {
    world: SharedWorld,
    store: S,
    cadence: TickCadence,
    scheduler: SchedulerConfig,
    housekeeping: HousekeepingConfig,
    action_cooldown_ms: i64,
    revision: AtomicU64,
    persisted: Mutex<u64>,
}

impl<S: SnapshotStore> Simulation<S> {
    /// Assemble a simulation around an existing world and store.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] if the configured tick interval is invalid.
    pub fn new(
        world: SharedWorld,
        store: S,
        config: &SimulationConfig,
    ) -> Result<Self, ClockError> {
        Ok(Self {
            world,
            store,
            cadence: config.scheduler.cadence()?,
            scheduler: config.scheduler.clone(),
            housekeeping: config.housekeeping.clone(),
            action_cooldown_ms: config.gateway.action_cooldown_ms,
            revision: AtomicU64::new(0),
            persisted: Mutex::new(0),
        })
    }

    /// The locked world.
    pub const fn world(&self) -> &SharedWorld {
        &self.world
    }

    /// The snapshot store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Scheduler settings.
    pub const fn scheduler_config(&self) -> &SchedulerConfig {
        &self.scheduler
    }

    /// Apply one action on behalf of `pid`.
    pub async fn submit(
        &self,
        pid: ParticipantId,
        action: &Action,
        now: DateTime<Utc>,
    ) -> ActionOutcome {
        let (outcome, snapshot) = {
            let mut guard = self.world.lock().await;
            let authority = &mut *guard;
            housekeeping::contact(&mut authority.ledger, pid, now, &mut authority.rng);
            if self.cooling_down(&authority.ledger, pid, now) {
                return ActionOutcome::rejected(Rejection::TooSoon.to_string());
            }
            bootstrap(authority, now);
            let outcome = authority.apply(pid, action, now);
            (outcome, self.capture(&authority.ledger))
        };
        self.persist(&snapshot).await;
        outcome
    }

    /// Record a page view from `pid` without acting.
    pub async fn touch(&self, pid: ParticipantId, now: DateTime<Utc>) {
        let snapshot = {
            let mut guard = self.world.lock().await;
            let authority = &mut *guard;
            housekeeping::contact(&mut authority.ledger, pid, now, &mut authority.rng);
            bootstrap(authority, now);
            self.capture(&authority.ledger)
        };
        self.persist(&snapshot).await;
    }

    /// Run one tick if someone is online and the cadence has elapsed.
    ///
    /// # Errors
    ///
    /// Propagates [`TickError`] from the tick engine.
    pub async fn tick_if_due(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<TickSummary>, TickError> {
        let (summary, snapshot) = {
            let mut guard = self.world.lock().await;
            if !scheduler::should_tick(
                &guard.ledger,
                now,
                self.cadence,
                self.scheduler.online_window_secs,
            ) {
                return Ok(None);
            }
            let summary = guard.advance(now)?;
            (summary, self.capture(&guard.ledger))
        };
        self.persist(&snapshot).await;
        Ok(Some(summary))
    }

    /// Retire absent participants and prune stale records.
    pub async fn housekeep(&self, now: DateTime<Utc>) -> HousekeepingReport {
        let (report, snapshot) = {
            let mut guard = self.world.lock().await;
            let report = housekeeping::sweep(&mut guard.ledger, now, &self.housekeeping);
            (report, self.capture(&guard.ledger))
        };
        self.persist(&snapshot).await;
        report
    }

    /// The public state of the city.
    pub async fn world_view(&self) -> WorldView {
        projection::world_view(&self.world.lock().await.ledger)
    }

    /// Seats, levers, and the treasury.
    pub async fn policy_view(&self) -> PolicyView {
        projection::policy_view(&self.world.lock().await.ledger)
    }

    /// Everything `pid` sees on their page.
    pub async fn participant_view(
        &self,
        pid: ParticipantId,
        now: DateTime<Utc>,
    ) -> Option<ParticipantView> {
        projection::participant_view(&self.world.lock().await.ledger, pid, now)
    }

    /// Consume the one-shot notice for `pid`.
    pub async fn take_toast(&self, pid: ParticipantId) -> Option<String> {
        self.world
            .lock()
            .await
            .ledger
            .participant_mut(pid)
            .and_then(|p| p.toast.take())
    }

    fn cooling_down(&self, ledger: &Ledger, pid: ParticipantId, now: DateTime<Utc>) -> bool {
        ledger
            .participant(pid)
            .and_then(|p| p.last_action_at)
            .is_some_and(|last| {
                now.signed_duration_since(last).num_milliseconds() < self.action_cooldown_ms
            })
    }

    /// Clone the ledger and number the copy. Call with the world locked.
    fn capture(&self, ledger: &Ledger) -> Snapshot {
        Snapshot {
            revision: self.revision.fetch_add(1, Ordering::AcqRel).saturating_add(1),
            ledger: ledger.clone(),
        }
    }

    async fn persist(&self, snapshot: &Snapshot) {
        let mut persisted = self.persisted.lock().await;
        if snapshot.revision <= *persisted {
            debug!(
                revision = snapshot.revision,
                latest = *persisted,
                "Skipping superseded snapshot"
            );
            return;
        }
        match self.store.save(&snapshot.ledger).await {
            Ok(()) => *persisted = snapshot.revision,
            Err(e) => {
                let tick = snapshot.ledger.world.tick_count;
                warn!(error = %e, tick, "Snapshot save failed");
            }
        }
    }
}

/// A ledger copy taken under the lock, numbered in lock order.
struct Snapshot {
    revision: u64,
    ledger: Ledger,
}

/// Run the once-per-UTC-day tick on the first contact of a new day.
///
/// There is no catch-up: a world left alone for a week gets one tick.
fn bootstrap(authority: &mut Authority, now: DateTime<Utc>) -> Option<TickSummary> {
    if !clock::is_new_day(authority.ledger.last_bootstrap_date, now) {
        return None;
    }
    authority.ledger.last_bootstrap_date = Some(clock::utc_day(now));
    match authority.advance(now) {
        Ok(summary) => {
            info!(tick = summary.tick, day = %clock::utc_day(now), "Daily bootstrap tick");
            Some(summary)
        }
        Err(e) => {
            error!(error = %e, "Bootstrap tick failed");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::OutcomeStatus;

    use super::*;
    use crate::persistence::MemoryStore;

    fn simulation() -> Simulation<MemoryStore> {
        let world = SharedWorld::with_rng(Ledger::new(), SmallRng::seed_from_u64(17));
        Simulation::new(world, MemoryStore::new(), &SimulationConfig::default()).unwrap()
    }

    fn later(now: DateTime<Utc>, millis: i64) -> DateTime<Utc> {
        now.checked_add_signed(TimeDelta::try_milliseconds(millis).unwrap())
            .unwrap()
    }

    #[tokio::test]
    async fn first_contact_registers_and_bootstraps_once() {
        let sim = simulation();
        let pid = ParticipantId::new();
        let now = Utc::now();
        sim.touch(pid, now).await;
        sim.touch(pid, later(now, 5_000)).await;
        let ledger = sim.world().snapshot().await;
        assert!(ledger.participant(pid).is_some());
        assert_eq!(ledger.world.tick_count, 1);
        assert_eq!(ledger.last_bootstrap_date, Some(clock::utc_day(now)));
        assert_eq!(sim.store().saves().await, 2);
    }

    #[tokio::test]
    async fn cooldown_rejects_rapid_actions() {
        let sim = simulation();
        let pid = ParticipantId::new();
        let now = Utc::now();
        let action = Action::Chat {
            text: "bread!".to_owned(),
        };
        assert!(sim.submit(pid, &action, now).await.is_applied());
        let rushed = sim.submit(pid, &action, later(now, 200)).await;
        assert_eq!(rushed.status, OutcomeStatus::Rejected);
        assert_eq!(rushed.message, Rejection::TooSoon.to_string());
        assert!(sim.submit(pid, &action, later(now, 2_000)).await.is_applied());
    }

    #[tokio::test]
    async fn toast_is_taken_once() {
        let sim = simulation();
        let pid = ParticipantId::new();
        sim.submit(
            pid,
            &Action::Chat {
                text: "hello".to_owned(),
            },
            Utc::now(),
        )
        .await;
        assert!(sim.take_toast(pid).await.is_some());
        assert!(sim.take_toast(pid).await.is_none());
    }

    #[tokio::test]
    async fn scheduler_gate_needs_someone_online() {
        let sim = simulation();
        let now = Utc::now();
        assert_eq!(sim.tick_if_due(now).await.unwrap(), None);
        sim.touch(ParticipantId::new(), now).await;
        let due = later(now, 121_000);
        assert!(sim.tick_if_due(due).await.unwrap().is_some());
        assert_eq!(sim.tick_if_due(later(due, 1_000)).await.unwrap(), None);
    }
}
