//! The background tick loop and its control handle.
//!
//! The loop wakes on a short poll interval and asks the gateway to tick.
//! A tick only happens when at least one participant is online and the
//! configured cadence has elapsed since the last one, so request traffic
//! can never speed simulated time up. Housekeeping runs on its own, much
//! longer, interval.
//!
//! [`SchedulerControl`] is shared between the loop and whoever owns the
//! process. All fields are atomics so the loop never takes a lock just to
//! read them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio::time::{Duration, Instant};
use tracing::{error, info};

use breadline_ledger::Ledger;

use crate::clock::TickCadence;
use crate::gateway::Simulation;
use crate::persistence::SnapshotStore;

/// Whether the scheduler should advance the world at `now`.
pub fn should_tick(
    ledger: &Ledger,
    now: DateTime<Utc>,
    cadence: TickCadence,
    online_window_secs: i64,
) -> bool {
    ledger.any_online(now, online_window_secs) && cadence.is_due(ledger.world.last_tick_at, now)
}

/// Shared pause and stop switches for the scheduler loop.
#[derive(Debug, Default)]
pub struct SchedulerControl {
    paused: AtomicBool,
    resume_notify: Notify,
    stop_requested: AtomicBool,
    stop_notify: Notify,
    ticks_run: AtomicU64,
}

impl SchedulerControl {
    /// A running, unpaused control.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause ticking. Requests are still served.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume ticking and wake the loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the loop is no longer paused.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) {
            self.resume_notify.notified().await;
        }
    }

    /// Ask the loop to exit after its current iteration.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Ticks the loop has run since start.
    pub fn ticks_run(&self) -> u64 {
        self.ticks_run.load(Ordering::Acquire)
    }

    async fn stopped(&self) {
        if !self.is_stop_requested() {
            self.stop_notify.notified().await;
        }
    }
}

/// What the loop did before it exited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    /// Ticks applied.
    pub ticks: u64,
    /// Housekeeping passes run.
    pub housekeeping_runs: u64,
}

/// Drive the world until a stop is requested or a tick fails.
pub async fn run_scheduler<S: SnapshotStore>(
    sim: Arc<Simulation<S>>,
    control: Arc<SchedulerControl>,
) -> SchedulerReport {
    let config = sim.scheduler_config();
    let poll = Duration::from_millis(config.poll_interval_ms.max(1));
    let housekeeping_every = Duration::from_secs(config.housekeeping_interval_secs);
    let mut last_housekeeping: Option<Instant> = None;
    let mut report = SchedulerReport::default();

    info!(
        tick_interval_secs = config.tick_interval_secs,
        poll_interval_ms = config.poll_interval_ms,
        "Scheduler starting"
    );

    loop {
        if control.is_paused() {
            info!("Scheduler paused");
            tokio::select! {
                () = control.wait_if_paused() => info!("Scheduler resumed"),
                () = control.stopped() => {}
            }
        }

        if control.is_stop_requested() {
            info!(ticks = report.ticks, "Scheduler stop requested");
            break;
        }

        let now = Utc::now();
        match sim.tick_if_due(now).await {
            Ok(Some(_)) => {
                report.ticks = report.ticks.saturating_add(1);
                control.ticks_run.fetch_add(1, Ordering::AcqRel);
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "Tick failed; scheduler exiting");
                break;
            }
        }

        if last_housekeeping.is_none_or(|at| at.elapsed() >= housekeeping_every) {
            sim.housekeep(now).await;
            report.housekeeping_runs = report.housekeeping_runs.saturating_add(1);
            last_housekeeping = Some(Instant::now());
        }

        tokio::select! {
            () = tokio::time::sleep(poll) => {}
            () = control.stopped() => {}
        }
    }

    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use breadline_types::ParticipantId;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::persistence::NullStore;
    use crate::serializer::SharedWorld;

    fn cadence() -> TickCadence {
        TickCadence::new(120).unwrap()
    }

    fn fast_simulation() -> Arc<Simulation<NullStore>> {
        let mut config = SimulationConfig::default();
        config.scheduler.tick_interval_secs = 60;
        config.scheduler.poll_interval_ms = 5;
        let world = SharedWorld::with_rng(Ledger::new(), SmallRng::seed_from_u64(3));
        Arc::new(Simulation::new(world, NullStore, &config).unwrap())
    }

    async fn someone_online(sim: &Simulation<NullStore>) {
        let mut guard = sim.world().lock().await;
        let authority = &mut *guard;
        authority
            .ledger
            .register_participant(ParticipantId::new(), Utc::now(), &mut authority.rng);
    }

    #[test]
    fn empty_world_never_ticks() {
        let ledger = Ledger::new();
        assert!(!should_tick(&ledger, Utc::now(), cadence(), 300));
    }

    #[test]
    fn ticks_follow_cadence() {
        let mut ledger = Ledger::new();
        let now = Utc::now();
        ledger.register_participant(ParticipantId::new(), now, &mut SmallRng::seed_from_u64(1));
        assert!(should_tick(&ledger, now, cadence(), 300));

        ledger.world.last_tick_at = Some(now);
        let soon = now.checked_add_signed(TimeDelta::try_seconds(30).unwrap()).unwrap();
        let later = now.checked_add_signed(TimeDelta::try_seconds(120).unwrap()).unwrap();
        assert!(!should_tick(&ledger, soon, cadence(), 300));
        assert!(should_tick(&ledger, later, cadence(), 300));
    }

    #[test]
    fn absent_participants_do_not_count() {
        let mut ledger = Ledger::new();
        let joined = Utc::now();
        ledger.register_participant(ParticipantId::new(), joined, &mut SmallRng::seed_from_u64(2));
        let much_later = joined.checked_add_signed(TimeDelta::try_hours(1).unwrap()).unwrap();
        assert!(!should_tick(&ledger, much_later, cadence(), 300));
    }

    #[test]
    fn control_switches() {
        let control = SchedulerControl::new();
        assert!(!control.is_paused());
        control.pause();
        assert!(control.is_paused());
        control.resume();
        assert!(!control.is_paused());
        assert!(!control.is_stop_requested());
        control.request_stop();
        assert!(control.is_stop_requested());
    }

    #[tokio::test]
    async fn loop_ticks_once_per_cadence_then_stops() {
        let sim = fast_simulation();
        someone_online(&sim).await;
        let control = Arc::new(SchedulerControl::new());
        let handle = tokio::spawn(run_scheduler(Arc::clone(&sim), Arc::clone(&control)));

        tokio::time::sleep(Duration::from_millis(100)).await;
        control.request_stop();
        let report = handle.await.unwrap();

        assert_eq!(report.ticks, 1);
        assert_eq!(report.housekeeping_runs, 1);
        assert_eq!(control.ticks_run(), 1);
        assert_eq!(sim.world().snapshot().await.world.tick_count, 1);
    }

    #[tokio::test]
    async fn paused_loop_holds_time() {
        let sim = fast_simulation();
        someone_online(&sim).await;
        let control = Arc::new(SchedulerControl::new());
        control.pause();
        let handle = tokio::spawn(run_scheduler(Arc::clone(&sim), Arc::clone(&control)));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sim.world().snapshot().await.world.tick_count, 0);

        control.resume();
        tokio::time::sleep(Duration::from_millis(50)).await;
        control.request_stop();
        let report = handle.await.unwrap();
        assert_eq!(report.ticks, 1);
    }

    #[tokio::test]
    async fn stop_while_paused_exits() {
        let sim = fast_simulation();
        let control = Arc::new(SchedulerControl::new());
        control.pause();
        let handle = tokio::spawn(run_scheduler(Arc::clone(&sim), Arc::clone(&control)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        control.request_stop();
        let report = handle.await.unwrap();
        assert_eq!(report, SchedulerReport::default());
    }
}
