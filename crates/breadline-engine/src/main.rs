//! Engine binary for the Breadline simulation.
//!
//! Wires the configuration, the snapshot store, and the tick scheduler
//! together, then runs until interrupted. A request layer embeds the same
//! [`Simulation`] to serve participants; this binary only keeps simulated
//! time moving and the snapshot current.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `breadline-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open the configured snapshot store
//! 4. Restore the last snapshot, or found a new city
//! 5. Spawn the scheduler and wait for Ctrl-C
//! 6. Stop the scheduler and write a final snapshot

mod error;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use breadline_core::config::{LoggingConfig, SimulationConfig};
use breadline_core::gateway::Simulation;
use breadline_core::persistence::SnapshotStore;
use breadline_core::scheduler::{self, SchedulerControl};
use breadline_core::serializer::SharedWorld;
use breadline_ledger::Ledger;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::store::EngineStore;

/// Config file used when `BREADLINE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "breadline-config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("loading configuration")?;
    init_logging(&config.logging);
    info!(
        tick_interval_secs = config.scheduler.tick_interval_secs,
        backend = ?config.persistence.backend,
        "breadline-engine starting"
    );

    let store = EngineStore::open(&config.persistence)
        .await
        .context("opening snapshot store")?;
    let ledger = restore(&store).await.context("restoring snapshot")?;

    let world = SharedWorld::new(ledger);
    let sim = Arc::new(Simulation::new(world, store, &config).map_err(EngineError::from)?);
    let control = Arc::new(SchedulerControl::new());
    let mut runner = tokio::spawn(scheduler::run_scheduler(
        Arc::clone(&sim),
        Arc::clone(&control),
    ));

    let report = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C; stopping");
            }
            info!("Shutdown requested");
            control.request_stop();
            (&mut runner).await
        }
        report = &mut runner => report,
    }
    .context("scheduler task panicked")?;

    let last = sim.world().snapshot().await;
    if let Err(e) = sim.store().save(&last).await {
        error!(error = %e, "Final snapshot save failed");
    }

    info!(
        ticks = report.ticks,
        housekeeping_runs = report.housekeeping_runs,
        world_tick = last.world.tick_count,
        "breadline-engine shutdown complete"
    );
    Ok(())
}

/// Load configuration from `BREADLINE_CONFIG` or the default path.
///
/// A missing file means defaults, with environment overrides still
/// applied.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let path = std::env::var_os("BREADLINE_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        Ok(SimulationConfig::from_file(&path)?)
    } else {
        Ok(SimulationConfig::parse("")?)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the config level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// The stored world, or a fresh one if the store is empty.
///
/// A snapshot that exists but cannot be read aborts startup rather than
/// silently founding a new city over it.
async fn restore(store: &EngineStore) -> Result<Ledger, EngineError> {
    match store.load().await? {
        Some(ledger) => {
            info!(
                tick = ledger.world.tick_count,
                day = ledger.world.day,
                participants = ledger.participants.len(),
                "Restored world from snapshot"
            );
            Ok(ledger)
        }
        None => {
            info!("No snapshot found; founding a new city");
            Ok(Ledger::new())
        }
    }
}
