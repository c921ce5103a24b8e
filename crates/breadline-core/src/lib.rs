//! Tick engine, scheduler, and request gateway for the Breadline simulation.
//!
//! Simulated time only moves through [`tick::advance_tick`], and every
//! caller reaches the ledger through the single lock in
//! [`serializer::SharedWorld`]. Ticks and participant actions interleave
//! but never overlap.
//!
//! # Modules
//!
//! - [`clock`] -- Tick cadence and UTC day helpers.
//! - [`config`] -- Configuration loading from `breadline-config.yaml`.
//! - [`tick`] -- The fourteen-step world advance.
//! - [`serializer`] -- [`SharedWorld`], the one lock around the ledger.
//! - [`gateway`] -- [`Simulation`], the request-layer entry points.
//! - [`scheduler`] -- Background tick loop and its control handle.
//! - [`housekeeping`] -- Retirement of long-absent participants.
//! - [`projection`] -- Read-only views for rendering.
//! - [`persistence`] -- The [`SnapshotStore`] trait.
//!
//! [`SharedWorld`]: serializer::SharedWorld
//! [`Simulation`]: gateway::Simulation
//! [`SnapshotStore`]: persistence::SnapshotStore

pub mod clock;
pub mod config;
pub mod gateway;
pub mod housekeeping;
pub mod persistence;
pub mod projection;
pub mod scheduler;
pub mod serializer;
pub mod tick;
