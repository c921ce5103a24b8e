//! Snapshot storage for the Breadline simulation.
//!
//! The simulation keeps its whole world in memory and hands a copy to a
//! [`SnapshotStore`] after every change. This crate provides the two real
//! backends:
//!
//! - [`file`] -- one JSON file on local disk, replaced atomically
//! - [`snapshot_store`] -- a JSONB row in `PostgreSQL`, with periodic history
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`error`] -- Shared error types
//!
//! [`SnapshotStore`]: breadline_core::persistence::SnapshotStore

pub mod error;
pub mod file;
pub mod postgres;
pub mod snapshot_store;

pub use error::DbError;
pub use file::FileSnapshotStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use snapshot_store::{HistoryRow, PostgresSnapshotStore};
