//! Action processor for the Breadline simulation.
//!
//! Participants act on the shared [`Ledger`](breadline_ledger::Ledger)
//! through [`apply_action`]. Every action either applies its full effect or
//! is rejected with a message and no state change. Nothing here advances
//! the clock; that is the tick engine's job.
//!
//! # Modules
//!
//! - [`error`] -- [`Rejection`], the user-facing refusal reasons
//! - [`validation`] -- Read-only precondition helpers
//! - [`pricing`] -- Market quotes and contract payouts
//! - [`budget`] -- Daily high-impact allowance
//! - [`handlers`] -- One module per action family
//! - [`processor`] -- The gate, dispatch, and audit pipeline

pub mod budget;
pub mod error;
pub mod handlers;
pub mod pricing;
pub mod processor;
pub mod validation;

pub use error::Rejection;
pub use handlers::Turn;
pub use processor::{apply_action, audit_for};
