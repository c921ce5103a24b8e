//! The world ledger for the Breadline simulation.
//!
//! The [`Ledger`] owns every entity in the shared world. It is mutated only
//! while the access serializer in `breadline-core` is held, by either the
//! action processor or the tick engine.
//!
//! # Modules
//!
//! - [`ledger`] -- The [`Ledger`] aggregate and its serial id [`Counters`]
//! - [`ring`] -- [`RingLog`], the bounded log used for events, chat, and messages
//! - [`rules`] -- Fixed game-balance constants
//! - [`names`] -- Display-name generation with collision suffixes
//! - [`conservation`] -- Gold and grain conservation audit

pub mod conservation;
pub mod ledger;
pub mod names;
pub mod ring;
pub mod rules;

pub use conservation::{Audit, Holdings, LedgerAnomaly};
pub use ledger::{Counters, Ledger};
pub use ring::RingLog;
