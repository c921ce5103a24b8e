//! Tick cadence and calendar helpers.
//!
//! The world records the wall-clock time of its last tick. Whether another
//! tick is due is derived from that timestamp and the configured cadence,
//! never from request traffic.
//!
//! # Design Principles
//!
//! - Elapsed time is clamped at zero, so a clock that steps backwards
//!   delays ticks rather than producing them.
//! - Calendar days are UTC dates. Daily tallies and the bootstrap tick
//!   both key off [`utc_day`].

use chrono::{DateTime, NaiveDate, Utc};

/// Smallest accepted tick interval.
pub const MIN_TICK_INTERVAL_SECS: u64 = 1;

/// Errors from cadence configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClockError {
    /// The interval is below [`MIN_TICK_INTERVAL_SECS`].
    #[error("tick interval must be at least {MIN_TICK_INTERVAL_SECS}s, got {secs}s")]
    IntervalTooShort {
        /// The rejected interval.
        secs: u64,
    },
}

/// A validated tick interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCadence {
    interval_secs: u64,
}

impl TickCadence {
    /// Build a cadence from an interval in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::IntervalTooShort`] for a zero interval.
    pub const fn new(interval_secs: u64) -> Result<Self, ClockError> {
        if interval_secs < MIN_TICK_INTERVAL_SECS {
            return Err(ClockError::IntervalTooShort {
                secs: interval_secs,
            });
        }
        Ok(Self { interval_secs })
    }

    /// The interval in seconds.
    pub const fn interval_secs(self) -> u64 {
        self.interval_secs
    }

    /// Whether a tick is due at `now`. A world that has never ticked is due.
    pub fn is_due(self, last_tick_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        last_tick_at.is_none_or(|last| elapsed_secs(last, now) >= self.interval_secs)
    }
}

/// Whole seconds from `earlier` to `now`, zero if `now` is earlier.
pub fn elapsed_secs(earlier: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let secs = now.signed_duration_since(earlier).num_seconds();
    u64::try_from(secs.max(0)).unwrap_or(u64::MAX)
}

/// The UTC calendar date of `now`.
pub fn utc_day(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// Whether `now` falls on a different UTC date than `last`.
pub fn is_new_day(last: Option<NaiveDate>, now: DateTime<Utc>) -> bool {
    last != Some(utc_day(now))
}
