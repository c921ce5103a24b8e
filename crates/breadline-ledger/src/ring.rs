//! Fixed-capacity append-only log.
//!
//! Entries are never mutated after being pushed. Once the log is full,
//! each push evicts the oldest entry.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A bounded log that drops its oldest entries on overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingLog<T> {
    capacity: usize,
    entries: VecDeque<T>,
    /// Total entries ever pushed, including evicted ones.
    pushed: u64,
}

impl<T> RingLog<T> {
    /// An empty log holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            pushed: 0,
        }
    }

    /// Append an entry, evicting from the front if over capacity.
    pub fn push(&mut self, entry: T) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.pushed = self.pushed.saturating_add(1);
    }

    /// Entries currently retained, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.entries.iter()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total entries ever pushed.
    pub const fn pushed(&self) -> u64 {
        self.pushed
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }
}
