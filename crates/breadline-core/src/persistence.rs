//! Snapshot persistence seam.
//!
//! Saving is best effort and always happens after the world lock is
//! released, on a copy captured while it was held. The simulation behaves
//! the same with [`NullStore`] as with a real backend.

use std::future::Future;

use tokio::sync::Mutex;

use breadline_ledger::Ledger;

/// Errors from a snapshot backend.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The snapshot could not be encoded or decoded.
    #[error("snapshot encoding error: {source}")]
    Encoding {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The storage backend failed.
    #[error("snapshot backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Somewhere a ledger snapshot can be kept between runs.
pub trait SnapshotStore: Send + Sync {
    /// Load the most recent snapshot, if one exists.
    fn load(&self) -> impl Future<Output = Result<Option<Ledger>, PersistError>> + Send;

    /// Replace the stored snapshot.
    fn save(&self, ledger: &Ledger) -> impl Future<Output = Result<(), PersistError>> + Send;
}

/// A store that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl SnapshotStore for NullStore {
    async fn load(&self) -> Result<Option<Ledger>, PersistError> {
        Ok(None)
    }

    async fn save(&self, _ledger: &Ledger) -> Result<(), PersistError> {
        Ok(())
    }
}

/// A store that keeps the latest snapshot in memory, as JSON.
#[derive(Debug, Default)]
pub struct MemoryStore {
    latest: Mutex<Option<String>>,
    saves: Mutex<u64>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves.
    pub async fn saves(&self) -> u64 {
        *self.saves.lock().await
    }
}

impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Option<Ledger>, PersistError> {
        let latest = self.latest.lock().await;
        match latest.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, ledger: &Ledger) -> Result<(), PersistError> {
        let json = serde_json::to_string(ledger)?;
        *self.latest.lock().await = Some(json);
        let mut saves = self.saves.lock().await;
        *saves = saves.saturating_add(1);
        Ok(())
    }
}
