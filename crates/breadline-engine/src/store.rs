//! Runtime selection of the snapshot backend.

use breadline_core::config::{PersistenceBackend, PersistenceConfig};
use breadline_core::persistence::{NullStore, PersistError, SnapshotStore};
use breadline_db::{FileSnapshotStore, PostgresConfig, PostgresPool, PostgresSnapshotStore};
use breadline_ledger::Ledger;
use tracing::info;

use crate::error::EngineError;

/// Whichever store the configuration selected.
#[derive(Debug)]
pub enum EngineStore {
    /// Nothing is persisted.
    Memory(NullStore),
    /// A JSON file on disk.
    File(FileSnapshotStore),
    /// A `PostgreSQL` row.
    Postgres(PostgresSnapshotStore),
}

impl EngineStore {
    /// Open the configured backend, migrating the database if needed.
    pub async fn open(config: &PersistenceConfig) -> Result<Self, EngineError> {
        match config.backend {
            PersistenceBackend::None => {
                info!("Persistence disabled; world lives in memory only");
                Ok(Self::Memory(NullStore))
            }
            PersistenceBackend::File => {
                info!(path = %config.snapshot_path.display(), "Using file snapshot store");
                Ok(Self::File(FileSnapshotStore::new(&config.snapshot_path)))
            }
            PersistenceBackend::Postgres => {
                let pg = PostgresConfig::new(&config.postgres_url)
                    .with_max_connections(config.max_connections);
                let pool = PostgresPool::connect(&pg).await?;
                pool.ping().await?;
                pool.migrate().await?;
                info!("Using PostgreSQL snapshot store");
                Ok(Self::Postgres(PostgresSnapshotStore::new(&pool)))
            }
        }
    }
}

impl SnapshotStore for EngineStore {
    async fn load(&self) -> Result<Option<Ledger>, PersistError> {
        match self {
            Self::Memory(store) => store.load().await,
            Self::File(store) => store.load().await,
            Self::Postgres(store) => store.load().await,
        }
    }

    async fn save(&self, ledger: &Ledger) -> Result<(), PersistError> {
        match self {
            Self::Memory(store) => store.save(ledger).await,
            Self::File(store) => store.save(ledger).await,
            Self::Postgres(store) => store.save(ledger).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_opens_without_io() {
        let config = PersistenceConfig {
            backend: PersistenceBackend::None,
            ..PersistenceConfig::default()
        };
        let store = EngineStore::open(&config).await.unwrap();
        assert!(matches!(store, EngineStore::Memory(_)));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_backend_points_at_configured_path() {
        let config = PersistenceConfig::default();
        let store = EngineStore::open(&config).await.unwrap();
        let path = match &store {
            EngineStore::File(file) => Some(file.path().to_path_buf()),
            _ => None,
        };
        assert_eq!(path, Some(config.snapshot_path));
    }
}
