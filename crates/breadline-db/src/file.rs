//! A snapshot store backed by one JSON file on local disk.
//!
//! Writes go to a sibling temp file which is then renamed over the real
//! one, so a crash mid-write leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use breadline_core::persistence::{PersistError, SnapshotStore};
use breadline_ledger::Ledger;

use crate::error::DbError;

/// Keeps the latest snapshot at a fixed path.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// A store writing to `path`. Nothing touches the disk until a save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the snapshot lives.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read and decode the snapshot, if the file exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the file exists but cannot be read, or
    /// [`DbError::Encoding`] if it is not a valid snapshot.
    pub async fn read(&self) -> Result<Option<Ledger>, DbError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let ledger = serde_json::from_str(&contents)?;
        Ok(Some(ledger))
    }

    /// Encode and atomically replace the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the directory, temp file, or rename
    /// fails.
    pub async fn write(&self, ledger: &Ledger) -> Result<(), DbError> {
        let json = serde_json::to_vec(ledger)?;
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir).await?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, &json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        tracing::debug!(
            path = %self.path.display(),
            tick = ledger.world.tick_count,
            bytes = json.len(),
            "Snapshot written"
        );
        Ok(())
    }
}

impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Option<Ledger>, PersistError> {
        self.read().await.map_err(PersistError::from)
    }

    async fn save(&self, ledger: &Ledger) -> Result<(), PersistError> {
        self.write(ledger).await.map_err(PersistError::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch() -> PathBuf {
        std::env::temp_dir()
            .join(format!("breadline-{}", uuid::Uuid::new_v4()))
            .join("snapshot.json")
    }

    #[tokio::test]
    async fn missing_file_loads_nothing() {
        let store = FileSnapshotStore::new(scratch());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load() {
        let path = scratch();
        let store = FileSnapshotStore::new(&path);
        let mut ledger = Ledger::new();
        ledger.world.tick_count = 9;
        ledger.world.set_grain_supply(77);

        store.save(&ledger).await.unwrap();
        assert!(path.exists());
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().await.unwrap(), Some(ledger.clone()));

        ledger.world.tick_count = 10;
        store.save(&ledger).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.world.tick_count, 10);

        if let Some(dir) = path.parent() {
            tokio::fs::remove_dir_all(dir).await.unwrap();
        }
    }

    #[tokio::test]
    async fn corrupt_file_is_an_encoding_error() {
        let path = scratch();
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"{ not json").await.unwrap();
        let store = FileSnapshotStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, PersistError::Encoding { .. }));
        tokio::fs::remove_dir_all(path.parent().unwrap()).await.unwrap();
    }

    #[test]
    fn temp_file_sits_beside_snapshot() {
        let store = FileSnapshotStore::new("data/world.json");
        assert_eq!(store.temp_path(), PathBuf::from("data/world.json.tmp"));
    }
}
