//! Storage failures and their mapping onto [`PersistError`].
//!
//! The core only knows [`PersistError`], so every store converts on the way
//! out. Encoding problems keep their own kind; anything else is a backend
//! fault.

use breadline_core::persistence::PersistError;

/// Something went wrong reading or writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The database URL does not parse.
    #[error("invalid database URL: {source}")]
    InvalidUrl {
        /// Parser complaint.
        source: sqlx::Error,
    },

    /// A query or connection failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// The snapshot schema could not be brought up to date.
    #[error("snapshot schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The ledger did not encode, or a stored snapshot did not decode.
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The snapshot file could not be read or written.
    #[error("snapshot file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbError> for PersistError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Encoding(source) => Self::Encoding { source },
            other => Self::Backend(Box::new(other)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_snapshot_stays_an_encoding_error() {
        let err = serde_json::from_str::<u32>("nope")
            .map_err(DbError::from)
            .unwrap_err();
        assert!(matches!(PersistError::from(err), PersistError::Encoding { .. }));
    }

    #[test]
    fn file_errors_become_backend_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
        let persist = PersistError::from(DbError::from(io));
        assert!(matches!(persist, PersistError::Backend(_)));
        assert!(persist.to_string().contains("read-only volume"));
    }
}
