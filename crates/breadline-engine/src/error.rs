//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure that can stop the engine during
//! startup. Once the scheduler is running, failures are logged instead.

/// Top-level startup error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: breadline_core::config::ConfigError,
    },

    /// The tick interval is unusable.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: breadline_core::clock::ClockError,
    },

    /// Connecting to or migrating the database failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying storage error.
        #[from]
        source: breadline_db::DbError,
    },

    /// A stored snapshot exists but could not be read.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying persistence error.
        #[from]
        source: breadline_core::persistence::PersistError,
    },
}
