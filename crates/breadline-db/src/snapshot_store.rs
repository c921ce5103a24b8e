//! Ledger snapshots in `PostgreSQL`.
//!
//! The latest snapshot is one JSONB row in `world_snapshots`, upserted on
//! every save. Every [`HISTORY_EVERY_TICKS`]th tick is also copied into
//! `world_snapshot_history` so an operator can inspect or restore an older
//! world by hand.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use breadline_core::persistence::{PersistError, SnapshotStore};
use breadline_ledger::Ledger;

use crate::error::DbError;
use crate::postgres::PostgresPool;

/// Ticks between history copies.
pub const HISTORY_EVERY_TICKS: u64 = 48;

/// The single world this process owns.
const WORLD_ID: i16 = 1;

/// One row of `world_snapshot_history`, without the state payload.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct HistoryRow {
    /// Tick the copy was taken at.
    pub tick: i64,
    /// When it was written.
    pub saved_at: DateTime<Utc>,
}

/// A [`SnapshotStore`] writing to `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PostgresSnapshotStore {
    pool: PgPool,
}

impl PostgresSnapshotStore {
    /// A store over an already-migrated pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }

    /// Fetch the latest snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails or
    /// [`DbError::Encoding`] if the stored state does not decode.
    pub async fn fetch_latest(&self) -> Result<Option<Ledger>, DbError> {
        let state: Option<serde_json::Value> =
            sqlx::query_scalar(r"SELECT state FROM world_snapshots WHERE world_id = $1")
                .bind(WORLD_ID)
                .fetch_optional(&self.pool)
                .await?;
        state
            .map(serde_json::from_value)
            .transpose()
            .map_err(DbError::from)
    }

    /// Upsert the latest snapshot, and copy it to history on the cadence.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Encoding`] if the ledger does not encode or
    /// [`DbError::Postgres`] if a write fails.
    pub async fn upsert(&self, ledger: &Ledger) -> Result<(), DbError> {
        let tick = ledger.world.tick_count;
        let tick_i64 = i64::try_from(tick).unwrap_or(i64::MAX);
        let state = serde_json::to_value(ledger)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r"INSERT INTO world_snapshots (world_id, tick, state, saved_at)
              VALUES ($1, $2, $3, now())
              ON CONFLICT (world_id) DO UPDATE SET
                tick = EXCLUDED.tick,
                state = EXCLUDED.state,
                saved_at = EXCLUDED.saved_at",
        )
        .bind(WORLD_ID)
        .bind(tick_i64)
        .bind(&state)
        .execute(&mut *tx)
        .await?;

        if tick > 0 && tick.checked_rem(HISTORY_EVERY_TICKS) == Some(0) {
            sqlx::query(
                r"INSERT INTO world_snapshot_history (world_id, tick, state)
                  VALUES ($1, $2, $3)
                  ON CONFLICT (world_id, tick) DO NOTHING",
            )
            .bind(WORLD_ID)
            .bind(tick_i64)
            .bind(&state)
            .execute(&mut *tx)
            .await?;
            tracing::debug!(tick, "Snapshot copied to history");
        }
        tx.commit().await?;
        Ok(())
    }

    /// The most recent history copies, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn history(&self, limit: i64) -> Result<Vec<HistoryRow>, DbError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r"SELECT tick, saved_at FROM world_snapshot_history
              WHERE world_id = $1
              ORDER BY tick DESC
              LIMIT $2",
        )
        .bind(WORLD_ID)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Load the history copy taken at `tick`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails or
    /// [`DbError::Encoding`] if the stored state does not decode.
    pub async fn fetch_history(&self, tick: u64) -> Result<Option<Ledger>, DbError> {
        let tick_i64 = i64::try_from(tick).unwrap_or(i64::MAX);
        let state: Option<serde_json::Value> = sqlx::query_scalar(
            r"SELECT state FROM world_snapshot_history WHERE world_id = $1 AND tick = $2",
        )
        .bind(WORLD_ID)
        .bind(tick_i64)
        .fetch_optional(&self.pool)
        .await?;
        state
            .map(serde_json::from_value)
            .transpose()
            .map_err(DbError::from)
    }
}

impl SnapshotStore for PostgresSnapshotStore {
    async fn load(&self) -> Result<Option<Ledger>, PersistError> {
        self.fetch_latest().await.map_err(PersistError::from)
    }

    async fn save(&self, ledger: &Ledger) -> Result<(), PersistError> {
        self.upsert(ledger).await.map_err(PersistError::from)
    }
}
