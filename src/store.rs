//! SQLite persistence for tracked assets and price snapshots

use crate::{
    error::TrackerError,
    types::{PriceSnapshot, TrackedAsset},
};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Database connection with explicit open/close lifecycle
///
/// Opened once at startup, shared by cloning, closed at shutdown.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects to the database at `db_url` (e.g. `sqlite://data/monitor.db`),
    /// creating the file and its parent directory if missing.
    pub async fn connect(db_url: &str) -> Result<Self, TrackerError> {
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent).await?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        info!("Connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// Connects to a fresh in-memory database
    ///
    /// The pool is capped at one connection: each SQLite `:memory:`
    /// connection is its own database.
    pub async fn connect_in_memory() -> Result<Self, TrackerError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<(), TrackerError> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tracked_assets (
                asset_id TEXT PRIMARY KEY,
                symbol TEXT NOT NULL,
                name TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                added_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_snapshots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                asset_id TEXT NOT NULL,
                price REAL NOT NULL,
                recorded_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_snapshots_asset_time \
             ON price_snapshots (asset_id, recorded_at DESC)",
        )
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Returns the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection pool, waiting for connections to drain
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// CRUD access to tracked assets and their price snapshots
pub struct SnapshotStore {
    pool: SqlitePool,
}

impl SnapshotStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    // =========================
    // Tracked assets
    // =========================

    pub async fn insert_asset(&self, asset: &TrackedAsset) -> Result<(), TrackerError> {
        sqlx::query(
            r#"
            INSERT INTO tracked_assets (asset_id, symbol, name, is_active, added_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&asset.asset_id)
        .bind(&asset.symbol)
        .bind(&asset.name)
        .bind(asset.is_active)
        .bind(asset.added_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_asset(&self, asset_id: &str) -> Result<Option<TrackedAsset>, TrackerError> {
        let row = sqlx::query("SELECT * FROM tracked_assets WHERE asset_id = ?")
            .bind(asset_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| asset_from_row(&row)).transpose()
    }

    /// Lists tracked assets, optionally restricted to active ones,
    /// ordered by when tracking started.
    pub async fn list_assets(&self, active_only: bool) -> Result<Vec<TrackedAsset>, TrackerError> {
        let sql = if active_only {
            "SELECT * FROM tracked_assets WHERE is_active = 1 ORDER BY added_at, asset_id"
        } else {
            "SELECT * FROM tracked_assets ORDER BY added_at, asset_id"
        };

        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        rows.iter().map(asset_from_row).collect()
    }

    /// Sets the active flag; returns the number of rows affected
    pub async fn set_active(&self, asset_id: &str, active: bool) -> Result<u64, TrackerError> {
        let result = sqlx::query("UPDATE tracked_assets SET is_active = ? WHERE asset_id = ?")
            .bind(active)
            .bind(asset_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a tracked asset; returns the number of rows affected
    pub async fn delete_asset(&self, asset_id: &str) -> Result<u64, TrackerError> {
        let result = sqlx::query("DELETE FROM tracked_assets WHERE asset_id = ?")
            .bind(asset_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================
    // Price snapshots
    // =========================

    pub async fn insert_snapshot(&self, snapshot: &PriceSnapshot) -> Result<(), TrackerError> {
        sqlx::query(
            r#"
            INSERT INTO price_snapshots (asset_id, price, recorded_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&snapshot.asset_id)
        .bind(snapshot.price)
        .bind(snapshot.recorded_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns the last `limit` snapshots for an asset, newest first.
    /// Insertion order breaks timestamp ties.
    pub async fn history(
        &self,
        asset_id: &str,
        limit: usize,
    ) -> Result<Vec<PriceSnapshot>, TrackerError> {
        let rows = sqlx::query(
            "SELECT * FROM price_snapshots WHERE asset_id = ? \
             ORDER BY recorded_at DESC, id DESC LIMIT ?",
        )
        .bind(asset_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(snapshot_from_row).collect()
    }

    /// Returns the most recent snapshot for an asset, if any
    pub async fn latest(&self, asset_id: &str) -> Result<Option<PriceSnapshot>, TrackerError> {
        let row = sqlx::query(
            "SELECT * FROM price_snapshots WHERE asset_id = ? \
             ORDER BY recorded_at DESC, id DESC LIMIT 1",
        )
        .bind(asset_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| snapshot_from_row(&row)).transpose()
    }

    /// Deletes all snapshots for an asset; returns the number of rows affected
    pub async fn delete_snapshots(&self, asset_id: &str) -> Result<u64, TrackerError> {
        let result = sqlx::query("DELETE FROM price_snapshots WHERE asset_id = ?")
            .bind(asset_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Closes the shared connection pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn asset_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<TrackedAsset, TrackerError> {
    Ok(TrackedAsset {
        asset_id: row.try_get("asset_id")?,
        symbol: row.try_get("symbol")?,
        name: row.try_get("name")?,
        is_active: row.try_get("is_active")?,
        added_at: timestamp_from_millis(row.try_get("added_at")?)?,
    })
}

fn snapshot_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<PriceSnapshot, TrackerError> {
    let asset_id: String = row.try_get("asset_id")?;
    let price: f64 = row.try_get("price")?;

    if !price.is_finite() || price < 0.0 {
        return Err(TrackerError::validation(format!(
            "snapshot for '{}' has invalid price {}",
            asset_id, price
        )));
    }

    Ok(PriceSnapshot {
        asset_id,
        price,
        recorded_at: timestamp_from_millis(row.try_get("recorded_at")?)?,
    })
}

fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>, TrackerError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| TrackerError::validation(format!("invalid timestamp {}", millis)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn test_store() -> SnapshotStore {
        let db = Database::connect_in_memory().await.unwrap();
        SnapshotStore::new(&db)
    }

    fn asset(asset_id: &str, active: bool) -> TrackedAsset {
        TrackedAsset {
            asset_id: asset_id.to_string(),
            symbol: asset_id.chars().take(3).collect(),
            name: asset_id.to_string(),
            is_active: active,
            added_at: Utc::now(),
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn asset_round_trip() {
        let store = test_store().await;
        store.insert_asset(&asset("bitcoin", true)).await.unwrap();

        let loaded = store.get_asset("bitcoin").await.unwrap().unwrap();
        assert_eq!(loaded.asset_id, "bitcoin");
        assert!(loaded.is_active);

        assert!(store.get_asset("ethereum").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_assets_respects_active_filter() {
        let store = test_store().await;
        store.insert_asset(&asset("bitcoin", true)).await.unwrap();
        store.insert_asset(&asset("ethereum", false)).await.unwrap();

        assert_eq!(store.list_assets(false).await.unwrap().len(), 2);

        let active = store.list_assets(true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].asset_id, "bitcoin");
    }

    #[tokio::test]
    async fn set_active_reports_rows_affected() {
        let store = test_store().await;
        store.insert_asset(&asset("bitcoin", true)).await.unwrap();

        assert_eq!(store.set_active("bitcoin", false).await.unwrap(), 1);
        assert!(!store.get_asset("bitcoin").await.unwrap().unwrap().is_active);

        assert_eq!(store.set_active("missing", true).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn history_is_newest_first_and_limited() {
        let store = test_store().await;
        for (i, price) in [100.0, 105.0, 95.0, 110.0].iter().enumerate() {
            store
                .insert_snapshot(&PriceSnapshot::at("bitcoin", *price, ts(i as i64)))
                .await
                .unwrap();
        }
        // Snapshots for other assets must not leak into the window
        store
            .insert_snapshot(&PriceSnapshot::at("ethereum", 3000.0, ts(10)))
            .await
            .unwrap();

        let window = store.history("bitcoin", 3).await.unwrap();
        let prices: Vec<f64> = window.iter().map(|s| s.price).collect();
        assert_eq!(prices, vec![110.0, 95.0, 105.0]);

        let latest = store.latest("bitcoin").await.unwrap().unwrap();
        assert_eq!(latest.price, 110.0);

        assert!(store.latest("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_counts_are_reported() {
        let store = test_store().await;
        store.insert_asset(&asset("bitcoin", true)).await.unwrap();
        for i in 0..3 {
            store
                .insert_snapshot(&PriceSnapshot::at("bitcoin", 100.0 + i as f64, ts(i)))
                .await
                .unwrap();
        }

        assert_eq!(store.delete_asset("bitcoin").await.unwrap(), 1);
        assert_eq!(store.delete_snapshots("bitcoin").await.unwrap(), 3);
        assert_eq!(store.delete_asset("bitcoin").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn negative_persisted_price_fails_validation() {
        let store = test_store().await;
        // Bypass the API to corrupt a row directly
        sqlx::query("INSERT INTO price_snapshots (asset_id, price, recorded_at) VALUES (?, ?, ?)")
            .bind("bitcoin")
            .bind(-1.0_f64)
            .bind(ts(0).timestamp_millis())
            .execute(&store.pool)
            .await
            .unwrap();

        let err = store.history("bitcoin", 10).await.unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
    }
}
