//! SQLite subscriber store.
//!
//! Every operation is a single SQL statement, so SQLite's own write
//! serialization makes each one atomic with respect to concurrent callers.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Telegram chat identity of a subscriber.
pub type SubscriberId = i64;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Subscriber not found: {0}")]
    NotFound(SubscriberId),
}

/// Persistent set of subscribers.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite database at the given path.
    ///
    /// The schema is created only when the database holds no objects yet.
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        // An in-memory database lives only as long as its connection
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        let db = Self { pool };
        if db.is_empty().await? {
            info!(url = database_url, "Initializing subscriber database");
            db.initialize_schema().await?;
        }
        Ok(db)
    }

    /// True when the database contains no schema objects at all.
    pub async fn is_empty(&self) -> Result<bool, DbError> {
        let objects = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sqlite_master")
            .fetch_one(&self.pool)
            .await?;
        Ok(objects == 0)
    }

    /// Create the subscriber table.
    pub async fn initialize_schema(&self) -> Result<(), DbError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                id INTEGER NOT NULL PRIMARY KEY
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Enroll a subscriber. Enrolling an existing one is a no-op.
    pub async fn add(&self, id: SubscriberId) -> Result<SubscriberId, DbError> {
        let result = sqlx::query("INSERT INTO subscribers (id) VALUES (?) ON CONFLICT(id) DO NOTHING")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            debug!(chat_id = id, "New subscriber");
        }
        Ok(id)
    }

    /// Snapshot of all subscribers.
    pub async fn list(&self) -> Result<Vec<SubscriberId>, DbError> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM subscribers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    /// Replace a subscriber's identity in place.
    ///
    /// If `new_id` is already enrolled the two entries collapse into one.
    pub async fn update(&self, old_id: SubscriberId, new_id: SubscriberId) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE OR REPLACE subscribers SET id = ? WHERE id = ?")
            .bind(new_id)
            .bind(old_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(old_id));
        }
        Ok(())
    }

    /// Remove a subscriber. Returns whether it was enrolled.
    pub async fn remove(&self, id: SubscriberId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM subscribers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn contains(&self, id: SubscriberId) -> Result<bool, DbError> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscribers WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists > 0)
    }

    pub async fn count(&self) -> Result<u64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscribers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
