//! Chirp Storage
//!
//! `SQLite` persistence for users, tweets and likes.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each entity owns its own queries (`users`, `tweets`, `likes`)
//! - **Explicit Transactions**: query functions take a `&mut SqliteConnection`, so
//!   callers decide the transaction boundary (usually one per HTTP request)
//! - **Explicit Joins**: no lazy relationship traversal; author emails are
//!   fetched with a dedicated query
//!
//! # Example
//!
//! ```rust,no_run
//! use chirp_storage::{tweets, Database};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite://chirp.db").await?;
//!
//! let mut tx = db.begin().await?;
//! let all = tweets::get_all(&mut tx).await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod likes;
pub mod tweets;
pub mod users;

pub use context::Database;
pub use error::StorageError;

use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Every migration uses `CREATE ... IF NOT EXISTS`, so this is safe to call
/// on each start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| StorageError::Migration(e.to_string()))
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://chirp.db>`)
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    tracing::info!("SQLite pool ready");

    Ok(pool)
}

/// Decode a microsecond timestamp column
pub(crate) fn timestamp_from_micros(micros: i64) -> chirp_core::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| chirp_core::ChirpError::storage(format!("Invalid timestamp: {micros}")))
}
