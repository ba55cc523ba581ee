use crate::{create_pool, run_migrations, StorageError};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Handle to the Chirp database
///
/// Cheap to share behind an `Arc`; every request opens its own transaction
/// with [`Database::begin`].
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database at `database_url` and bring
    /// the schema up to date
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = create_pool(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a write transaction. Dropping it without `commit` rolls back.
    ///
    /// Takes the write lock up front (`BEGIN IMMEDIATE`), so a read followed
    /// by a write never hits `SQLITE_BUSY_SNAPSHOT`; concurrent writers wait
    /// on the busy timeout.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, StorageError> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }
}
