//! Tweet queries
//!
//! Ordering is newest first by creation time; tweets created within the same
//! microsecond fall back to insertion order.

use crate::timestamp_from_micros;
use chirp_core::{error::Result, types::*};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

fn map_row(row: &SqliteRow) -> Result<Tweet> {
    Ok(Tweet {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: timestamp_from_micros(row.try_get("created_at")?)?,
    })
}

/// Insert a tweet with a fresh id and timestamp
///
/// Fails with `ChirpError::Duplicate` when the title is already used by any tweet.
pub async fn create(conn: &mut SqliteConnection, tweet: CreateTweet) -> Result<Tweet> {
    let created = Tweet::new(tweet.user_id, tweet.title, tweet.content);

    sqlx::query(
        "INSERT INTO tweets (id, user_id, title, content, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(created.id)
    .bind(created.user_id)
    .bind(&created.title)
    .bind(&created.content)
    .bind(created.created_at.timestamp_micros())
    .execute(&mut *conn)
    .await?;

    Ok(created)
}

pub async fn get_by_id(conn: &mut SqliteConnection, id: TweetId) -> Result<Option<Tweet>> {
    let row = sqlx::query(
        "SELECT id, user_id, title, content, created_at
         FROM tweets
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(map_row).transpose()
}

/// Get all tweets, newest first
pub async fn get_all(conn: &mut SqliteConnection) -> Result<Vec<Tweet>> {
    let rows = sqlx::query(
        "SELECT id, user_id, title, content, created_at
         FROM tweets
         ORDER BY created_at DESC, rowid DESC",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(map_row).collect()
}

/// Apply the fields present in `update` and return the stored tweet
///
/// Returns `Ok(None)` if the tweet does not exist. An empty update is a read.
pub async fn update(
    conn: &mut SqliteConnection,
    id: TweetId,
    update: UpdateTweet,
) -> Result<Option<Tweet>> {
    if update.is_empty() {
        return get_by_id(conn, id).await;
    }

    let result = sqlx::query(
        "UPDATE tweets SET
            title = COALESCE(?, title),
            content = COALESCE(?, content)
         WHERE id = ?",
    )
    .bind(update.title)
    .bind(update.content)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_by_id(conn, id).await
}

/// Delete a tweet and, through the foreign key, its likes
///
/// Returns whether a row was removed.
pub async fn delete(conn: &mut SqliteConnection, id: TweetId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tweets WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}
