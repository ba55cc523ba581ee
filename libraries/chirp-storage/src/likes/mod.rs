//! Like queries
//!
//! A like belongs to one user and one tweet; the pair is unique.

use crate::timestamp_from_micros;
use chirp_core::{error::Result, types::*};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

fn map_row(row: &SqliteRow) -> Result<Like> {
    Ok(Like {
        id: row.try_get("id")?,
        tweet_id: row.try_get("tweet_id")?,
        user_id: row.try_get("user_id")?,
        created_at: timestamp_from_micros(row.try_get("created_at")?)?,
    })
}

/// Record that `user_id` likes `tweet_id`
///
/// Fails with `ChirpError::Duplicate` if the user already likes the tweet.
pub async fn create(conn: &mut SqliteConnection, tweet_id: TweetId, user_id: UserId) -> Result<Like> {
    let like = Like::new(tweet_id, user_id);

    sqlx::query(
        "INSERT INTO likes (id, tweet_id, user_id, created_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(like.id)
    .bind(like.tweet_id)
    .bind(like.user_id)
    .bind(like.created_at.timestamp_micros())
    .execute(&mut *conn)
    .await?;

    Ok(like)
}

/// The like `user_id` placed on `tweet_id`, if any
pub async fn find(
    conn: &mut SqliteConnection,
    tweet_id: TweetId,
    user_id: UserId,
) -> Result<Option<Like>> {
    let row = sqlx::query(
        "SELECT id, tweet_id, user_id, created_at
         FROM likes
         WHERE tweet_id = ? AND user_id = ?",
    )
    .bind(tweet_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(map_row).transpose()
}

pub async fn count_for_tweet(conn: &mut SqliteConnection, tweet_id: TweetId) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE tweet_id = ?")
        .bind(tweet_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// Delete a like by id. Returns whether a row was removed.
pub async fn delete(conn: &mut SqliteConnection, id: LikeId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM likes WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}
