/// Like resource operations
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    services::tweets,
};
use chirp_core::types::{Like, TweetId};
use chirp_storage::likes;
use sqlx::SqliteConnection;

/// Record the caller's like of a tweet
pub async fn like(
    conn: &mut SqliteConnection,
    caller: &AuthenticatedUser,
    tweet_id: TweetId,
) -> Result<Like> {
    tweets::find(conn, tweet_id).await?;

    let like = likes::create(conn, tweet_id, caller.user_id())
        .await
        .map_err(|e| match ServerError::from(e) {
            ServerError::Conflict(_) => {
                ServerError::Conflict("You already like this tweet".to_string())
            }
            other => other,
        })?;

    tracing::info!(%tweet_id, user_id = %caller.user_id(), "Tweet liked");

    Ok(like)
}

/// Remove the caller's own like of a tweet
pub async fn unlike(
    conn: &mut SqliteConnection,
    caller: &AuthenticatedUser,
    tweet_id: TweetId,
) -> Result<()> {
    let like = likes::find(conn, tweet_id, caller.user_id())
        .await?
        .ok_or_else(|| ServerError::NotFound("Like not found".to_string()))?;

    likes::delete(conn, like.id).await?;

    tracing::info!(%tweet_id, user_id = %caller.user_id(), "Tweet unliked");

    Ok(())
}
