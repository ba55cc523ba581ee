/// Tweet resource operations
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
};
use chirp_core::types::{CreateTweet, Tweet, TweetId, TweetResponse, UpdateTweet};
use chirp_storage::{tweets, users};
use serde::Deserialize;
use sqlx::SqliteConnection;

#[derive(Debug, Deserialize)]
pub struct CreateTweetRequest {
    pub title: String,
    pub content: String,
}

/// Create a tweet owned by the caller
pub async fn create(
    conn: &mut SqliteConnection,
    caller: &AuthenticatedUser,
    req: CreateTweetRequest,
) -> Result<TweetResponse> {
    let title = required_text("title", req.title)?;
    let content = required_text("content", req.content)?;

    let tweet = tweets::create(
        conn,
        CreateTweet {
            user_id: caller.user_id(),
            title,
            content,
        },
    )
    .await
    .map_err(|e| title_conflict(e.into()))?;

    tracing::info!(tweet_id = %tweet.id, user_id = %tweet.user_id, "Tweet created");

    Ok(TweetResponse::with_email(tweet, &caller.user().email))
}

/// All tweets, newest first, each with its author's email
pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<TweetResponse>> {
    let all = tweets::get_all(conn).await?;
    let emails = users::email_index(conn).await?;

    Ok(all
        .into_iter()
        .map(|tweet| TweetResponse::shape(tweet, &emails))
        .collect())
}

pub async fn get(conn: &mut SqliteConnection, id: TweetId) -> Result<TweetResponse> {
    let tweet = find(conn, id).await?;
    shape_one(conn, tweet).await
}

/// Apply a partial update; only the author or a superuser may edit
pub async fn update(
    conn: &mut SqliteConnection,
    caller: &AuthenticatedUser,
    id: TweetId,
    mut update: UpdateTweet,
) -> Result<TweetResponse> {
    let existing = find(conn, id).await?;
    ensure_can_modify(caller, &existing)?;

    update.title = update.title.map(|t| required_text("title", t)).transpose()?;
    update.content = update
        .content
        .map(|c| required_text("content", c))
        .transpose()?;

    let tweet = tweets::update(conn, id, update)
        .await
        .map_err(|e| title_conflict(e.into()))?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(tweet_id = %id, user_id = %caller.user_id(), "Tweet updated");

    shape_one(conn, tweet).await
}

/// Delete a tweet and return its last known values
pub async fn delete(
    conn: &mut SqliteConnection,
    caller: &AuthenticatedUser,
    id: TweetId,
) -> Result<TweetResponse> {
    let existing = find(conn, id).await?;
    ensure_can_modify(caller, &existing)?;

    let response = shape_one(conn, existing).await?;

    if !tweets::delete(conn, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(tweet_id = %id, user_id = %caller.user_id(), "Tweet deleted");

    Ok(response)
}

/// Fetch a tweet or fail with 404
pub async fn find(conn: &mut SqliteConnection, id: TweetId) -> Result<Tweet> {
    tweets::get_by_id(conn, id)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn shape_one(conn: &mut SqliteConnection, tweet: Tweet) -> Result<TweetResponse> {
    let author = users::get_by_id(conn, tweet.user_id).await?;
    Ok(match author {
        Some(author) => TweetResponse::with_email(tweet, author.email),
        None => TweetResponse::shape(tweet, &Default::default()),
    })
}

fn ensure_can_modify(caller: &AuthenticatedUser, tweet: &Tweet) -> Result<()> {
    if tweet.user_id == caller.user_id() || caller.is_superuser() {
        Ok(())
    } else {
        Err(ServerError::Forbidden(
            "Only the author can modify this tweet".to_string(),
        ))
    }
}

fn required_text(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(ServerError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(value)
}

fn title_conflict(err: ServerError) -> ServerError {
    match err {
        ServerError::Conflict(_) => {
            ServerError::Conflict("A tweet with this title already exists".to_string())
        }
        other => other,
    }
}

fn not_found(id: TweetId) -> ServerError {
    ServerError::NotFound(format!("Tweet not found: {id}"))
}
