/// Tweet API routes
use crate::{
    error::{Result, ServerError},
    extract::ApiJson,
    middleware::AuthenticatedUser,
    services::tweets::{self, CreateTweetRequest},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chirp_core::types::{TweetId, TweetResponse, UpdateTweet};

/// POST /tweets
pub async fn create_tweet(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<CreateTweetRequest>,
) -> Result<(StatusCode, Json<TweetResponse>)> {
    let mut tx = app_state.db.begin().await?;
    let tweet = tweets::create(&mut tx, &auth, req).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(tweet)))
}

/// GET /tweets
pub async fn list_tweets(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
) -> Result<Json<Vec<TweetResponse>>> {
    let mut conn = app_state.db.pool().acquire().await?;
    let all = tweets::list(&mut conn).await?;

    Ok(Json(all))
}

/// GET /tweets/:id
pub async fn get_tweet(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<TweetResponse>)> {
    let id = parse_tweet_id(&id)?;
    let mut conn = app_state.db.pool().acquire().await?;
    let tweet = tweets::get(&mut conn, id).await?;

    Ok((StatusCode::ACCEPTED, Json(tweet)))
}

/// PATCH /tweets/:id
pub async fn update_tweet(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTweet>,
) -> Result<(StatusCode, Json<TweetResponse>)> {
    let id = parse_tweet_id(&id)?;
    let mut tx = app_state.db.begin().await?;
    let tweet = tweets::update(&mut tx, &auth, id, req).await?;
    tx.commit().await?;

    Ok((StatusCode::ACCEPTED, Json(tweet)))
}

/// DELETE /tweets/:id
pub async fn delete_tweet(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<TweetResponse>)> {
    let id = parse_tweet_id(&id)?;
    let mut tx = app_state.db.begin().await?;
    let tweet = tweets::delete(&mut tx, &auth, id).await?;
    tx.commit().await?;

    Ok((StatusCode::ACCEPTED, Json(tweet)))
}

/// A malformed id cannot name an existing tweet
pub(crate) fn parse_tweet_id(raw: &str) -> Result<TweetId> {
    raw.parse()
        .map_err(|_| ServerError::NotFound(format!("Tweet not found: {raw}")))
}
