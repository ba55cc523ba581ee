/// Like API routes
use crate::{
    api::tweets::parse_tweet_id,
    error::Result,
    middleware::AuthenticatedUser,
    services::likes,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /tweets/:id/like
pub async fn like_tweet(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let tweet_id = parse_tweet_id(&id)?;
    let mut tx = app_state.db.begin().await?;
    likes::like(&mut tx, &auth, tweet_id).await?;
    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Tweet {tweet_id} liked"),
        }),
    ))
}

/// DELETE /tweets/:id/dislike
pub async fn dislike_tweet(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let tweet_id = parse_tweet_id(&id)?;
    let mut tx = app_state.db.begin().await?;
    likes::unlike(&mut tx, &auth, tweet_id).await?;
    tx.commit().await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: format!("Tweet {tweet_id} disliked"),
        }),
    ))
}
