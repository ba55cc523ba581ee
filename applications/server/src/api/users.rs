/// Account API routes
use crate::{
    error::{Result, ServerError},
    extract::ApiJson,
    middleware::AuthenticatedUser,
    services::users::{self, AdminUpdateRequest, UpdateMeRequest, UserRead},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use chirp_core::types::UserId;

/// GET /auth/me
pub async fn me(auth: AuthenticatedUser) -> Json<UserRead> {
    Json(auth.0.into())
}

/// PATCH /auth/me
pub async fn update_me(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<UpdateMeRequest>,
) -> Result<Json<UserRead>> {
    let mut tx = app_state.db.begin().await?;
    let user = users::update_me(&mut tx, &app_state.auth_service, auth.user(), req).await?;
    tx.commit().await?;

    Ok(Json(user.into()))
}

/// GET /auth/:id (superuser)
pub async fn get_user(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<UserRead>> {
    auth.require_superuser()?;
    let id = parse_user_id(&id)?;

    let mut conn = app_state.db.pool().acquire().await?;
    let user = users::get_user(&mut conn, id).await?;

    Ok(Json(user.into()))
}

/// PATCH /auth/:id (superuser)
pub async fn update_user(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AdminUpdateRequest>,
) -> Result<Json<UserRead>> {
    auth.require_superuser()?;
    let id = parse_user_id(&id)?;

    let mut tx = app_state.db.begin().await?;
    let user = users::update_user(&mut tx, &app_state.auth_service, id, req).await?;
    tx.commit().await?;

    Ok(Json(user.into()))
}

fn parse_user_id(raw: &str) -> Result<UserId> {
    raw.parse()
        .map_err(|_| ServerError::NotFound(format!("User not found: {raw}")))
}
