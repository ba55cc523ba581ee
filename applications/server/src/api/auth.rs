/// Authentication API routes
use crate::{
    error::{Result, ServerError},
    extract::{ApiJson, JsonOrForm},
    middleware::AuthenticatedUser,
    services::users::{self, RegisterRequest, UserRead},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address or username
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

const TOKEN_TYPE: &str = "bearer";

/// POST /auth/register
pub async fn register(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserRead>)> {
    let mut tx = app_state.db.begin().await?;
    let user = users::register(&mut tx, &app_state.auth_service, req).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/jwt/login
///
/// Accepts JSON or an OAuth2 password form (`username`, `password`).
pub async fn login(
    State(app_state): State<AppState>,
    JsonOrForm(req): JsonOrForm<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let mut conn = app_state.db.pool().acquire().await?;
    let user = users::authenticate(
        &mut conn,
        &app_state.auth_service,
        &req.username,
        &req.password,
    )
    .await?;

    let access_token = app_state.auth_service.create_access_token(&user.id)?;
    let refresh_token = app_state.auth_service.create_refresh_token(&user.id)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        token_type: TOKEN_TYPE.to_string(),
    }))
}

/// POST /auth/jwt/refresh
pub async fn refresh(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let user_id = app_state
        .auth_service
        .verify_refresh_token(&req.refresh_token)?;

    let mut conn = app_state.db.pool().acquire().await?;
    let user = chirp_storage::users::get_by_id(&mut conn, user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ServerError::Auth("Invalid token".to_string()))?;

    let access_token = app_state.auth_service.create_access_token(&user.id)?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    }))
}

/// POST /auth/jwt/logout
///
/// Tokens are stateless; the client discards them.
pub async fn logout(auth: AuthenticatedUser) -> StatusCode {
    tracing::info!(user_id = %auth.user_id(), "User logged out");
    StatusCode::NO_CONTENT
}

/// POST /auth/forgot-password
pub async fn forgot_password(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> Result<StatusCode> {
    let mut conn = app_state.db.pool().acquire().await?;
    users::forgot_password(&mut conn, &app_state.auth_service, &req.email).await?;

    Ok(StatusCode::ACCEPTED)
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> Result<Json<UserRead>> {
    let mut tx = app_state.db.begin().await?;
    let user =
        users::reset_password(&mut tx, &app_state.auth_service, &req.token, &req.password).await?;
    tx.commit().await?;

    Ok(Json(user.into()))
}

/// POST /auth/request-verify-token
pub async fn request_verify_token(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> Result<StatusCode> {
    let mut conn = app_state.db.pool().acquire().await?;
    users::request_verify_token(&mut conn, &app_state.auth_service, &req.email).await?;

    Ok(StatusCode::ACCEPTED)
}

/// POST /auth/verify
pub async fn verify(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<VerifyRequest>,
) -> Result<Json<UserRead>> {
    let mut tx = app_state.db.begin().await?;
    let user = users::verify(&mut tx, &app_state.auth_service, &req.token).await?;
    tx.commit().await?;

    Ok(Json(user.into()))
}
