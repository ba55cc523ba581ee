/// Authentication middleware
use crate::{error::ServerError, state::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use chirp_core::{User, UserId};

/// The caller resolved from the bearer token
///
/// Inserted into request extensions by [`auth_middleware`]; can be used as an
/// extractor in handlers behind it.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn user(&self) -> &User {
        &self.0
    }

    pub fn user_id(&self) -> UserId {
        self.0.id
    }

    pub fn is_superuser(&self) -> bool {
        self.0.is_superuser
    }

    /// Reject callers without superuser rights
    pub fn require_superuser(&self) -> Result<(), ServerError> {
        if self.is_superuser() {
            Ok(())
        } else {
            Err(ServerError::Forbidden("Superuser required".to_string()))
        }
    }
}

/// Middleware that validates the bearer token and loads the active caller
///
/// Runs before the handler, so rejected requests never touch the tweet tables.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    // Extract Authorization header
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ServerError::Auth("Missing bearer token".to_string()))?;

    // Verify token
    let user_id = app_state
        .auth_service
        .verify_access_token(token)
        .map_err(|e| {
            tracing::warn!("Token verification failed: {}", e);
            ServerError::Auth("Invalid token".to_string())
        })?;

    let mut conn = app_state.db.pool().acquire().await?;
    let user = chirp_storage::users::get_by_id(&mut conn, user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| {
            tracing::warn!(%user_id, "Token for unknown or inactive user");
            ServerError::Auth("Invalid token".to_string())
        })?;
    drop(conn);

    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}

/// Implement FromRequestParts so AuthenticatedUser can be used as an extractor
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ServerError::Auth("Not authenticated".to_string()))
    }
}
