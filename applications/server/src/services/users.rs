/// Account management: registration, login, password reset, verification
use crate::{
    error::{Result, ServerError},
    services::{auth::password_fingerprint, AuthService},
};
use chirp_core::types::{NewUser, UpdateUser, User, UserId};
use chirp_storage::users;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

pub const REGISTER_USER_ALREADY_EXISTS: &str = "REGISTER_USER_ALREADY_EXISTS";
pub const RESET_PASSWORD_BAD_TOKEN: &str = "RESET_PASSWORD_BAD_TOKEN";
pub const VERIFY_USER_BAD_TOKEN: &str = "VERIFY_USER_BAD_TOKEN";
pub const VERIFY_USER_ALREADY_VERIFIED: &str = "VERIFY_USER_ALREADY_VERIFIED";
pub const UPDATE_USER_EMAIL_ALREADY_EXISTS: &str = "UPDATE_USER_EMAIL_ALREADY_EXISTS";

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRead {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Fields a user may change on their own account
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Fields a superuser may change on any account
#[derive(Debug, Default, Deserialize)]
pub struct AdminUpdateRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
}

/// Create a regular, unverified account
pub async fn register(
    conn: &mut SqliteConnection,
    auth: &AuthService,
    req: RegisterRequest,
) -> Result<User> {
    create_account(conn, auth, req, false, false).await
}

/// Create an account with explicit privilege flags (CLI bootstrap)
pub async fn create_account(
    conn: &mut SqliteConnection,
    auth: &AuthService,
    req: RegisterRequest,
    is_superuser: bool,
    is_verified: bool,
) -> Result<User> {
    let email = validate_email(&req.email)?;
    let username = validate_username(&req.username)?;
    validate_password(&req.password)?;

    if users::get_by_email(conn, &email).await?.is_some() {
        return Err(ServerError::BadRequest(
            REGISTER_USER_ALREADY_EXISTS.to_string(),
        ));
    }

    let user = users::create(
        conn,
        NewUser {
            username,
            email,
            password_hash: auth.hash_password(&req.password)?,
            is_superuser,
            is_verified,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(user)
}

/// Check credentials; `login` may be an email or a username
///
/// Unknown users, wrong passwords and inactive accounts are indistinguishable
/// to the caller.
pub async fn authenticate(
    conn: &mut SqliteConnection,
    auth: &AuthService,
    login: &str,
    password: &str,
) -> Result<User> {
    let bad_credentials = || ServerError::Auth("Invalid username or password".to_string());

    let user = match users::get_by_email(conn, login).await? {
        Some(user) => Some(user),
        None => users::get_by_username(conn, login).await?,
    }
    .ok_or_else(bad_credentials)?;

    if !auth.verify_password(password, &user.password_hash)? || !user.is_active {
        return Err(bad_credentials());
    }

    Ok(user)
}

/// Issue a reset token for `email` if such an active account exists
///
/// Returns the token so callers can hand it to a delivery channel; the HTTP
/// route never reveals it.
pub async fn forgot_password(
    conn: &mut SqliteConnection,
    auth: &AuthService,
    email: &str,
) -> Result<Option<String>> {
    let Some(user) = users::get_by_email(conn, email).await? else {
        return Ok(None);
    };
    if !user.is_active {
        return Ok(None);
    }

    let token = auth.create_reset_token(&user)?;
    tracing::info!(user_id = %user.id, "Password reset requested");
    tracing::debug!(user_id = %user.id, %token, "Issued password reset token");

    Ok(Some(token))
}

/// Set a new password using a reset token
pub async fn reset_password(
    conn: &mut SqliteConnection,
    auth: &AuthService,
    token: &str,
    password: &str,
) -> Result<User> {
    let bad_token = || ServerError::BadRequest(RESET_PASSWORD_BAD_TOKEN.to_string());

    let (user_id, fingerprint) = auth.verify_reset_token(token).map_err(|_| bad_token())?;
    let user = users::get_by_id(conn, user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(bad_token)?;

    if password_fingerprint(&user.password_hash) != fingerprint {
        return Err(bad_token());
    }

    validate_password(password)?;

    let updated = users::update(
        conn,
        user.id,
        UpdateUser {
            password_hash: Some(auth.hash_password(password)?),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(bad_token)?;

    tracing::info!(user_id = %updated.id, "Password reset");

    Ok(updated)
}

/// Issue a verification token for an active, unverified account
pub async fn request_verify_token(
    conn: &mut SqliteConnection,
    auth: &AuthService,
    email: &str,
) -> Result<Option<String>> {
    let Some(user) = users::get_by_email(conn, email).await? else {
        return Ok(None);
    };
    if !user.is_active || user.is_verified {
        return Ok(None);
    }

    let token = auth.create_verify_token(&user)?;
    tracing::info!(user_id = %user.id, "Verification requested");
    tracing::debug!(user_id = %user.id, %token, "Issued verification token");

    Ok(Some(token))
}

/// Mark the account as verified using a verification token
pub async fn verify(conn: &mut SqliteConnection, auth: &AuthService, token: &str) -> Result<User> {
    let bad_token = || ServerError::BadRequest(VERIFY_USER_BAD_TOKEN.to_string());

    let (user_id, email) = auth.verify_verify_token(token).map_err(|_| bad_token())?;
    let user = users::get_by_id(conn, user_id)
        .await?
        .ok_or_else(bad_token)?;

    if !user.email.eq_ignore_ascii_case(&email) {
        return Err(bad_token());
    }
    if user.is_verified {
        return Err(ServerError::BadRequest(
            VERIFY_USER_ALREADY_VERIFIED.to_string(),
        ));
    }

    let updated = users::update(
        conn,
        user.id,
        UpdateUser {
            is_verified: Some(true),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(bad_token)?;

    tracing::info!(user_id = %updated.id, "User verified");

    Ok(updated)
}

/// Update the caller's own account. A new email clears verification.
pub async fn update_me(
    conn: &mut SqliteConnection,
    auth: &AuthService,
    user: &User,
    req: UpdateMeRequest,
) -> Result<User> {
    apply_update(
        conn,
        auth,
        user,
        AdminUpdateRequest {
            email: req.email,
            username: req.username,
            password: req.password,
            ..Default::default()
        },
    )
    .await
}

/// Update any account (superuser only; checked by the caller)
pub async fn update_user(
    conn: &mut SqliteConnection,
    auth: &AuthService,
    id: UserId,
    req: AdminUpdateRequest,
) -> Result<User> {
    let user = get_user(conn, id).await?;
    apply_update(conn, auth, &user, req).await
}

pub async fn get_user(conn: &mut SqliteConnection, id: UserId) -> Result<User> {
    users::get_by_id(conn, id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("User not found: {id}")))
}

async fn apply_update(
    conn: &mut SqliteConnection,
    auth: &AuthService,
    user: &User,
    req: AdminUpdateRequest,
) -> Result<User> {
    let mut update = UpdateUser {
        is_active: req.is_active,
        is_superuser: req.is_superuser,
        is_verified: req.is_verified,
        ..Default::default()
    };

    if let Some(email) = req.email {
        let email = validate_email(&email)?;
        if !email.eq_ignore_ascii_case(&user.email) {
            if users::get_by_email(conn, &email).await?.is_some() {
                return Err(ServerError::BadRequest(
                    UPDATE_USER_EMAIL_ALREADY_EXISTS.to_string(),
                ));
            }
            update.email = Some(email);
            update.is_verified = Some(req.is_verified.unwrap_or(false));
        }
    }

    if let Some(username) = req.username {
        update.username = Some(validate_username(&username)?);
    }

    if let Some(password) = req.password {
        validate_password(&password)?;
        update.password_hash = Some(auth.hash_password(&password)?);
    }

    let updated = users::update(conn, user.id, update)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("User not found: {}", user.id)))?;

    tracing::info!(user_id = %updated.id, "User updated");

    Ok(updated)
}

fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        });

    if valid && !email.contains(char::is_whitespace) {
        Ok(email.to_string())
    } else {
        Err(ServerError::BadRequest(format!("Invalid email address: {email}")))
    }
}

fn validate_username(username: &str) -> Result<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ServerError::BadRequest("username must not be empty".to_string()));
    }
    Ok(username.to_string())
}

fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(ServerError::BadRequest("password must not be empty".to_string()));
    }
    Ok(())
}
