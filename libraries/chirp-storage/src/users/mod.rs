//! User account queries

use crate::timestamp_from_micros;
use chirp_core::{error::Result, types::*};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use std::collections::HashMap;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_active, is_superuser, is_verified, created_at";

fn map_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        is_active: row.try_get("is_active")?,
        is_superuser: row.try_get("is_superuser")?,
        is_verified: row.try_get("is_verified")?,
        created_at: timestamp_from_micros(row.try_get("created_at")?)?,
    })
}

/// Insert a new active user
///
/// Fails with `ChirpError::Duplicate` when the username or email is taken.
pub async fn create(conn: &mut SqliteConnection, user: NewUser) -> Result<User> {
    let created = User {
        id: UserId::generate(),
        username: user.username,
        email: user.email,
        password_hash: user.password_hash,
        is_active: true,
        is_superuser: user.is_superuser,
        is_verified: user.is_verified,
        created_at: now(),
    };

    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, is_active, is_superuser, is_verified, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(created.id)
    .bind(&created.username)
    .bind(&created.email)
    .bind(&created.password_hash)
    .bind(created.is_active)
    .bind(created.is_superuser)
    .bind(created.is_verified)
    .bind(created.created_at.timestamp_micros())
    .execute(&mut *conn)
    .await?;

    Ok(created)
}

pub async fn get_by_id(conn: &mut SqliteConnection, id: UserId) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(map_row).transpose()
}

/// Look up a user by email, ignoring ASCII case
pub async fn get_by_email(conn: &mut SqliteConnection, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
    ))
    .bind(email)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(map_row).transpose()
}

pub async fn get_by_username(conn: &mut SqliteConnection, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(map_row).transpose()
}

/// Get all users
pub async fn get_all(conn: &mut SqliteConnection) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(map_row).collect()
}

/// Map every user id to its email
///
/// A full scan; fine for the expected number of accounts.
pub async fn email_index(conn: &mut SqliteConnection) -> Result<HashMap<UserId, String>> {
    let rows = sqlx::query("SELECT id, email FROM users")
        .fetch_all(&mut *conn)
        .await?;

    rows.iter()
        .map(|row| -> Result<(UserId, String)> { Ok((row.try_get("id")?, row.try_get("email")?)) })
        .collect()
}

/// Apply a partial update and return the stored row
///
/// Returns `Ok(None)` if the user does not exist.
pub async fn update(
    conn: &mut SqliteConnection,
    id: UserId,
    update: UpdateUser,
) -> Result<Option<User>> {
    if update.is_empty() {
        return get_by_id(conn, id).await;
    }

    let result = sqlx::query(
        "UPDATE users SET
            username = COALESCE(?, username),
            email = COALESCE(?, email),
            password_hash = COALESCE(?, password_hash),
            is_active = COALESCE(?, is_active),
            is_superuser = COALESCE(?, is_superuser),
            is_verified = COALESCE(?, is_verified)
         WHERE id = ?",
    )
    .bind(update.username)
    .bind(update.email)
    .bind(update.password_hash)
    .bind(update.is_active)
    .bind(update.is_superuser)
    .bind(update.is_verified)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_by_id(conn, id).await
}
