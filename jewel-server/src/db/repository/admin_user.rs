//! Admin User Repository

use super::{RepoError, RepoResult};
use shared::client::UserInfo;
use shared::util::now_millis;
use sqlx::SqlitePool;

/// Stored admin account (password hash never leaves the server)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminUserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: i64,
}

impl From<AdminUserRow> for UserInfo {
    fn from(row: AdminUserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<AdminUserRow>> {
    let user = sqlx::query_as::<_, AdminUserRow>(
        "SELECT id, username, password_hash, role, is_active, created_at FROM admin_user WHERE username = ? LIMIT 1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AdminUserRow>> {
    let user = sqlx::query_as::<_, AdminUserRow>(
        "SELECT id, username, password_hash, role, is_active, created_at FROM admin_user WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_user")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    role: &str,
) -> RepoResult<AdminUserRow> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO admin_user (username, password_hash, role, created_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create admin user".into()))
}
