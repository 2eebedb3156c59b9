//! Principal storage, including the single live refresh token per principal.
//!
//! Access tokens are stateless and never persisted. The refresh token column
//! holds the one token that is currently valid for the principal: set at
//! login and on every rotation, cleared at logout.

use sqlx::sqlite::SqlitePool;

/// A marketplace principal (user) as the auth core sees it.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i64,
    pub uuid: String,
    pub username: String,
    /// The currently valid refresh token, or None when logged out
    pub refresh_token: Option<String>,
}

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: i64,
    uuid: String,
    username: String,
    refresh_token: Option<String>,
}

impl From<PrincipalRow> for Principal {
    fn from(row: PrincipalRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            username: row.username,
            refresh_token: row.refresh_token,
        }
    }
}

/// Store for managing principals and their refresh tokens.
#[derive(Clone)]
pub struct PrincipalStore {
    pool: SqlitePool,
}

impl PrincipalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new principal. Returns the row ID.
    pub async fn create(&self, uuid: &str, username: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO principals (uuid, username) VALUES (?, ?)")
            .bind(uuid)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a principal by UUID.
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<Principal>, sqlx::Error> {
        let row: Option<PrincipalRow> = sqlx::query_as(
            "SELECT id, uuid, username, refresh_token FROM principals WHERE uuid = ?",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Principal::from))
    }

    /// Get a principal by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Principal>, sqlx::Error> {
        let row: Option<PrincipalRow> = sqlx::query_as(
            "SELECT id, uuid, username, refresh_token FROM principals WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Principal::from))
    }

    /// Replace the stored refresh token in a single write keyed by UUID.
    /// The previous token stops matching the moment this lands. Returns
    /// false if no such principal exists.
    pub async fn set_refresh_token(&self, uuid: &str, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE principals SET refresh_token = ? WHERE uuid = ?")
            .bind(token)
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the stored refresh token (logout). After this no refresh token
    /// is valid for the principal until the next login.
    pub async fn clear_refresh_token(&self, uuid: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE principals SET refresh_token = NULL WHERE uuid = ?")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check if a username is taken.
    pub async fn is_username_available(&self, username: &str) -> Result<bool, sqlx::Error> {
        let count: (i32,) = sqlx::query_as("SELECT COUNT(*) FROM principals WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0 == 0)
    }
}
