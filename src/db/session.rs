//! Server-side session records.
//!
//! A session token only authenticates while its record is live. Logout
//! revokes the record, so a copy of the token stops working everywhere.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use crate::{Result, ShareboxError};

const SQL_NOW: &str = "datetime('now')";

/// A stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Session ID. Carried in the token as its `jti`.
    pub id: String,
    /// Account the session belongs to.
    pub account_id: i64,
    /// Expiration timestamp.
    pub expires_at: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Revocation timestamp (None if not revoked).
    pub revoked_at: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for SessionRecord {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            expires_at: row.try_get("expires_at")?,
            created_at: row.try_get("created_at")?,
            revoked_at: row.try_get("revoked_at")?,
        })
    }
}

/// Repository for session records.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a session that expires `ttl_secs` from now.
    pub async fn create(&self, id: &str, account_id: i64, ttl_secs: u64) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, account_id, expires_at)
             VALUES (?, ?, datetime('now', ?))",
        )
        .bind(id)
        .bind(account_id)
        .bind(format!("+{ttl_secs} seconds"))
        .execute(self.pool)
        .await
        .map_err(|e| ShareboxError::Database(e.to_string()))?;

        Ok(())
    }

    /// Get a session record by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<SessionRecord>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, account_id, expires_at, created_at, revoked_at
             FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| ShareboxError::Database(e.to_string()))?;

        Ok(record)
    }

    /// Whether a session is live: present, owned by the account, not
    /// revoked and not expired.
    pub async fn is_active(&self, id: &str, account_id: i64) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(
                 SELECT 1 FROM sessions
                 WHERE id = ?
                   AND account_id = ?
                   AND revoked_at IS NULL
                   AND expires_at > {SQL_NOW}
             )"
        );
        let active: bool = sqlx::query_scalar(&sql)
            .bind(id)
            .bind(account_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| ShareboxError::Database(e.to_string()))?;

        Ok(active)
    }

    /// Revoke a session. Returns false if it was unknown or already revoked.
    pub async fn revoke(&self, id: &str) -> Result<bool> {
        let sql =
            format!("UPDATE sessions SET revoked_at = {SQL_NOW} WHERE id = ? AND revoked_at IS NULL");
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| ShareboxError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired and revoked sessions.
    pub async fn cleanup_expired(&self) -> Result<u64> {
        let sql = format!(
            "DELETE FROM sessions WHERE expires_at <= {SQL_NOW} OR revoked_at IS NOT NULL"
        );
        let result = sqlx::query(&sql)
            .execute(self.pool)
            .await
            .map_err(|e| ShareboxError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
