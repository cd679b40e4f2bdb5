//! Account repository for Sharebox.
//!
//! This module provides CRUD operations for accounts in the database.

use sqlx::SqlitePool;
use tracing::info;

use super::account::{Account, AccountRole, NewAccount};
use crate::auth::hash_password;
use crate::file::{to_slash_path, validate_directory};
use crate::{Result, ShareboxError};

const ACCOUNT_COLUMNS: &str =
    "id, username, password_hash, display_name, directory, is_admin, created_at";

/// Repository for account CRUD operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new account.
    ///
    /// The password is hashed before storage. Admins without a directory get
    /// the placeholder `admin_<username>`. A regular account's directory is
    /// stored in normalized form and must not equal, contain or sit inside
    /// another regular account's directory.
    pub async fn create(&self, new_account: &NewAccount) -> Result<Account> {
        let username = new_account.username.trim();
        if username.is_empty() {
            return Err(ShareboxError::Validation(
                "username must not be empty".to_string(),
            ));
        }

        let directory = new_account.directory.trim();
        let directory = match new_account.role {
            AccountRole::Admin if directory.is_empty() => format!("admin_{username}"),
            AccountRole::Regular if directory.is_empty() => {
                return Err(ShareboxError::MissingDirectory)
            }
            AccountRole::Regular => {
                let normalized = validate_directory(directory).map_err(|_| {
                    ShareboxError::Validation(format!("unsafe directory: {directory}"))
                })?;
                to_slash_path(&normalized)
            }
            AccountRole::Admin => directory.to_string(),
        };

        let display_name = new_account
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(username)
            .to_string();

        let password_hash = hash_password(&new_account.password)?;

        // The overlap check and the insert are one statement, so two
        // concurrent creations cannot both claim the same tree.
        let is_admin = new_account.role.is_admin();
        let result = sqlx::query(
            "INSERT INTO accounts (username, password_hash, display_name, directory, is_admin)
             SELECT ?, ?, ?, ?, ?
             WHERE ? OR NOT EXISTS (
                 SELECT 1 FROM accounts
                 WHERE is_admin = 0
                   AND (directory = ?
                        OR substr(?, 1, length(directory) + 1) = directory || '/'
                        OR substr(directory, 1, length(?) + 1) = ? || '/')
             )",
        )
        .bind(username)
        .bind(&password_hash)
        .bind(&display_name)
        .bind(&directory)
        .bind(is_admin)
        .bind(is_admin)
        .bind(&directory)
        .bind(&directory)
        .bind(&directory)
        .bind(&directory)
        .execute(self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(err) if is_unique_violation(&err) => {
                return Err(ShareboxError::DuplicateUsername(username.to_string()))
            }
            Err(err) => return Err(ShareboxError::Database(err.to_string())),
        };

        if result.rows_affected() == 0 {
            return Err(ShareboxError::DirectoryConflict(directory));
        }

        let id = result.last_insert_rowid();
        info!(id, username, role = %new_account.role, "account created");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| ShareboxError::NotFound("account".to_string()))
    }

    /// Get an account by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Account>> {
        let result = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| ShareboxError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get an account by username (case-sensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let result = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| ShareboxError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Replace the password of an account.
    ///
    /// Only the password hash changes.
    pub async fn reset_password(&self, id: i64, password: &str) -> Result<()> {
        let password_hash = hash_password(password)?;

        let result = sqlx::query("UPDATE accounts SET password_hash = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| ShareboxError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ShareboxError::NotFound("account".to_string()));
        }

        info!(id, "password reset");
        Ok(())
    }

    /// Delete an account and return it.
    ///
    /// The last-admin check is part of the `DELETE` statement, so two
    /// concurrent deletions can never remove every admin.
    pub async fn delete(&self, id: i64) -> Result<Account> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ShareboxError::Database(e.to_string()))?;

        let deleted = sqlx::query_as::<_, Account>(&format!(
            "DELETE FROM accounts
             WHERE id = ?
               AND (is_admin = 0 OR (SELECT COUNT(*) FROM accounts WHERE is_admin = 1) > 1)
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| ShareboxError::Database(e.to_string()))?;

        let account = match deleted {
            Some(account) => account,
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?)")
                        .bind(id)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(|e| ShareboxError::Database(e.to_string()))?;
                tx.rollback()
                    .await
                    .map_err(|e| ShareboxError::Database(e.to_string()))?;

                return Err(if exists {
                    ShareboxError::LastAdmin
                } else {
                    ShareboxError::NotFound("account".to_string())
                });
            }
        };

        tx.commit()
            .await
            .map_err(|e| ShareboxError::Database(e.to_string()))?;

        info!(id, username = %account.username, "account deleted");
        Ok(account)
    }

    /// List all accounts ordered by ID.
    pub async fn list_all(&self) -> Result<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await
        .map_err(|e| ShareboxError::Database(e.to_string()))?;

        Ok(accounts)
    }

    /// Count all accounts.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(self.pool)
            .await
            .map_err(|e| ShareboxError::Database(e.to_string()))?;

        Ok(count)
    }

    /// Count admin accounts.
    pub async fn count_admins(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE is_admin = 1")
            .fetch_one(self.pool)
            .await
            .map_err(|e| ShareboxError::Database(e.to_string()))?;

        Ok(count)
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
