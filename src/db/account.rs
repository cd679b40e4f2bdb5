//! Account model for Sharebox.

use std::fmt;

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Owns exactly one collection directory.
    #[default]
    Regular,
    /// Manages accounts; owns no collection.
    Admin,
}

impl AccountRole {
    /// Role name used in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Regular => "regular",
            AccountRole::Admin => "admin",
        }
    }

    /// Map the stored `is_admin` flag to a role.
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin {
            AccountRole::Admin
        } else {
            AccountRole::Regular
        }
    }

    /// Whether this is the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(self, AccountRole::Admin)
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored account.
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account ID. Never reused.
    pub id: i64,
    /// Login username (unique, case-sensitive).
    pub username: String,
    /// Argon2id PHC hash.
    pub password_hash: String,
    /// Name shown in the UI.
    pub display_name: String,
    /// Collection directory relative to the storage root.
    ///
    /// A placeholder for admins.
    pub directory: String,
    /// Account role.
    pub role: AccountRole,
    /// Creation timestamp.
    pub created_at: String,
}

impl Account {
    /// Check if this account is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Collection directory, or `None` for admins.
    pub fn collection_directory(&self) -> Option<&str> {
        match self.role {
            AccountRole::Regular => Some(&self.directory),
            AccountRole::Admin => None,
        }
    }
}

impl<'r> FromRow<'r, SqliteRow> for Account {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let is_admin: bool = row.try_get("is_admin")?;
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            display_name: row.try_get("display_name")?,
            directory: row.try_get("directory")?,
            role: AccountRole::from_admin_flag(is_admin),
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Data for creating a new account.
///
/// The password is plaintext; the repository hashes it before storage.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Login username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Display name. Defaults to the username.
    pub display_name: Option<String>,
    /// Collection directory. Required for regular accounts.
    pub directory: String,
    /// Account role.
    pub role: AccountRole,
}

impl NewAccount {
    /// Create a new regular account.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        directory: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            display_name: None,
            directory: directory.into(),
            role: AccountRole::Regular,
        }
    }

    /// Create a new admin account without a directory.
    pub fn admin(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            display_name: None,
            directory: String::new(),
            role: AccountRole::Admin,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Set the role.
    pub fn with_role(mut self, role: AccountRole) -> Self {
        self.role = role;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_flag() {
        assert_eq!(AccountRole::from_admin_flag(true), AccountRole::Admin);
        assert_eq!(AccountRole::from_admin_flag(false), AccountRole::Regular);
        assert!(AccountRole::Admin.is_admin());
        assert!(!AccountRole::Regular.is_admin());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(AccountRole::Admin.to_string(), "admin");
        assert_eq!(AccountRole::Regular.to_string(), "regular");
        assert_eq!(AccountRole::default(), AccountRole::Regular);
    }

    #[test]
    fn test_new_account_builders() {
        let account = NewAccount::new("alice", "pw2", "alice").with_display_name("Alice");
        assert_eq!(account.username, "alice");
        assert_eq!(account.directory, "alice");
        assert_eq!(account.display_name.as_deref(), Some("Alice"));
        assert_eq!(account.role, AccountRole::Regular);

        let admin = NewAccount::admin("root", "pw1");
        assert!(admin.directory.is_empty());
        assert_eq!(admin.role, AccountRole::Admin);

        let promoted = NewAccount::new("bob", "pw", "bob").with_role(AccountRole::Admin);
        assert_eq!(promoted.role, AccountRole::Admin);
    }

    #[test]
    fn test_collection_directory() {
        let mut account = Account {
            id: 1,
            username: "alice".to_string(),
            password_hash: String::new(),
            display_name: "alice".to_string(),
            directory: "alice".to_string(),
            role: AccountRole::Regular,
            created_at: String::new(),
        };
        assert_eq!(account.collection_directory(), Some("alice"));

        account.role = AccountRole::Admin;
        assert_eq!(account.collection_directory(), None);
    }
}
