//! Database schema and migrations for Sharebox.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - accounts table
    r#"
-- Accounts table for authentication and collection ownership
CREATE TABLE accounts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,           -- Argon2id PHC string
    display_name    TEXT NOT NULL,
    directory       TEXT NOT NULL,           -- relative to storage root
    is_admin        INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_accounts_is_admin ON accounts(is_admin);
"#,
    // v2: Server-side sessions
    r#"
-- One row per issued session token, keyed by the token's jti
CREATE TABLE sessions (
    id              TEXT PRIMARY KEY,
    account_id      INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    expires_at      TEXT NOT NULL,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    revoked_at      TEXT
);

CREATE INDEX idx_sessions_account_id ON sessions(account_id);
"#,
];
