//! Access control for Sharebox.
//!
//! Every permission decision goes through [`AccessController::authorize`].
//! A session is an explicit value handed in by the caller; the controller
//! never reads ambient request state. Each session is also recorded in the
//! database, and only a live record makes it authenticate.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::password::{dummy_verify, verify_password};
use crate::db::{Account, AccountRepository, SessionRepository};
use crate::{Result, ShareboxError};

/// Default session lifetime in seconds.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 12 * 60 * 60;

/// Authenticated session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Server-side session ID.
    pub id: String,
    /// ID of the logged-in account.
    pub account_id: i64,
    /// Admin flag captured at login.
    pub is_admin: bool,
}

impl Session {
    /// Create a new, not yet recorded, session for an account.
    pub fn for_account(account: &Account) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: account.id,
            is_admin: account.is_admin(),
        }
    }
}

/// The caller behind a session.
#[derive(Debug, Clone)]
pub enum Principal {
    /// No session, or a session whose account is gone.
    Anonymous,
    /// A live account.
    Authenticated(Account),
}

impl Principal {
    /// The account, if authenticated.
    pub fn account(&self) -> Option<&Account> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated(account) => Some(account),
        }
    }
}

/// What an operation requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// A regular account accessing its own collection.
    OwnFiles(i64),
    /// Any admin.
    Admin,
    /// An admin accessing a regular account's collection.
    AdminViewAny(i64),
}

/// Login, logout, session resolution and authorization.
pub struct AccessController<'a> {
    pool: &'a SqlitePool,
    session_ttl_secs: u64,
}

impl<'a> AccessController<'a> {
    /// Create a new AccessController with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }

    /// Set how long new sessions stay live.
    pub fn with_session_ttl(mut self, secs: u64) -> Self {
        self.session_ttl_secs = secs;
        self
    }

    /// Check credentials and open a session.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let repo = AccountRepository::new(self.pool);

        let Some(account) = repo.get_by_username(username).await? else {
            dummy_verify(password);
            info!(username, "login failed");
            return Err(ShareboxError::InvalidCredentials);
        };

        if verify_password(password, &account.password_hash).is_err() {
            info!(username, "login failed");
            return Err(ShareboxError::InvalidCredentials);
        }

        let session = Session::for_account(&account);
        SessionRepository::new(self.pool)
            .create(&session.id, session.account_id, self.session_ttl_secs)
            .await?;

        info!(account_id = account.id, username, "login succeeded");
        Ok(session)
    }

    /// End a session and revoke its record.
    ///
    /// Calling it on an empty or already revoked session is a no-op.
    pub async fn logout(&self, session: &mut Option<Session>) -> Result<()> {
        let Some(ended) = session.take() else {
            return Ok(());
        };

        let revoked = SessionRepository::new(self.pool).revoke(&ended.id).await?;
        debug!(account_id = ended.account_id, revoked, "logout");
        Ok(())
    }

    /// Resolve a session to the account behind it.
    ///
    /// A revoked or expired session, a session whose account was deleted,
    /// or one whose admin flag no longer matches the account, resolves to
    /// `Anonymous`.
    pub async fn resolve(&self, session: Option<&Session>) -> Result<Principal> {
        let Some(session) = session else {
            return Ok(Principal::Anonymous);
        };

        let live = SessionRepository::new(self.pool)
            .is_active(&session.id, session.account_id)
            .await?;
        if !live {
            debug!(account_id = session.account_id, "session not live, treating as anonymous");
            return Ok(Principal::Anonymous);
        }

        let repo = AccountRepository::new(self.pool);
        match repo.get_by_id(session.account_id).await? {
            Some(account) if account.is_admin() == session.is_admin => {
                Ok(Principal::Authenticated(account))
            }
            Some(_) => {
                warn!(account_id = session.account_id, "session role mismatch, treating as anonymous");
                Ok(Principal::Anonymous)
            }
            None => {
                warn!(account_id = session.account_id, "session for deleted account, treating as anonymous");
                Ok(Principal::Anonymous)
            }
        }
    }

    /// Decide whether the session may perform an operation.
    ///
    /// Returns the caller's account for `OwnFiles` and `Admin`, and the
    /// target account for `AdminViewAny`.
    pub async fn authorize(
        &self,
        session: Option<&Session>,
        requirement: Requirement,
    ) -> Result<Account> {
        let account = match self.resolve(session).await? {
            Principal::Anonymous => return Err(ShareboxError::Unauthenticated),
            Principal::Authenticated(account) => account,
        };

        match requirement {
            Requirement::OwnFiles(collection_id) => {
                if account.is_admin() {
                    return Err(ShareboxError::Forbidden(
                        "admin accounts have no collection".to_string(),
                    ));
                }
                if account.id != collection_id {
                    warn!(
                        account_id = account.id,
                        collection_id, "access to another collection denied"
                    );
                    return Err(ShareboxError::Forbidden(
                        "not your collection".to_string(),
                    ));
                }
                Ok(account)
            }
            Requirement::Admin => {
                if !account.is_admin() {
                    return Err(ShareboxError::Forbidden(
                        "admin access required".to_string(),
                    ));
                }
                Ok(account)
            }
            Requirement::AdminViewAny(collection_id) => {
                if !account.is_admin() {
                    return Err(ShareboxError::Forbidden(
                        "admin access required".to_string(),
                    ));
                }
                let target = AccountRepository::new(self.pool)
                    .get_by_id(collection_id)
                    .await?
                    .ok_or_else(|| ShareboxError::NotFound("account".to_string()))?;
                if target.is_admin() {
                    return Err(ShareboxError::Forbidden(
                        "admin accounts have no collection".to_string(),
                    ));
                }
                Ok(target)
            }
        }
    }

    /// Shorthand for `authorize(session, Requirement::OwnFiles(id))`.
    pub async fn authorize_own_files(
        &self,
        session: Option<&Session>,
        collection_id: i64,
    ) -> Result<Account> {
        self.authorize(session, Requirement::OwnFiles(collection_id))
            .await
    }

    /// Shorthand for `authorize(session, Requirement::Admin)`.
    pub async fn authorize_admin(&self, session: Option<&Session>) -> Result<Account> {
        self.authorize(session, Requirement::Admin).await
    }

    /// Shorthand for `authorize(session, Requirement::AdminViewAny(id))`.
    pub async fn authorize_admin_view_any(
        &self,
        session: Option<&Session>,
        collection_id: i64,
    ) -> Result<Account> {
        self.authorize(session, Requirement::AdminViewAny(collection_id))
            .await
    }
}
