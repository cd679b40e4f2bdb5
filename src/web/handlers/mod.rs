//! API handlers for the Web API.

pub mod admin;
pub mod auth;
pub mod file;

pub use admin::*;
pub use auth::*;
pub use file::*;

use std::sync::Arc;

use crate::auth::AccessController;
use crate::catalog::Catalog;
use crate::file::CollectionStorage;
use crate::Database;

use super::middleware::JwtState;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database pool.
    pub db: Database,
    /// Per-account collection storage.
    pub storage: CollectionStorage,
    /// Session token settings.
    pub jwt: Arc<JwtState>,
    /// Remote drive catalog.
    pub catalog: Arc<Catalog>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, storage: CollectionStorage, jwt: Arc<JwtState>) -> Self {
        Self {
            db,
            storage,
            jwt,
            catalog: Arc::new(Catalog::default()),
        }
    }

    /// Attach a remote catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Access controller over this state's database.
    ///
    /// Sessions it opens live as long as the tokens that carry them.
    pub fn access(&self) -> AccessController<'_> {
        AccessController::new(self.db.pool()).with_session_ttl(self.jwt.expiry_secs)
    }
}
