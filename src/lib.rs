//! Sharebox - per-account media collections behind a simple login.
//!
//! Each regular account owns a directory of media files. Accounts log in,
//! browse their own collection and stream or download files from it; admins
//! manage accounts and may view any regular account's collection.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use auth::{
    hash_password, validate_password, verify_password, AccessController, PasswordError,
    Principal, Requirement, Session,
};
pub use catalog::{Catalog, RemoteCollection, RemoteFile};
pub use config::Config;
pub use db::{
    Account, AccountRepository, AccountRole, Database, NewAccount, SessionRecord,
    SessionRepository,
};
pub use error::{Result, ShareboxError};
pub use file::{Category, CollectionStorage, FileEntry};
pub use web::{AppState, JwtState, WebServer};
