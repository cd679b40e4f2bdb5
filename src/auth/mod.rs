//! Authentication module for Sharebox.
//!
//! This module provides password hashing and the access controller that
//! turns sessions into authorization decisions.

mod access;
mod password;

pub use access::{
    AccessController, Principal, Requirement, Session, DEFAULT_SESSION_TTL_SECS,
};
pub use password::{
    dummy_verify, hash_password, validate_password, verify_password, PasswordError,
    MAX_PASSWORD_LENGTH,
};
