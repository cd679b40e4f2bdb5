//! Middleware for Web API.

pub mod cors;
pub mod session;

pub use cors::create_cors_layer;
pub use session::{jwt_auth, JwtState, SessionClaims, SessionToken};
