//! Authentication for the personal CRM.
//!
//! This crate provides:
//! - JWT access token generation and validation (server side)
//! - The session model consumed by clients: who is signed in, if anyone,
//!   and whether that is known yet

mod error;
mod jwt;
mod session;
mod user;

pub use error::*;
pub use jwt::*;
pub use session::*;
pub use user::*;

/// Default JWT expiration time in hours.
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 24;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "crm";
