//! Storage for the personal CRM server.
//!
//! This crate provides the storage abstraction behind the HTTP API: users,
//! their contacts, circles, and interactions. Ownership is recorded on every
//! record; enforcing it is the caller's job.

mod error;
mod memory;
mod traits;

pub use error::*;
pub use memory::*;
pub use traits::*;
