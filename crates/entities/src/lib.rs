//! Core entity definitions for the personal CRM.
//!
//! This crate defines the data types shared by the server, its storage layer,
//! and the contacts client: contacts and their inputs, circles, interactions,
//! and users.

mod circle;
mod contact;
mod interaction;
mod user;

pub use circle::*;
pub use contact::*;
pub use interaction::*;
pub use user::*;
