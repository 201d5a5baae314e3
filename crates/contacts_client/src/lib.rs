//! Contacts data layer for the personal CRM.
//!
//! A view asks [`Contacts::source`] for "the" contacts interface and gets one
//! of three implementations of [`ContactsApi`], chosen from the current
//! authentication status alone:
//!
//! - while the session is still resolving, a loading stub that lists nothing
//!   and accepts mutations as no-ops;
//! - when nobody is signed in, the [`DemoStore`], a seeded contact list kept
//!   in local storage under a fixed key;
//! - when a user is signed in, a [`LiveClient`] bound to that user, talking
//!   to the server API through a per-user [`QueryCache`].
//!
//! Demo and live data never mix: demo ids carry a reserved prefix, and every
//! cached server response is keyed by the identity it was fetched for.

mod cache;
mod config;
mod demo;
mod demo_data;
mod error;
mod live;
mod selector;
mod storage;

pub use cache::*;
pub use config::*;
pub use demo::*;
pub use demo_data::*;
pub use error::*;
pub use live::*;
pub use selector::*;
pub use storage::*;
