//! Core types, errors, and collaborator traits for checkers-sync.
//!
//! A [`Checker`] is a schema-less bag of fields keyed by name. The only field
//! this crate gives meaning to is `uuid`, the remote primary key. Everything
//! that talks to the network sits behind [`TokenProvider`] and
//! [`CheckerStore`] so the reconciler can be driven by any backend.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use store::{CheckerStore, TokenProvider};
pub use types::{AccessToken, Checker, CheckerSpec, ExistingChecker, FieldValue, UUID_FIELD};
