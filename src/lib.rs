#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # checkers-sync
//!
//! Keeps the checkers defined on a review server's checks plugin in line
//! with a declared list. See `checkers-reconciler` for the algorithm and
//! `checkers-client` for the wire protocol.

pub mod cli;
pub mod commands;
pub mod input;

pub use checkers_core;
pub use checkers_reconciler::RunResult;
pub use commands::execute_command;
