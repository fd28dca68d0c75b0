//! Desired-state reconciliation for checkers.
//!
//! This crate converges the checkers held by a remote checks service toward
//! a declared list:
//!
//! - **Desired State**: an ordered list of checker specs, each carrying a `uuid`
//! - **Actual State**: a fresh listing from the [`CheckerStore`], indexed by `uuid`
//! - **Diff**: only the fields a spec names are compared
//! - **Actions**: create what is missing, update what is dirty, leave the rest
//!
//! Nothing is ever deleted. Specs are processed strictly in input order and
//! the first failure aborts the run; work already done stays done, and a
//! re-run is safe because clean specs cause no calls.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use checkers_client::{ChecksClient, ChecksConfig, MetadataTokenProvider};
//! use checkers_reconciler::{Reconciler, ReconcilerConfig};
//!
//! let config = ChecksConfig::from_env();
//! let reconciler = Reconciler::new(
//!     Arc::new(MetadataTokenProvider::new(&config)?),
//!     Arc::new(ChecksClient::new(&config)?),
//!     ReconcilerConfig::default(),
//! );
//! let result = reconciler.reconcile(&desired).await?;
//! println!("changed: {}", result.changed);
//! ```

#![forbid(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod reconciler;
pub mod types;

pub use checkers_core::{CheckerStore, Error, Result, TokenProvider};
pub use reconciler::{Reconciler, ReconcilerConfig, plan_action};
pub use types::{CheckerIndex, ReconcileAction, RunResult};
