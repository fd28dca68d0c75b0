#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # checkers-client
//!
//! Network side of checkers-sync: talks to the checks plugin REST API and to
//! the instance metadata server.
//!
//! ## Pieces
//!
//! - [`Transport`] - authenticated GET/POST that strips the anti-XSSI
//!   prefix from every response before decoding JSON
//! - [`MetadataTokenProvider`] / [`StaticTokenProvider`] - where the bearer
//!   credential comes from
//! - [`ChecksClient`] - list, create and update checkers
//!
//! ## Example
//!
//! ```ignore
//! use checkers_client::{ChecksClient, ChecksConfig, MetadataTokenProvider};
//! use checkers_core::{CheckerStore, TokenProvider};
//!
//! let config = ChecksConfig::from_env();
//! let token = MetadataTokenProvider::new(&config)?.acquire().await?;
//! let client = ChecksClient::new(&config)?;
//! for checker in client.list_checkers(&token).await? {
//!     println!("{:?}", checker.uuid());
//! }
//! ```

pub mod config;
pub mod error;
pub mod store;
pub mod token;
pub mod transport;

pub use config::ChecksConfig;
pub use error::{Error, Result};
pub use store::{CHECKERS_PATH, ChecksClient};
pub use token::{MetadataTokenProvider, StaticTokenProvider};
pub use transport::{MAGIC_PREFIX, Transport, decode_prefixed_json};
