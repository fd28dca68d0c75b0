//! # checkers-sync
//!
//! Entry point: parse arguments, set up logging, run one command, print its
//! JSON result on stdout.
//!
//! Logs go to stderr so stdout stays machine-readable. Any failure exits
//! with status 1 after printing the error chain.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use checkers_sync::cli::Cli;
use checkers_sync::execute_command;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let output = execute_command(cli).await?;
    let rendered = serde_json::to_string_pretty(&output).context("Failed to render output")?;
    println!("{rendered}");

    Ok(())
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
