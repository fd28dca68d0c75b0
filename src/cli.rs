//! CLI command definitions using clap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// checkers-sync - keep checks service checkers in line with a declared list
#[derive(Parser, Debug)]
#[command(name = "checkers-sync")]
#[command(version)]
#[command(about = "Create or update checkers on a checks service to match a declared list")]
#[command(
    long_about = "checkers-sync lists the checkers defined on a review server's checks plugin, compares them with a declared list, and creates or updates only what differs. Checkers missing from the list are never deleted."
)]
pub struct Cli {
    /// Config file (TOML, or JSON when the extension is .json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Review server root URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Metadata server token URL
    #[arg(long, global = true)]
    pub token_url: Option<String>,

    /// Access token to use instead of asking the metadata server
    #[arg(long, global = true, env = "CHECKS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or update checkers so the service matches the declared list
    Apply {
        /// YAML or JSON file holding the desired checkers
        #[arg(short, long)]
        file: PathBuf,

        /// Report what would change without changing anything
        #[arg(short, long, default_value_t = false)]
        dry_run: bool,
    },

    /// Print the checkers currently defined
    List,
}
