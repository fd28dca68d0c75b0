//! CLI command handlers.
//!
//! Handlers return the JSON document to print; `main` does the printing.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use checkers_client::{ChecksClient, ChecksConfig, MetadataTokenProvider, StaticTokenProvider};
use checkers_core::{CheckerStore, TokenProvider};
use checkers_reconciler::{Reconciler, ReconcilerConfig};
use serde_json::Value;
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::input::load_desired;

/// Execute a CLI command.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the command fails.
pub async fn execute_command(cli: Cli) -> Result<Value> {
    let config = resolve_config(&cli)?;
    let token_provider = token_provider(cli.token.as_deref(), &config)?;
    let store = Arc::new(ChecksClient::new(&config).context("Failed to build checks client")?);

    match cli.command {
        Commands::Apply { file, dry_run } => cmd_apply(&file, dry_run, token_provider, store).await,
        Commands::List => cmd_list(token_provider.as_ref(), store.as_ref()).await,
    }
}

/// Build the client configuration: file (or environment), then flags.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded.
pub fn resolve_config(cli: &Cli) -> Result<ChecksConfig> {
    let mut config = match &cli.config {
        Some(path) => ChecksConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ChecksConfig::from_env(),
    };

    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(token_url) = &cli.token_url {
        config.token_url.clone_from(token_url);
    }

    Ok(config)
}

fn token_provider(token: Option<&str>, config: &ChecksConfig) -> Result<Arc<dyn TokenProvider>> {
    match token {
        Some(token) => Ok(Arc::new(StaticTokenProvider::new(token))),
        None => Ok(Arc::new(
            MetadataTokenProvider::new(config).context("Failed to build token provider")?,
        )),
    }
}

async fn cmd_apply(
    file: &Path,
    dry_run: bool,
    token_provider: Arc<dyn TokenProvider>,
    store: Arc<dyn CheckerStore>,
) -> Result<Value> {
    let desired = load_desired(file)?;
    info!(file = %file.display(), count = desired.len(), "Loaded desired checkers");

    let reconciler = Reconciler::new(token_provider, store, ReconcilerConfig { dry_run });
    let result = reconciler
        .reconcile(&desired)
        .await
        .context("Reconciliation failed")?;

    Ok(serde_json::to_value(&result)?)
}

async fn cmd_list(token_provider: &dyn TokenProvider, store: &dyn CheckerStore) -> Result<Value> {
    let token = token_provider.acquire().await?;
    let checkers = store.list_checkers(&token).await?;
    Ok(serde_json::to_value(&checkers)?)
}
