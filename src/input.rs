//! Loading the desired checker list.

use std::path::Path;

use anyhow::{Context, Result};
use checkers_core::CheckerSpec;
use serde::Deserialize;

/// Either the module-argument shape `{ checkers: [...] }` or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DesiredDocument {
    Bare(Vec<CheckerSpec>),
    Wrapped { checkers: Vec<CheckerSpec> },
}

impl DesiredDocument {
    fn into_checkers(self) -> Vec<CheckerSpec> {
        match self {
            Self::Bare(checkers) | Self::Wrapped { checkers } => checkers,
        }
    }
}

/// Parse desired checkers from YAML text. JSON is accepted too.
///
/// # Errors
///
/// Returns an error if the text is neither a list of checkers nor a map
/// with a `checkers` list.
pub fn parse_desired(content: &str) -> Result<Vec<CheckerSpec>> {
    let document: DesiredDocument = serde_yaml::from_str(content)
        .context("expected a list of checkers or a map with a `checkers` list")?;
    Ok(document.into_checkers())
}

/// Read desired checkers from `path`; `.json` files are parsed as JSON,
/// anything else as YAML.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_desired(path: &Path) -> Result<Vec<CheckerSpec>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if path.extension().is_some_and(|e| e == "json") {
        let document: DesiredDocument = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(document.into_checkers())
    } else {
        parse_desired(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}
