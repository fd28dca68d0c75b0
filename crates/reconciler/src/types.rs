//! Core types for the reconciler.

use std::collections::HashMap;

use checkers_core::ExistingChecker;
use itertools::Itertools;
use serde::Serialize;
use tracing::warn;

/// Existing checkers keyed by `uuid`, built once per run from the listing.
///
/// Borrowed from the listing, which the run keeps for its result.
#[derive(Debug, Clone, Default)]
pub struct CheckerIndex<'a> {
    by_uuid: HashMap<&'a str, &'a ExistingChecker>,
}

impl<'a> CheckerIndex<'a> {
    /// Index `existing` by `uuid`.
    ///
    /// Records without a usable `uuid` cannot be matched by any spec and are
    /// left out. If the remote lists a `uuid` twice the later record wins.
    pub fn build(existing: &'a [ExistingChecker]) -> Self {
        let (keyed, unkeyed): (Vec<_>, Vec<_>) = existing
            .iter()
            .partition(|checker| checker.uuid().is_some());

        for checker in unkeyed {
            warn!(checker = %checker.to_json_string(), "Existing checker has no uuid, ignoring");
        }

        for uuid in keyed.iter().filter_map(|c| c.uuid()).duplicates() {
            warn!(uuid, "Existing checkers share a uuid, keeping the last");
        }

        let by_uuid = keyed
            .into_iter()
            .filter_map(|checker| checker.uuid().map(|uuid| (uuid, checker)))
            .collect();

        Self { by_uuid }
    }

    #[must_use]
    pub fn get(&self, uuid: &str) -> Option<&'a ExistingChecker> {
        self.by_uuid.get(uuid).copied()
    }

    /// Number of distinct uuids indexed.
    #[must_use]
    pub fn count(&self) -> usize {
        self.by_uuid.len()
    }
}

/// What the reconciler decided for one spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReconcileAction {
    /// No checker with this uuid exists.
    Create { uuid: String },
    /// The checker exists but these fields differ.
    Update { uuid: String, fields: Vec<String> },
    /// Every field the spec names already matches.
    Unchanged { uuid: String },
}

impl ReconcileAction {
    /// Get a description of the action.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Create { uuid } => format!("create checker {uuid}"),
            Self::Update { uuid, fields } => {
                format!("update checker {uuid} ({})", fields.join(", "))
            }
            Self::Unchanged { uuid } => format!("checker {uuid} unchanged"),
        }
    }
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Whether any checker was created or updated.
    pub changed: bool,
    /// Remote representation of every created or updated checker, in input
    /// order. In a dry run, the predicted representation.
    pub updated_checkers: Vec<ExistingChecker>,
    /// All checkers as listed before the run.
    pub existing_checkers: Vec<ExistingChecker>,
    /// One entry per desired spec.
    pub actions: Vec<ReconcileAction>,
    /// Whether mutations were skipped.
    pub dry_run: bool,
}

impl RunResult {
    /// Create a run result; `changed` follows from `updated_checkers`.
    #[must_use]
    pub fn new(
        updated_checkers: Vec<ExistingChecker>,
        existing_checkers: Vec<ExistingChecker>,
        actions: Vec<ReconcileAction>,
        dry_run: bool,
    ) -> Self {
        Self {
            changed: !updated_checkers.is_empty(),
            updated_checkers,
            existing_checkers,
            actions,
            dry_run,
        }
    }

    /// Number of create actions.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, ReconcileAction::Create { .. }))
            .count()
    }

    /// Number of update actions.
    #[must_use]
    pub fn updated_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, ReconcileAction::Update { .. }))
            .count()
    }
}
