//! Reconciler implementation.

use std::collections::HashMap;
use std::sync::Arc;

use checkers_core::{
    AccessToken, CheckerSpec, CheckerStore, Error, ExistingChecker, Result, TokenProvider,
};
use tracing::{debug, info};

use crate::types::{CheckerIndex, ReconcileAction, RunResult};

/// Configuration for the reconciler.
#[derive(Debug, Clone, Default)]
pub struct ReconcilerConfig {
    /// Plan and report without calling create or update.
    pub dry_run: bool,
}

/// Decide what to do with `spec` given the checker currently stored under
/// its `uuid`.
#[must_use]
pub fn plan_action(
    uuid: &str,
    spec: &CheckerSpec,
    current: Option<&ExistingChecker>,
) -> ReconcileAction {
    let uuid = uuid.to_string();
    match current {
        None => ReconcileAction::Create { uuid },
        Some(existing) => {
            let fields = spec.dirty_fields(existing);
            if fields.is_empty() {
                ReconcileAction::Unchanged { uuid }
            } else {
                ReconcileAction::Update { uuid, fields }
            }
        }
    }
}

/// Converges the remote checkers toward a desired list.
pub struct Reconciler {
    /// Credential source, asked once per run.
    token_provider: Arc<dyn TokenProvider>,
    /// Remote checker collection.
    store: Arc<dyn CheckerStore>,
    /// Configuration.
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a new reconciler.
    pub fn new(
        token_provider: Arc<dyn TokenProvider>,
        store: Arc<dyn CheckerStore>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            token_provider,
            store,
            config,
        }
    }

    /// Core reconciliation: list the remote, then create or update each
    /// desired spec in order.
    ///
    /// Later specs are compared against what earlier specs in the same run
    /// wrote, so a repeated `uuid` behaves as last write wins.
    ///
    /// # Errors
    ///
    /// - [`Error::Auth`] if no credential could be obtained
    /// - [`Error::Validation`] for the first spec without a `uuid`
    /// - [`Error::Transport`] for the first failed remote call
    ///
    /// Changes applied before the failure are not rolled back.
    pub async fn reconcile(&self, desired: &[CheckerSpec]) -> Result<RunResult> {
        let token = self.token_provider.acquire().await?;
        let existing = self.store.list_checkers(&token).await?;

        let (updated, actions) = {
            let index = CheckerIndex::build(&existing);
            info!(
                desired = desired.len(),
                existing = existing.len(),
                indexed = index.count(),
                dry_run = self.config.dry_run,
                "Starting reconciliation"
            );
            self.converge(&token, &index, desired).await?
        };

        let result = RunResult::new(updated, existing, actions, self.config.dry_run);

        if result.changed {
            info!(
                created = result.created_count(),
                updated = result.updated_count(),
                "Reconciliation complete"
            );
        } else {
            info!("Checkers already converged");
        }

        Ok(result)
    }

    async fn converge(
        &self,
        token: &AccessToken,
        index: &CheckerIndex<'_>,
        desired: &[CheckerSpec],
    ) -> Result<(Vec<ExistingChecker>, Vec<ReconcileAction>)> {
        let mut written: HashMap<&str, ExistingChecker> = HashMap::new();
        let mut updated = Vec::new();
        let mut actions = Vec::with_capacity(desired.len());

        for spec in desired {
            let uuid = spec.uuid().ok_or_else(|| {
                Error::validation(spec.to_json_string(), "checker uuid is required")
            })?;

            let current = written.get(uuid).or_else(|| index.get(uuid));
            let action = plan_action(uuid, spec, current);
            debug!(action = %action.description(), "Planned action");

            if let Some(outcome) = self.apply(token, &action, spec, current).await? {
                written.insert(uuid, outcome.clone());
                updated.push(outcome);
            }
            actions.push(action);
        }

        Ok((updated, actions))
    }

    /// Apply one action, returning the checker as it now stands remotely.
    async fn apply(
        &self,
        token: &AccessToken,
        action: &ReconcileAction,
        spec: &CheckerSpec,
        current: Option<&ExistingChecker>,
    ) -> Result<Option<ExistingChecker>> {
        match action {
            ReconcileAction::Unchanged { .. } => Ok(None),
            ReconcileAction::Create { .. } if self.config.dry_run => Ok(Some(spec.clone())),
            ReconcileAction::Create { .. } => {
                self.store.create_checker(token, spec).await.map(Some)
            }
            ReconcileAction::Update { .. } if self.config.dry_run => Ok(Some(
                current.map_or_else(|| spec.clone(), |existing| existing.overlay(spec)),
            )),
            ReconcileAction::Update { uuid, .. } => {
                self.store.update_checker(token, uuid, spec).await.map(Some)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use checkers_core::{Checker, FieldValue};
    use std::collections::BTreeMap;
    use tokio::sync::Mutex;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        List,
        Create(String),
        Update(String),
    }

    /// In-memory checks service that records every call.
    #[derive(Default)]
    struct RecordingStore {
        remote: Mutex<BTreeMap<String, Checker>>,
        calls: Mutex<Vec<Call>>,
        fail_update: Option<String>,
    }

    impl RecordingStore {
        fn with_existing(existing: Vec<Checker>) -> Self {
            let remote = existing
                .into_iter()
                .filter_map(|c| {
                    let uuid = c.uuid()?.to_string();
                    Some((uuid, c))
                })
                .collect();
            Self {
                remote: Mutex::new(remote),
                ..Default::default()
            }
        }

        fn failing_update(mut self, uuid: &str) -> Self {
            self.fail_update = Some(uuid.to_string());
            self
        }

        async fn calls(&self) -> Vec<Call> {
            self.calls.lock().await.clone()
        }

        async fn mutations(&self) -> Vec<Call> {
            self.calls()
                .await
                .into_iter()
                .filter(|c| *c != Call::List)
                .collect()
        }

        async fn remote(&self, uuid: &str) -> Option<Checker> {
            self.remote.lock().await.get(uuid).cloned()
        }
    }

    #[async_trait]
    impl CheckerStore for RecordingStore {
        async fn list_checkers(&self, _token: &AccessToken) -> Result<Vec<ExistingChecker>> {
            self.calls.lock().await.push(Call::List);
            Ok(self.remote.lock().await.values().cloned().collect())
        }

        async fn create_checker(
            &self,
            _token: &AccessToken,
            spec: &CheckerSpec,
        ) -> Result<ExistingChecker> {
            let uuid = spec.uuid().unwrap_or_default().to_string();
            self.calls.lock().await.push(Call::Create(uuid.clone()));
            let created = spec.clone().with_field("created", "now");
            self.remote.lock().await.insert(uuid, created.clone());
            Ok(created)
        }

        async fn update_checker(
            &self,
            _token: &AccessToken,
            uuid: &str,
            spec: &CheckerSpec,
        ) -> Result<ExistingChecker> {
            self.calls.lock().await.push(Call::Update(uuid.to_string()));
            if self.fail_update.as_deref() == Some(uuid) {
                return Err(Error::transport_status(
                    format!("/a/plugins/checks/checkers/{uuid}"),
                    500,
                    "boom",
                ));
            }
            let mut remote = self.remote.lock().await;
            let merged = remote
                .get(uuid)
                .map_or_else(|| spec.clone(), |existing| existing.overlay(spec));
            remote.insert(uuid.to_string(), merged.clone());
            Ok(merged)
        }
    }

    struct FixedToken;

    #[async_trait]
    impl TokenProvider for FixedToken {
        async fn acquire(&self) -> Result<AccessToken> {
            Ok(AccessToken::new("token"))
        }
    }

    struct NoToken;

    #[async_trait]
    impl TokenProvider for NoToken {
        async fn acquire(&self) -> Result<AccessToken> {
            Err(Error::auth("metadata", "unreachable"))
        }
    }

    fn checker(uuid: &str, enabled: bool) -> Checker {
        Checker::new()
            .with_field("uuid", uuid)
            .with_field("enabled", enabled)
    }

    fn setup(store: RecordingStore, dry_run: bool) -> (Reconciler, Arc<RecordingStore>) {
        let store = Arc::new(store);
        let reconciler = Reconciler::new(
            Arc::new(FixedToken),
            store.clone(),
            ReconcilerConfig { dry_run },
        );
        (reconciler, store)
    }

    #[test]
    fn test_plan_action() {
        let existing = checker("a", true);
        assert_eq!(
            plan_action("a", &checker("a", true), None),
            ReconcileAction::Create {
                uuid: "a".to_string(),
            }
        );
        assert_eq!(
            plan_action("a", &checker("a", true), Some(&existing)),
            ReconcileAction::Unchanged {
                uuid: "a".to_string(),
            }
        );
        assert_eq!(
            plan_action("a", &checker("a", false), Some(&existing)),
            ReconcileAction::Update {
                uuid: "a".to_string(),
                fields: vec!["enabled".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_update_and_create_in_order() -> TestResult {
        let store = RecordingStore::with_existing(vec![checker("A", true)]);
        let (reconciler, store) = setup(store, false);
        let desired = vec![checker("A", false), checker("B", true)];

        let result = reconciler.reconcile(&desired).await?;

        assert!(result.changed);
        assert_eq!(
            store.mutations().await,
            vec![Call::Update("A".to_string()), Call::Create("B".to_string())]
        );
        let uuids: Vec<_> = result
            .updated_checkers
            .iter()
            .filter_map(Checker::uuid)
            .collect();
        assert_eq!(uuids, vec!["A", "B"]);
        assert_eq!(
            result.updated_checkers.first().and_then(|c| c.get("enabled")),
            Some(&FieldValue::Bool(false))
        );
        assert_eq!(result.existing_checkers, vec![checker("A", true)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_clean_spec_makes_no_calls() -> TestResult {
        let store = RecordingStore::with_existing(vec![checker("A", true)]);
        let (reconciler, store) = setup(store, false);

        let result = reconciler.reconcile(&[checker("A", true)]).await?;

        assert!(!result.changed);
        assert!(result.updated_checkers.is_empty());
        assert_eq!(store.calls().await, vec![Call::List]);
        assert_eq!(
            result.actions,
            vec![ReconcileAction::Unchanged {
                uuid: "A".to_string(),
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() -> TestResult {
        let store = RecordingStore::with_existing(vec![checker("A", true)]);
        let (reconciler, store) = setup(store, false);
        let desired = vec![
            checker("A", false).with_field("description", "lint"),
            checker("B", true).with_field("description", FieldValue::Null),
        ];

        let first = reconciler.reconcile(&desired).await?;
        let mutations_after_first = store.mutations().await.len();
        let second = reconciler.reconcile(&desired).await?;

        assert!(first.changed);
        assert!(!second.changed);
        assert!(second.updated_checkers.is_empty());
        assert_eq!(store.mutations().await.len(), mutations_after_first);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_keeps_unmentioned_fields() -> TestResult {
        let existing = checker("A", true).with_field("repository", "gerrit");
        let (reconciler, store) = setup(RecordingStore::with_existing(vec![existing]), false);

        reconciler.reconcile(&[checker("A", false)]).await?;

        let remote = store.remote("A").await.ok_or("checker A missing")?;
        assert_eq!(remote.get("repository"), Some(&FieldValue::from("gerrit")));
        assert_eq!(remote.get("enabled"), Some(&FieldValue::Bool(false)));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_uuid_aborts_before_mutation() -> TestResult {
        let (reconciler, store) = setup(RecordingStore::default(), false);
        let desired = vec![Checker::new().with_field("enabled", true)];

        let result = reconciler.reconcile(&desired).await;

        match result {
            Err(Error::Validation { checker, .. }) => assert!(checker.contains("enabled")),
            other => return Err(format!("expected validation error, got {other:?}").into()),
        }
        assert!(store.mutations().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_uuid_stops_later_specs() -> TestResult {
        let (reconciler, store) = setup(RecordingStore::default(), false);
        let desired = vec![
            checker("A", true),
            Checker::new()
                .with_field("uuid", "")
                .with_field("enabled", true),
            checker("C", true),
        ];

        let result = reconciler.reconcile(&desired).await;

        assert!(matches!(result, Err(ref e) if e.is_validation()));
        // Work done before the bad spec stays done
        assert_eq!(store.mutations().await, vec![Call::Create("A".to_string())]);
        Ok(())
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_run() -> TestResult {
        let store = RecordingStore::with_existing(vec![checker("A", true), checker("B", true)])
            .failing_update("A");
        let (reconciler, store) = setup(store, false);
        let desired = vec![checker("A", false), checker("B", false)];

        let result = reconciler.reconcile(&desired).await;

        assert!(matches!(result, Err(ref e) if e.is_transport()));
        assert_eq!(store.mutations().await, vec![Call::Update("A".to_string())]);
        Ok(())
    }

    #[tokio::test]
    async fn test_auth_failure_makes_no_calls() -> TestResult {
        let store = Arc::new(RecordingStore::default());
        let reconciler = Reconciler::new(
            Arc::new(NoToken),
            store.clone(),
            ReconcilerConfig::default(),
        );

        let result = reconciler.reconcile(&[checker("A", true)]).await;

        assert!(matches!(result, Err(ref e) if e.is_auth()));
        assert!(store.calls().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_uuid_last_write_wins() -> TestResult {
        let (reconciler, store) = setup(RecordingStore::default(), false);
        let desired = vec![checker("A", true), checker("A", false), checker("A", false)];

        let result = reconciler.reconcile(&desired).await?;

        assert_eq!(
            store.mutations().await,
            vec![Call::Create("A".to_string()), Call::Update("A".to_string())]
        );
        assert_eq!(result.updated_checkers.len(), 2);
        let remote = store.remote("A").await.ok_or("checker A missing")?;
        assert_eq!(remote.get("enabled"), Some(&FieldValue::Bool(false)));
        Ok(())
    }

    #[tokio::test]
    async fn test_dry_run_predicts_without_mutating() -> TestResult {
        let existing = checker("A", true).with_field("repository", "gerrit");
        let (reconciler, store) = setup(RecordingStore::with_existing(vec![existing]), true);
        let desired = vec![checker("A", false), checker("B", true)];

        let result = reconciler.reconcile(&desired).await?;

        assert!(result.changed);
        assert!(result.dry_run);
        assert!(store.mutations().await.is_empty());
        let predicted_a = result.updated_checkers.first().ok_or("no prediction for A")?;
        assert_eq!(predicted_a.get("repository"), Some(&FieldValue::from("gerrit")));
        assert_eq!(predicted_a.get("enabled"), Some(&FieldValue::Bool(false)));
        assert_eq!(result.updated_checkers.get(1), desired.get(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_desired_list() -> TestResult {
        let store = RecordingStore::with_existing(vec![checker("A", true)]);
        let (reconciler, store) = setup(store, false);

        let result = reconciler.reconcile(&[]).await?;

        assert!(!result.changed);
        assert!(result.actions.is_empty());
        assert_eq!(result.existing_checkers.len(), 1);
        assert_eq!(store.calls().await, vec![Call::List]);
        Ok(())
    }
}
