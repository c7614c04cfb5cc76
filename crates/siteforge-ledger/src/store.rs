//! Ledger traits and the in-memory implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use siteforge_core::{
    ChargeMetadata, CreditLedgerEntry, FailureReason, FailureRecord, LedgerError, LedgerResult,
    Snapshot, Version, VersionKind,
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Durable, atomic recording of snapshots.
#[async_trait]
pub trait VersionLedger: Send + Sync {
    /// Record a new version. Either the version is fully visible to later
    /// reads, or nothing was written.
    async fn create_version(
        &self,
        project_id: &str,
        kind: VersionKind,
        snapshot: Snapshot,
        note: &str,
    ) -> LedgerResult<Uuid>;
}

/// Durable, atomic recording of build results against usage credits.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Record a successful build and charge `cost` credits.
    ///
    /// Does not de-duplicate: two calls produce two charges.
    async fn record_success(
        &self,
        project_id: &str,
        cost: u32,
        metadata: ChargeMetadata,
    ) -> LedgerResult<Uuid>;

    /// Record a failed build. Never charges.
    async fn record_failure(
        &self,
        project_id: &str,
        reason: FailureReason,
        metadata: serde_json::Value,
    ) -> LedgerResult<Uuid>;
}

/// Read side of the ledgers. Results are in insertion order.
#[async_trait]
pub trait LedgerHistory: Send + Sync {
    /// Get a version by id.
    async fn version(&self, id: Uuid) -> LedgerResult<Option<Version>>;

    /// All versions of a project.
    async fn versions(&self, project_id: &str) -> LedgerResult<Vec<Version>>;

    /// All failure records of a project.
    async fn failures(&self, project_id: &str) -> LedgerResult<Vec<FailureRecord>>;

    /// All charges of a project.
    async fn charges(&self, project_id: &str) -> LedgerResult<Vec<CreditLedgerEntry>>;

    /// Sum of all charges of a project.
    async fn total_charged(&self, project_id: &str) -> LedgerResult<u64> {
        let charges = self.charges(project_id).await?;
        Ok(charges.iter().map(|c| u64::from(c.cost)).sum())
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    versions: Vec<Version>,
    failures: Vec<FailureRecord>,
    charges: Vec<CreditLedgerEntry>,
}

/// In-memory ledger holding versions, failures and charges.
///
/// Every write validates and appends under a single write guard, so a
/// record is either fully visible or absent.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

fn require_project(project_id: &str) -> LedgerResult<()> {
    if project_id.trim().is_empty() {
        return Err(LedgerError::rejected("project id cannot be empty"));
    }
    Ok(())
}

#[async_trait]
impl VersionLedger for InMemoryLedger {
    async fn create_version(
        &self,
        project_id: &str,
        kind: VersionKind,
        snapshot: Snapshot,
        note: &str,
    ) -> LedgerResult<Uuid> {
        require_project(project_id)?;
        if !snapshot.verify() {
            return Err(LedgerError::rejected("snapshot digest does not match payload"));
        }

        let version = Version {
            id: Uuid::new_v4(),
            project_id: project_id.to_string(),
            kind,
            snapshot,
            note: note.to_string(),
            created_at: Utc::now(),
        };
        let id = version.id;

        let mut state = self.state.write().await;
        state.versions.push(version);

        tracing::debug!(%id, project_id, %kind, "Version recorded");
        Ok(id)
    }
}

#[async_trait]
impl CreditLedger for InMemoryLedger {
    async fn record_success(
        &self,
        project_id: &str,
        cost: u32,
        metadata: ChargeMetadata,
    ) -> LedgerResult<Uuid> {
        require_project(project_id)?;
        if cost == 0 {
            return Err(LedgerError::rejected("charge cost must be positive"));
        }

        let mut state = self.state.write().await;

        // A charge must pay for a stored post-build version of the same project.
        let referenced = state
            .versions
            .iter()
            .find(|v| v.id == metadata.post_version_id);
        match referenced {
            Some(v) if v.kind == VersionKind::PostBuild && v.project_id == project_id => {}
            Some(v) => {
                return Err(LedgerError::rejected(format!(
                    "version {} is a {} version of project {}",
                    v.id, v.kind, v.project_id
                )));
            }
            None => {
                return Err(LedgerError::rejected(format!(
                    "version {} not found",
                    metadata.post_version_id
                )));
            }
        }

        let entry = CreditLedgerEntry {
            id: Uuid::new_v4(),
            project_id: project_id.to_string(),
            cost,
            metadata,
            created_at: Utc::now(),
        };
        let id = entry.id;
        state.charges.push(entry);

        tracing::debug!(%id, project_id, cost, "Charge recorded");
        Ok(id)
    }

    async fn record_failure(
        &self,
        project_id: &str,
        reason: FailureReason,
        metadata: serde_json::Value,
    ) -> LedgerResult<Uuid> {
        require_project(project_id)?;
        if !metadata.is_object() {
            return Err(LedgerError::rejected("failure metadata must be an object"));
        }

        let record = FailureRecord {
            id: Uuid::new_v4(),
            project_id: project_id.to_string(),
            reason,
            metadata,
            created_at: Utc::now(),
        };
        let id = record.id;

        let mut state = self.state.write().await;
        state.failures.push(record);

        tracing::debug!(%id, project_id, %reason, "Failure recorded");
        Ok(id)
    }
}

#[async_trait]
impl LedgerHistory for InMemoryLedger {
    async fn version(&self, id: Uuid) -> LedgerResult<Option<Version>> {
        let state = self.state.read().await;
        Ok(state.versions.iter().find(|v| v.id == id).cloned())
    }

    async fn versions(&self, project_id: &str) -> LedgerResult<Vec<Version>> {
        let state = self.state.read().await;
        Ok(state
            .versions
            .iter()
            .filter(|v| v.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn failures(&self, project_id: &str) -> LedgerResult<Vec<FailureRecord>> {
        let state = self.state.read().await;
        Ok(state
            .failures
            .iter()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn charges(&self, project_id: &str) -> LedgerResult<Vec<CreditLedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .charges
            .iter()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteforge_core::Principal;

    fn principal() -> Principal {
        Principal::new("u1")
    }

    async fn post_build(ledger: &InMemoryLedger, project: &str) -> Uuid {
        let snapshot = Snapshot::new(serde_json::json!({"kind": "post_build"}));
        ledger
            .create_version(project, VersionKind::PostBuild, snapshot, "Post-build snapshot")
            .await
            .unwrap()
    }

    fn charge_for(post_version_id: Uuid) -> ChargeMetadata {
        ChargeMetadata {
            post_version_id,
            pre_version_id: Uuid::new_v4(),
            requested_by: "u1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_read_version() {
        let ledger = InMemoryLedger::new();
        let snapshot = Snapshot::pre_build("Bakery site", &principal());

        let id = ledger
            .create_version("p1", VersionKind::PreBuild, snapshot.clone(), "Pre-build snapshot")
            .await
            .unwrap();

        let version = ledger.version(id).await.unwrap().unwrap();
        assert_eq!(version.kind, VersionKind::PreBuild);
        assert_eq!(version.snapshot, snapshot);
        assert_eq!(ledger.versions("p1").await.unwrap().len(), 1);
        assert!(ledger.versions("p2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tampered_snapshot_rejected() {
        let ledger = InMemoryLedger::new();
        let mut snapshot = Snapshot::new(serde_json::json!({"a": 1}));
        snapshot.payload = serde_json::json!({"a": 2});

        let result = ledger
            .create_version("p1", VersionKind::PreBuild, snapshot, "note")
            .await;
        assert!(matches!(result, Err(LedgerError::Rejected { .. })));
        assert!(ledger.versions("p1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_charge_requires_post_build_version() {
        let ledger = InMemoryLedger::new();

        let missing = ledger.record_success("p1", 1, charge_for(Uuid::new_v4())).await;
        assert!(missing.is_err());

        let pre = ledger
            .create_version(
                "p1",
                VersionKind::PreBuild,
                Snapshot::pre_build("x", &principal()),
                "Pre-build snapshot",
            )
            .await
            .unwrap();
        let wrong_kind = ledger.record_success("p1", 1, charge_for(pre)).await;
        assert!(wrong_kind.is_err());

        let post = post_build(&ledger, "p1").await;
        let wrong_project = ledger.record_success("p2", 1, charge_for(post)).await;
        assert!(wrong_project.is_err());

        assert!(ledger.charges("p1").await.unwrap().is_empty());
        assert!(ledger.charges("p2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_charges_are_not_deduplicated() {
        let ledger = InMemoryLedger::new();
        let post = post_build(&ledger, "p1").await;

        let first = ledger.record_success("p1", 1, charge_for(post)).await.unwrap();
        let second = ledger.record_success("p1", 1, charge_for(post)).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(ledger.total_charged("p1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_zero_cost_rejected() {
        let ledger = InMemoryLedger::new();
        let post = post_build(&ledger, "p1").await;
        assert!(ledger.record_success("p1", 0, charge_for(post)).await.is_err());
    }

    #[tokio::test]
    async fn test_record_failure() {
        let ledger = InMemoryLedger::new();

        let id = ledger
            .record_failure(
                "p1",
                FailureReason::GeneratorException,
                serde_json::json!({"error": "timeout"}),
            )
            .await
            .unwrap();

        let failures = ledger.failures("p1").await.unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].id, id);
        assert_eq!(failures[0].error_message(), Some("timeout"));
        assert_eq!(ledger.total_charged("p1").await.unwrap(), 0);

        let bad = ledger
            .record_failure("p1", FailureReason::GeneratorException, serde_json::json!("x"))
            .await;
        assert!(bad.is_err());
    }

    #[tokio::test]
    async fn test_empty_project_rejected() {
        let ledger = InMemoryLedger::new();
        let result = ledger
            .create_version(" ", VersionKind::PreBuild, Snapshot::new(serde_json::json!({})), "n")
            .await;
        assert!(result.is_err());
    }
}
