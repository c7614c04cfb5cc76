//! Fault injection for exercising failure branches of the build workflow.
//!
//! [`FlakyLedger`] wraps any ledger, forwards every call, and fails the
//! selected operations with [`LedgerError::Unavailable`] while a fault is
//! armed. It also counts attempted writes, so callers can check that an
//! operation was never issued at all.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use siteforge_core::{
    ChargeMetadata, CreditLedgerEntry, FailureReason, FailureRecord, LedgerError, LedgerResult,
    Snapshot, Version, VersionKind,
};
use uuid::Uuid;

use crate::store::{CreditLedger, LedgerHistory, VersionLedger};

/// Attempted write counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteCounts {
    pub create_version: usize,
    pub record_success: usize,
    pub record_failure: usize,
}

#[derive(Debug, Default)]
struct Faults {
    pre_build: AtomicBool,
    post_build: AtomicBool,
    success: AtomicBool,
    failure: AtomicBool,
}

#[derive(Debug, Default)]
struct Counters {
    create_version: AtomicUsize,
    record_success: AtomicUsize,
    record_failure: AtomicUsize,
}

/// Ledger wrapper with switchable faults.
#[derive(Debug, Default)]
pub struct FlakyLedger<L> {
    inner: L,
    faults: Faults,
    counters: Counters,
}

impl<L> FlakyLedger<L> {
    /// Wrap a ledger with no faults armed.
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            faults: Faults::default(),
            counters: Counters::default(),
        }
    }

    /// The wrapped ledger.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Fail `create_version` for the given kind.
    pub fn fail_versions(&self, kind: VersionKind) -> &Self {
        match kind {
            VersionKind::PreBuild => self.faults.pre_build.store(true, Ordering::SeqCst),
            VersionKind::PostBuild => self.faults.post_build.store(true, Ordering::SeqCst),
        }
        self
    }

    /// Fail `record_success`.
    pub fn fail_charges(&self) -> &Self {
        self.faults.success.store(true, Ordering::SeqCst);
        self
    }

    /// Fail `record_failure`.
    pub fn fail_audit(&self) -> &Self {
        self.faults.failure.store(true, Ordering::SeqCst);
        self
    }

    /// Disarm every fault.
    pub fn heal(&self) -> &Self {
        self.faults.pre_build.store(false, Ordering::SeqCst);
        self.faults.post_build.store(false, Ordering::SeqCst);
        self.faults.success.store(false, Ordering::SeqCst);
        self.faults.failure.store(false, Ordering::SeqCst);
        self
    }

    /// Writes attempted so far, including failed ones.
    pub fn writes(&self) -> WriteCounts {
        WriteCounts {
            create_version: self.counters.create_version.load(Ordering::SeqCst),
            record_success: self.counters.record_success.load(Ordering::SeqCst),
            record_failure: self.counters.record_failure.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl<L: VersionLedger> VersionLedger for FlakyLedger<L> {
    async fn create_version(
        &self,
        project_id: &str,
        kind: VersionKind,
        snapshot: Snapshot,
        note: &str,
    ) -> LedgerResult<Uuid> {
        self.counters.create_version.fetch_add(1, Ordering::SeqCst);
        let armed = match kind {
            VersionKind::PreBuild => &self.faults.pre_build,
            VersionKind::PostBuild => &self.faults.post_build,
        };
        if armed.load(Ordering::SeqCst) {
            return Err(LedgerError::unavailable(format!(
                "injected fault writing {} version",
                kind
            )));
        }
        self.inner
            .create_version(project_id, kind, snapshot, note)
            .await
    }
}

#[async_trait]
impl<L: CreditLedger> CreditLedger for FlakyLedger<L> {
    async fn record_success(
        &self,
        project_id: &str,
        cost: u32,
        metadata: ChargeMetadata,
    ) -> LedgerResult<Uuid> {
        self.counters.record_success.fetch_add(1, Ordering::SeqCst);
        if self.faults.success.load(Ordering::SeqCst) {
            return Err(LedgerError::unavailable("injected fault recording charge"));
        }
        self.inner.record_success(project_id, cost, metadata).await
    }

    async fn record_failure(
        &self,
        project_id: &str,
        reason: FailureReason,
        metadata: serde_json::Value,
    ) -> LedgerResult<Uuid> {
        self.counters.record_failure.fetch_add(1, Ordering::SeqCst);
        if self.faults.failure.load(Ordering::SeqCst) {
            return Err(LedgerError::unavailable("injected fault recording failure"));
        }
        self.inner.record_failure(project_id, reason, metadata).await
    }
}

#[async_trait]
impl<L: LedgerHistory> LedgerHistory for FlakyLedger<L> {
    async fn version(&self, id: Uuid) -> LedgerResult<Option<Version>> {
        self.inner.version(id).await
    }

    async fn versions(&self, project_id: &str) -> LedgerResult<Vec<Version>> {
        self.inner.versions(project_id).await
    }

    async fn failures(&self, project_id: &str) -> LedgerResult<Vec<FailureRecord>> {
        self.inner.failures(project_id).await
    }

    async fn charges(&self, project_id: &str) -> LedgerResult<Vec<CreditLedgerEntry>> {
        self.inner.charges(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryLedger;

    #[tokio::test]
    async fn test_fault_only_hits_selected_kind() {
        let ledger = FlakyLedger::new(InMemoryLedger::new());
        ledger.fail_versions(VersionKind::PostBuild);

        let snapshot = Snapshot::new(serde_json::json!({"n": 1}));
        assert!(ledger
            .create_version("p1", VersionKind::PreBuild, snapshot.clone(), "pre")
            .await
            .is_ok());
        let err = ledger
            .create_version("p1", VersionKind::PostBuild, snapshot, "post")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable { .. }));

        assert_eq!(ledger.writes().create_version, 2);
        assert_eq!(ledger.inner().versions("p1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_heal() {
        let ledger = FlakyLedger::new(InMemoryLedger::new());
        ledger.fail_audit();
        let metadata = serde_json::json!({"error": "x"});

        assert!(ledger
            .record_failure("p1", FailureReason::GeneratorException, metadata.clone())
            .await
            .is_err());

        ledger.heal();
        assert!(ledger
            .record_failure("p1", FailureReason::GeneratorException, metadata)
            .await
            .is_ok());
        assert_eq!(ledger.writes().record_failure, 2);
        assert_eq!(ledger.failures("p1").await.unwrap().len(), 1);
    }
}
