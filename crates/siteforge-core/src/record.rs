//! Append-only ledger records.
//!
//! None of these types are mutated after the ledger hands them out:
//! versions, failure records and credit entries are only ever appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::snapshot::Snapshot;
use crate::types::{FailureReason, VersionKind};

/// A durable, timestamped snapshot of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Unique identifier for this version.
    pub id: Uuid,

    /// Owning project.
    pub project_id: String,

    /// Whether this is a pre- or post-build version.
    pub kind: VersionKind,

    /// The stored snapshot.
    pub snapshot: Snapshot,

    /// Human-readable note.
    pub note: String,

    /// Timestamp when the version was recorded.
    pub created_at: DateTime<Utc>,
}

/// Audit entry for a build that did not complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Unique identifier for this record.
    pub id: Uuid,

    /// Project the build was for.
    pub project_id: String,

    /// Why the build failed.
    pub reason: FailureReason,

    /// Free-form context. Carries `error` and, when known, `pre_version_id`.
    pub metadata: serde_json::Value,

    /// Timestamp when the failure was recorded.
    pub created_at: DateTime<Utc>,
}

impl FailureRecord {
    /// The `pre_version_id` stored in the metadata, if any.
    pub fn pre_version_id(&self) -> Option<Uuid> {
        self.metadata
            .get("pre_version_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    }

    /// The `post_version_id` stored in the metadata, set for charge failures.
    pub fn post_version_id(&self) -> Option<Uuid> {
        self.metadata
            .get("post_version_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    }

    /// The `error` message stored in the metadata, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.metadata.get("error").and_then(|v| v.as_str())
    }
}

/// Linkage supplied with a charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeMetadata {
    /// The post-build version this charge pays for.
    pub post_version_id: Uuid,

    /// The pre-build marker of the same build.
    pub pre_version_id: Uuid,

    /// Who requested the build.
    pub requested_by: String,
}

/// A single charge against a project's usage credits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditLedgerEntry {
    /// Unique identifier for this charge.
    pub id: Uuid,

    /// Project charged.
    pub project_id: String,

    /// Credits charged.
    pub cost: u32,

    /// Linkage to the build that was paid for.
    pub metadata: ChargeMetadata,

    /// Timestamp when the charge was recorded.
    pub created_at: DateTime<Utc>,
}

impl CreditLedgerEntry {
    /// The post-build version this charge references.
    pub fn post_version_id(&self) -> Uuid {
        self.metadata.post_version_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_record_accessors() {
        let pre = Uuid::new_v4();
        let record = FailureRecord {
            id: Uuid::new_v4(),
            project_id: "p1".to_string(),
            reason: FailureReason::GeneratorException,
            metadata: serde_json::json!({
                "pre_version_id": pre.to_string(),
                "error": "timeout",
            }),
            created_at: Utc::now(),
        };

        assert_eq!(record.pre_version_id(), Some(pre));
        assert_eq!(record.error_message(), Some("timeout"));
    }

    #[test]
    fn test_failure_record_without_pre_version() {
        let record = FailureRecord {
            id: Uuid::new_v4(),
            project_id: "p1".to_string(),
            reason: FailureReason::PostSnapshotFailed,
            metadata: serde_json::json!({"error": "disk full"}),
            created_at: Utc::now(),
        };
        assert_eq!(record.pre_version_id(), None);
    }
}
