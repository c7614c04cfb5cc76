//! Common types used across the Siteforge workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Credits charged for one successful build.
pub const BUILD_COST: u32 = 1;

/// Kind tag of a stored version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    /// Marker recorded before the generator runs.
    PreBuild,
    /// Snapshot of the generated result.
    PostBuild,
}

impl VersionKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionKind::PreBuild => "pre_build",
            VersionKind::PostBuild => "post_build",
        }
    }
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason tag of a failure record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The generator returned an error.
    GeneratorException,
    /// The post-build version could not be saved.
    PostSnapshotFailed,
    /// The post-build version was saved but the charge was not recorded.
    ChargeFailed,
}

impl FailureReason {
    /// Wire name of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::GeneratorException => "generator_exception",
            FailureReason::PostSnapshotFailed => "post_snapshot_failed",
            FailureReason::ChargeFailed => "charge_failed",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a single build invocation in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStage {
    /// Request accepted, nothing written yet.
    Start,
    /// Pre-build version recorded.
    PreSnapshotted,
    /// Generator returned content.
    Generated,
    /// Post-build version recorded.
    Snapshotted,
    /// Credit charged. The only fully successful terminal state.
    Charged,
    /// Post-build version recorded but the charge failed.
    ChargeFailed,
    /// The generator failed.
    GeneratorFailed,
    /// The post-build version could not be recorded.
    PostSnapshotFailed,
}

impl BuildStage {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BuildStage::Charged
                | BuildStage::ChargeFailed
                | BuildStage::GeneratorFailed
                | BuildStage::PostSnapshotFailed
        )
    }

    /// Returns true if a terminal state carries a warning or failure.
    pub fn is_degraded(&self) -> bool {
        self.is_terminal() && *self != BuildStage::Charged
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identifier of the user.
    pub user_id: String,
}

impl Principal {
    /// Create a principal for a user id.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_stage_terminal() {
        assert!(BuildStage::Charged.is_terminal());
        assert!(BuildStage::ChargeFailed.is_terminal());
        assert!(BuildStage::GeneratorFailed.is_terminal());
        assert!(!BuildStage::Snapshotted.is_terminal());
        assert!(!BuildStage::Charged.is_degraded());
        assert!(BuildStage::ChargeFailed.is_degraded());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_value(VersionKind::PostBuild).unwrap(),
            serde_json::json!("post_build")
        );
        assert_eq!(
            serde_json::to_value(FailureReason::GeneratorException).unwrap(),
            serde_json::json!("generator_exception")
        );
        assert_eq!(FailureReason::PostSnapshotFailed.to_string(), "post_snapshot_failed");
        assert_eq!(
            serde_json::to_value(FailureReason::ChargeFailed).unwrap(),
            serde_json::json!(FailureReason::ChargeFailed.as_str())
        );
    }
}
