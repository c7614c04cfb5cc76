//! Non-error outcomes of a build.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::BuildStage;

/// Result of a build whose post-build version was saved.
///
/// Every failure before that point is a [`crate::BuildError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BuildOutcome {
    /// Saved and charged.
    Succeeded {
        pre_version_id: Uuid,
        post_version_id: Uuid,
        charge_id: Uuid,
    },
    /// Saved, but the charge could not be recorded and needs reconciliation.
    ChargeFailed {
        pre_version_id: Uuid,
        post_version_id: Uuid,
        details: String,
    },
}

impl BuildOutcome {
    /// Returns true if a credit was charged.
    pub fn is_charged(&self) -> bool {
        matches!(self, BuildOutcome::Succeeded { .. })
    }

    /// The saved post-build version.
    pub fn post_version_id(&self) -> Uuid {
        match self {
            BuildOutcome::Succeeded {
                post_version_id, ..
            } => *post_version_id,
            BuildOutcome::ChargeFailed {
                post_version_id, ..
            } => *post_version_id,
        }
    }

    /// The pre-build marker of the build.
    pub fn pre_version_id(&self) -> Uuid {
        match self {
            BuildOutcome::Succeeded { pre_version_id, .. } => *pre_version_id,
            BuildOutcome::ChargeFailed { pre_version_id, .. } => *pre_version_id,
        }
    }

    /// Terminal stage reached by the build.
    pub fn stage(&self) -> BuildStage {
        match self {
            BuildOutcome::Succeeded { .. } => BuildStage::Charged,
            BuildOutcome::ChargeFailed { .. } => BuildStage::ChargeFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let pre = Uuid::new_v4();
        let post = Uuid::new_v4();

        let ok = BuildOutcome::Succeeded {
            pre_version_id: pre,
            post_version_id: post,
            charge_id: Uuid::new_v4(),
        };
        assert!(ok.is_charged());
        assert_eq!(ok.post_version_id(), post);
        assert_eq!(ok.stage(), BuildStage::Charged);

        let warn = BuildOutcome::ChargeFailed {
            pre_version_id: pre,
            post_version_id: post,
            details: "billing down".to_string(),
        };
        assert!(!warn.is_charged());
        assert_eq!(warn.pre_version_id(), pre);
        assert_eq!(warn.stage(), BuildStage::ChargeFailed);
    }
}
