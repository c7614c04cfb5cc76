//! Error types for the Siteforge build workflow.

use thiserror::Error;
use uuid::Uuid;

/// Error returned by the version and credit ledgers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger could not be reached or refused to accept writes.
    #[error("Ledger unavailable: {message}")]
    Unavailable { message: String },

    /// The ledger rejected the write as invalid.
    #[error("Ledger rejected write: {message}")]
    Rejected { message: String },
}

impl LedgerError {
    /// Shorthand for an `Unavailable` error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        LedgerError::Unavailable {
            message: message.into(),
        }
    }

    /// Shorthand for a `Rejected` error.
    pub fn rejected(message: impl Into<String>) -> Self {
        LedgerError::Rejected {
            message: message.into(),
        }
    }
}

/// Error returned by a site generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The generator did not answer within its deadline.
    #[error("Generation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The prompt cannot be turned into a site.
    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    /// Any other failure inside the generation engine.
    #[error("Generation engine error: {0}")]
    Engine(String),
}

/// Error outcomes of a build.
///
/// Variants after `Unauthenticated` happen after at least one ledger call.
/// `failure_id` is `None` when the audit write itself failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Missing or malformed input. Nothing was written.
    #[error("Invalid build request: {message}")]
    InvalidRequest { message: String },

    /// No resolvable principal. Nothing was written.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The pre-build version could not be recorded; generation never started.
    #[error("Failed to record pre-build snapshot: {details}")]
    PreSnapshotFailed { details: String },

    /// The generator failed after the pre-build version was recorded.
    #[error("Build failed for pre-build version {pre_version_id}: {details}")]
    GenerationFailed {
        pre_version_id: Uuid,
        details: String,
        failure_id: Option<Uuid>,
    },

    /// Generation succeeded but the post-build version could not be saved.
    #[error("Build succeeded but was not saved (pre-build version {pre_version_id}): {details}")]
    PostSnapshotFailed {
        pre_version_id: Uuid,
        details: String,
        failure_id: Option<Uuid>,
    },
}

impl BuildError {
    /// Shorthand for an `InvalidRequest` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        BuildError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Returns the pre-build version id if one was recorded.
    pub fn pre_version_id(&self) -> Option<Uuid> {
        match self {
            BuildError::GenerationFailed { pre_version_id, .. } => Some(*pre_version_id),
            BuildError::PostSnapshotFailed { pre_version_id, .. } => Some(*pre_version_id),
            _ => None,
        }
    }

    /// Returns the failure record id if the audit write succeeded.
    pub fn failure_id(&self) -> Option<Uuid> {
        match self {
            BuildError::GenerationFailed { failure_id, .. } => *failure_id,
            BuildError::PostSnapshotFailed { failure_id, .. } => *failure_id,
            _ => None,
        }
    }

    /// Returns true if the request was rejected before any side effect.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BuildError::InvalidRequest { .. } | BuildError::Unauthenticated
        )
    }

    /// Short machine-readable label, used in API payloads and logs.
    pub fn label(&self) -> &'static str {
        match self {
            BuildError::InvalidRequest { .. } => "invalid_request",
            BuildError::Unauthenticated => "unauthenticated",
            BuildError::PreSnapshotFailed { .. } => "pre_snapshot_failed",
            BuildError::GenerationFailed { .. } => "generation_failed",
            BuildError::PostSnapshotFailed { .. } => "post_snapshot_failed",
        }
    }
}

/// Convenience Result type for ledger operations.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Convenience Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
