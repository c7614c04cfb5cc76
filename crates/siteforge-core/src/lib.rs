//! # Siteforge Core
//!
//! Core types for the Siteforge build-and-billing workflow.
//!
//! This crate provides the fundamental building blocks:
//! - [`BuildRequest`] - What to build and from which prompt
//! - [`Version`], [`FailureRecord`], [`CreditLedgerEntry`] - Ledger records
//! - [`BuildOutcome`] and [`BuildError`] - What a build returns

pub mod error;
pub mod outcome;
pub mod record;
pub mod request;
pub mod snapshot;
pub mod types;

// Re-exports for convenience
pub use error::{BuildError, GenerationError, LedgerError, LedgerResult, Result};
pub use outcome::BuildOutcome;
pub use record::{ChargeMetadata, CreditLedgerEntry, FailureRecord, Version};
pub use request::{BuildRequest, BuildRequestBuilder, DEFAULT_MAX_PROMPT_CHARS};
pub use snapshot::{GeneratedSite, Snapshot};
pub use types::*;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{BuildError, GenerationError, LedgerError};
    pub use crate::outcome::BuildOutcome;
    pub use crate::request::BuildRequest;
    pub use crate::types::{Principal, VersionKind};
}
