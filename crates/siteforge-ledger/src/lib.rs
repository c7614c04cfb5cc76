//! # Siteforge Ledger
//!
//! Append-only version and credit ledgers for the build workflow.

pub mod fault;
pub mod store;

pub use fault::{FlakyLedger, WriteCounts};
pub use store::{CreditLedger, InMemoryLedger, LedgerHistory, VersionLedger};
