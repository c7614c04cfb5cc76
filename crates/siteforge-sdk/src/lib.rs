//! # Siteforge SDK
//!
//! Client SDK for interacting with Siteforge nodes.

pub mod client;
pub mod error;

pub use client::{BuildResponse, ChargesResponse, SiteforgeClient};
pub use error::{ClientError, Result};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::client::{BuildResponse, SiteforgeClient};
    pub use crate::error::ClientError;
    pub use siteforge_core::prelude::*;
}
