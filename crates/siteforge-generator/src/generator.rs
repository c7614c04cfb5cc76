//! Generator trait and configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use siteforge_core::{GeneratedSite, GenerationError};

/// Configuration for site generators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Deadline for a single generation, in milliseconds.
    pub timeout_ms: u64,

    /// Sections emitted by the template generator, in order.
    pub sections: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            sections: vec![
                "hero".to_string(),
                "about".to_string(),
                "contact".to_string(),
            ],
        }
    }
}

/// Trait for site generation engines.
///
/// Implementations own their timeouts and cancellation and report them as
/// [`GenerationError::Timeout`].
#[async_trait]
pub trait Generator: Send + Sync {
    /// Short name stored alongside generated snapshots.
    fn name(&self) -> &str;

    /// Turn a prompt into site content.
    async fn generate(&self, prompt: &str) -> Result<GeneratedSite, GenerationError>;
}
