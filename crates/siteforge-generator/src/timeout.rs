//! Deadline enforcement for generators.

use std::time::Duration;

use async_trait::async_trait;
use siteforge_core::{GeneratedSite, GenerationError};
use tracing::warn;

use crate::generator::Generator;

/// Wraps a generator and turns an elapsed deadline into
/// [`GenerationError::Timeout`]. The inner future is dropped on timeout.
pub struct TimeoutGenerator<G> {
    inner: G,
    timeout: Duration,
}

impl<G: Generator> TimeoutGenerator<G> {
    /// Wrap `inner` with a deadline.
    pub fn new(inner: G, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Wrap `inner` with a deadline in milliseconds.
    pub fn from_millis(inner: G, timeout_ms: u64) -> Self {
        Self::new(inner, Duration::from_millis(timeout_ms))
    }
}

/// Milliseconds in `duration`, saturating at `u64::MAX`.
fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl<G: Generator> Generator for TimeoutGenerator<G> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedSite, GenerationError> {
        match tokio::time::timeout(self.timeout, self.inner.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                let duration_ms = whole_millis(self.timeout);
                warn!(generator = self.inner.name(), duration_ms, "Generator timed out");
                Err(GenerationError::Timeout { duration_ms })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedGenerator;
    use crate::template::TemplateGenerator;

    #[tokio::test]
    async fn test_passes_through_fast_generator() {
        let generator = TimeoutGenerator::from_millis(TemplateGenerator::new(), 1_000);
        let site = generator.generate("Bakery site").await.unwrap();
        assert_eq!(site.content["title"], "Bakery site");
        assert_eq!(generator.name(), "template");
    }

    #[tokio::test]
    async fn test_slow_generator_times_out() {
        let slow = ScriptedGenerator::succeeding(serde_json::json!({}))
            .with_delay(Duration::from_millis(200));
        let generator = TimeoutGenerator::from_millis(slow, 10);

        let err = generator.generate("Bakery site").await.unwrap_err();
        assert_eq!(err, GenerationError::Timeout { duration_ms: 10 });
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_whole_millis_saturates() {
        assert_eq!(whole_millis(Duration::from_millis(30_000)), 30_000);
        assert_eq!(whole_millis(Duration::MAX), u64::MAX);
    }
}
