//! Deterministic template-based generator.
//!
//! Stands in for a model-backed engine: the same prompt always yields the
//! same content, which keeps snapshots comparable across builds.

use std::collections::BTreeSet;

use async_trait::async_trait;
use siteforge_core::snapshot::content_digest;
use siteforge_core::{GeneratedSite, GenerationError};
use tracing::debug;

use crate::generator::{Generator, GeneratorConfig};

const TITLE_MAX_CHARS: usize = 80;

/// Generator that lays a prompt out into a fixed set of sections.
pub struct TemplateGenerator {
    config: GeneratorConfig,
}

impl TemplateGenerator {
    /// Create a template generator with default configuration.
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// Create a template generator with custom configuration.
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Get the generator configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn title(prompt: &str) -> String {
        let first_line = prompt.lines().next().unwrap_or(prompt).trim();
        first_line.chars().take(TITLE_MAX_CHARS).collect()
    }

    fn keywords(prompt: &str) -> Vec<String> {
        prompt
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 3)
            .map(|w| w.to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn section(name: &str, title: &str, prompt: &str) -> serde_json::Value {
        let (heading, body) = match name {
            "hero" => (title.to_string(), prompt.to_string()),
            "about" => ("About".to_string(), format!("About {}.", title)),
            "contact" => ("Contact".to_string(), format!("Get in touch with {}.", title)),
            other => (other.to_string(), String::new()),
        };
        serde_json::json!({
            "id": name,
            "heading": heading,
            "body": body,
        })
    }

    /// Build the site document for a prompt.
    pub fn render(&self, prompt: &str) -> Result<serde_json::Value, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::InvalidPrompt(
                "prompt cannot be empty".to_string(),
            ));
        }

        let title = Self::title(prompt);
        let sections: Vec<serde_json::Value> = self
            .config
            .sections
            .iter()
            .map(|name| Self::section(name, &title, prompt))
            .collect();

        Ok(serde_json::json!({
            "title": title,
            "keywords": Self::keywords(prompt),
            "sections": sections,
            "prompt_digest": content_digest(&serde_json::json!(prompt)),
        }))
    }
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for TemplateGenerator {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedSite, GenerationError> {
        let content = self.render(prompt)?;
        debug!(
            sections = self.config.sections.len(),
            "Template generator rendered site"
        );
        Ok(GeneratedSite::new(content))
    }
}
