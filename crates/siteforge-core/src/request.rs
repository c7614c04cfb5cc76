//! Build requests and their builder.

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};

/// Default upper bound on prompt length, in characters.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 4000;

/// A validated request to build a project from a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    /// Project to build.
    pub project_id: String,

    /// Prompt handed to the generator.
    pub prompt: String,
}

/// Builder for creating BuildRequests with a fluent API.
#[derive(Debug)]
pub struct BuildRequestBuilder {
    project_id: Option<String>,
    prompt: Option<String>,
    max_prompt_chars: usize,
}

impl Default for BuildRequestBuilder {
    fn default() -> Self {
        Self {
            project_id: None,
            prompt: None,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }
}

impl BuildRequestBuilder {
    /// Create a new BuildRequestBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the project id.
    pub fn project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the prompt.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the maximum prompt length.
    pub fn max_prompt_chars(mut self, max: usize) -> Self {
        self.max_prompt_chars = max;
        self
    }

    /// Build and validate the request.
    pub fn build(self) -> Result<BuildRequest> {
        let project_id = self
            .project_id
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| BuildError::invalid("projectId is required"))?;

        let prompt = self
            .prompt
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| BuildError::invalid("prompt is required"))?;

        let len = prompt.chars().count();
        if len > self.max_prompt_chars {
            return Err(BuildError::invalid(format!(
                "prompt is {} characters, limit is {}",
                len, self.max_prompt_chars
            )));
        }

        Ok(BuildRequest { project_id, prompt })
    }
}

impl BuildRequest {
    /// Create a new BuildRequestBuilder.
    pub fn builder() -> BuildRequestBuilder {
        BuildRequestBuilder::new()
    }

    /// Build a request with the default limits.
    pub fn new(project_id: impl Into<String>, prompt: impl Into<String>) -> Result<Self> {
        Self::builder().project(project_id).prompt(prompt).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request() {
        let request = BuildRequest::new(" p1 ", "Bakery site").unwrap();
        assert_eq!(request.project_id, "p1");
        assert_eq!(request.prompt, "Bakery site");
    }

    #[test]
    fn test_missing_project() {
        let err = BuildRequest::builder().prompt("Bakery site").build().unwrap_err();
        assert!(matches!(err, BuildError::InvalidRequest { .. }));
        assert!(err.to_string().contains("projectId"));
    }

    #[test]
    fn test_blank_prompt() {
        let err = BuildRequest::new("p1", "   ").unwrap_err();
        assert!(err.to_string().contains("prompt"));
    }

    #[test]
    fn test_prompt_too_long() {
        let result = BuildRequest::builder()
            .project("p1")
            .prompt("x".repeat(11))
            .max_prompt_chars(10)
            .build();
        assert!(result.is_err());
    }
}
