//! Application state.

use std::sync::Arc;

use siteforge_generator::{GeneratorConfig, TemplateGenerator, TimeoutGenerator};
use siteforge_ledger::{InMemoryLedger, LedgerHistory};
use tracing::{info, warn};

use crate::auth::{Authenticator, StaticTokenAuthenticator};
use crate::config::NodeConfig;
use crate::orchestrator::Orchestrator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The build workflow.
    pub orchestrator: Arc<Orchestrator>,

    /// Read access to versions, failures and charges.
    pub history: Arc<dyn LedgerHistory>,

    /// Resolves bearer tokens.
    pub authenticator: Arc<dyn Authenticator>,

    /// Longest accepted prompt.
    pub max_prompt_chars: usize,
}

impl AppState {
    /// Wire up the in-memory ledger and template generator from configuration.
    pub fn from_config(config: &NodeConfig) -> anyhow::Result<Self> {
        let ledger = Arc::new(InMemoryLedger::new());
        let generator_config = GeneratorConfig {
            timeout_ms: config.generator_timeout_ms,
            ..GeneratorConfig::default()
        };
        let timeout_ms = generator_config.timeout_ms;
        let generator =
            TimeoutGenerator::from_millis(TemplateGenerator::with_config(generator_config), timeout_ms);

        let authenticator = StaticTokenAuthenticator::new(&config.api_tokens)?;
        if authenticator.is_empty() {
            warn!("No API tokens configured, every build request will be rejected");
        } else {
            info!(tokens = authenticator.len(), "Authenticator configured");
        }

        Ok(Self::new(
            Orchestrator::new(ledger.clone(), ledger.clone(), Arc::new(generator)),
            ledger,
            Arc::new(authenticator),
            config.max_prompt_chars,
        ))
    }

    /// Assemble state from explicit parts.
    pub fn new(
        orchestrator: Orchestrator,
        history: Arc<dyn LedgerHistory>,
        authenticator: Arc<dyn Authenticator>,
        max_prompt_chars: usize,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            history,
            authenticator,
            max_prompt_chars,
        }
    }
}
