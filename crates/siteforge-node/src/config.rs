//! Node configuration.

use std::net::SocketAddr;

use clap::Parser;
use siteforge_core::DEFAULT_MAX_PROMPT_CHARS;

/// A bearer token granted to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub user_id: String,
    pub token: String,
}

/// Parse a `user=token` pair.
fn parse_token_grant(s: &str) -> Result<TokenGrant, String> {
    let (user_id, token) = s
        .split_once('=')
        .ok_or_else(|| format!("expected user=token, got '{}'", s))?;
    let user_id = user_id.trim();
    let token = token.trim();
    if user_id.is_empty() || token.is_empty() {
        return Err(format!("user and token must be non-empty in '{}'", s));
    }
    Ok(TokenGrant {
        user_id: user_id.to_string(),
        token: token.to_string(),
    })
}

/// Siteforge node: runs builds and charges usage credits.
#[derive(Debug, Clone, Parser)]
#[command(name = "siteforge-node", version, about)]
pub struct NodeConfig {
    /// Address to listen on.
    #[arg(long, env = "SITEFORGE_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// API token grants as user=token; repeat or comma-separate.
    #[arg(
        long = "api-token",
        env = "SITEFORGE_API_TOKENS",
        value_delimiter = ',',
        value_parser = parse_token_grant
    )]
    pub api_tokens: Vec<TokenGrant>,

    /// Generator deadline in milliseconds.
    #[arg(long, env = "SITEFORGE_GENERATOR_TIMEOUT_MS", default_value_t = 30_000)]
    pub generator_timeout_ms: u64,

    /// Longest accepted prompt, in characters.
    #[arg(long, env = "SITEFORGE_MAX_PROMPT_CHARS", default_value_t = DEFAULT_MAX_PROMPT_CHARS)]
    pub max_prompt_chars: usize,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, env = "SITEFORGE_LOG", default_value = "info")]
    pub log_filter: String,
}
