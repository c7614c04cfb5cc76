//! Caller authentication.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use siteforge_core::{BuildError, Principal};

use crate::api::error::ApiError;
use crate::config::TokenGrant;
use crate::state::AppState;

/// Resolves a bearer credential into a principal.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns `None` for unknown credentials.
    async fn authenticate(&self, token: &str) -> Option<Principal>;
}

/// Authenticator backed by a fixed token table.
#[derive(Debug, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, Principal>,
}

impl StaticTokenAuthenticator {
    /// Build from configured grants. A token granted twice is rejected
    /// rather than resolved to whichever user came last.
    pub fn new(grants: &[TokenGrant]) -> anyhow::Result<Self> {
        let mut tokens = HashMap::with_capacity(grants.len());
        for grant in grants {
            if let Some(previous) =
                tokens.insert(grant.token.clone(), Principal::new(grant.user_id.clone()))
            {
                anyhow::bail!(
                    "API token for '{}' is already granted to '{}'",
                    grant.user_id,
                    previous.user_id
                );
            }
        }
        Ok(Self { tokens })
    }

    /// Number of configured tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if no tokens are configured.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, token: &str) -> Option<Principal> {
        self.tokens.get(token).cloned()
    }
}

/// Extractor for the authenticated caller of a request.
pub struct Authenticated(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Build(BuildError::Unauthenticated))?;

        state
            .authenticator
            .authenticate(token)
            .await
            .map(Authenticated)
            .ok_or(ApiError::Build(BuildError::Unauthenticated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_tokens() {
        let auth = StaticTokenAuthenticator::new(&[TokenGrant {
            user_id: "alice".to_string(),
            token: "a1".to_string(),
        }])
        .unwrap();

        assert_eq!(auth.len(), 1);
        assert_eq!(auth.authenticate("a1").await, Some(Principal::new("alice")));
        assert_eq!(auth.authenticate("nope").await, None);
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let grant = |user: &str| TokenGrant {
            user_id: user.to_string(),
            token: "shared".to_string(),
        };

        let err = StaticTokenAuthenticator::new(&[grant("alice"), grant("bob")]).unwrap_err();
        assert!(err.to_string().contains("bob"));
        assert!(err.to_string().contains("alice"));
    }
}
