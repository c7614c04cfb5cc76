//! Siteforge client implementation.

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use siteforge_core::{CreditLedgerEntry, FailureRecord, Version};
use uuid::Uuid;

use crate::error::{ClientError, Result};

/// Client for interacting with a Siteforge node.
#[derive(Clone)]
pub struct SiteforgeClient {
    /// Base URL of the node.
    base_url: String,

    /// Bearer token sent with every API call.
    token: String,

    /// HTTP client.
    http_client: reqwest::Client,
}

/// Result of a build that was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildResponse {
    /// Saved and charged.
    Succeeded {
        pre_version_id: Uuid,
        post_version_id: Uuid,
        charged_ledger_id: Uuid,
    },
    /// Saved, but the charge needs reconciliation.
    ChargeWarning {
        warning: String,
        details: String,
        post_version_id: Uuid,
    },
}

/// Charges of a project.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargesResponse {
    pub project_id: String,
    pub total_charged: u64,
    pub charges: Vec<CreditLedgerEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SucceededBody {
    pre_version_id: Uuid,
    post_version_id: Uuid,
    charged_ledger_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WarningBody {
    warning: String,
    details: String,
    post_version_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: String,
    #[serde(default)]
    pre_version_id: Option<Uuid>,
}

/// Decode the body of a build response.
pub(crate) fn decode_build_response(status: StatusCode, body: &str) -> Result<BuildResponse> {
    if status.is_success() {
        let value: serde_json::Value = serde_json::from_str(body)?;
        if value.get("warning").is_some() {
            let warning: WarningBody = serde_json::from_value(value)?;
            return Ok(BuildResponse::ChargeWarning {
                warning: warning.warning,
                details: warning.details,
                post_version_id: warning.post_version_id,
            });
        }
        let ok: SucceededBody = serde_json::from_value(value)?;
        return Ok(BuildResponse::Succeeded {
            pre_version_id: ok.pre_version_id,
            post_version_id: ok.post_version_id,
            charged_ledger_id: ok.charged_ledger_id,
        });
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => Err(ClientError::Build {
            status: status.as_u16(),
            error: err.error,
            details: err.details,
            pre_version_id: err.pre_version_id,
        }),
        Err(_) => Err(ClientError::Build {
            status: status.as_u16(),
            error: status.to_string(),
            details: body.to_string(),
            pre_version_id: None,
        }),
    }
}

/// URL of a per-project resource. The project id is pushed as one path
/// segment, so `/` and `%` inside it are percent-encoded.
pub(crate) fn project_url(base_url: &str, project_id: &str, resource: &str) -> Result<Url> {
    let mut url = Url::parse(base_url).map_err(|e| ClientError::Connection(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::Connection(format!("'{}' cannot be a base URL", base_url)))?
        .pop_if_empty()
        .extend(["api", "v1", "projects", project_id, resource]);
    Ok(url)
}

impl SiteforgeClient {
    /// Connect to a Siteforge node.
    pub async fn connect(url: &str, token: impl Into<String>) -> Result<Self> {
        let base_url = url.trim_end_matches('/').to_string();
        let http_client = reqwest::Client::new();

        // Verify connection with health check
        let health_url = format!("{}/health", base_url);
        http_client
            .get(&health_url)
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?
            .error_for_status()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Self {
            base_url,
            token: token.into(),
            http_client,
        })
    }

    /// Run a build.
    pub async fn build(&self, project_id: &str, prompt: &str) -> Result<BuildResponse> {
        let url = format!("{}/api/v1/build", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "projectId": project_id,
                "prompt": prompt,
            }))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        decode_build_response(status, &body)
    }

    /// Get the versions of a project.
    pub async fn versions(&self, project_id: &str) -> Result<Vec<Version>> {
        self.get_json(project_url(&self.base_url, project_id, "versions")?)
            .await
    }

    /// Get the failure records of a project.
    pub async fn failures(&self, project_id: &str) -> Result<Vec<FailureRecord>> {
        self.get_json(project_url(&self.base_url, project_id, "failures")?)
            .await
    }

    /// Get the charges of a project.
    pub async fn charges(&self, project_id: &str) -> Result<ChargesResponse> {
        self.get_json(project_url(&self.base_url, project_id, "charges")?)
            .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let details = response.text().await.unwrap_or_default();
            return Err(ClientError::Http { status, details });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success() {
        let pre = Uuid::new_v4();
        let post = Uuid::new_v4();
        let charge = Uuid::new_v4();
        let body = serde_json::json!({
            "preVersionId": pre,
            "postVersionId": post,
            "chargedLedgerId": charge,
        })
        .to_string();

        let response = decode_build_response(StatusCode::OK, &body).unwrap();
        assert_eq!(
            response,
            BuildResponse::Succeeded {
                pre_version_id: pre,
                post_version_id: post,
                charged_ledger_id: charge,
            }
        );
    }

    #[test]
    fn test_decode_charge_warning() {
        let post = Uuid::new_v4();
        let body = serde_json::json!({
            "warning": "charge failed",
            "details": "billing down",
            "postVersionId": post,
        })
        .to_string();

        let response = decode_build_response(StatusCode::OK, &body).unwrap();
        assert!(matches!(
            response,
            BuildResponse::ChargeWarning { post_version_id, .. } if post_version_id == post
        ));
    }

    #[test]
    fn test_decode_build_failure() {
        let pre = Uuid::new_v4();
        let body = serde_json::json!({
            "error": "Build failed",
            "code": "generation_failed",
            "details": "Generation timeout after 30000ms",
            "preVersionId": pre,
        })
        .to_string();

        let err = decode_build_response(StatusCode::INTERNAL_SERVER_ERROR, &body).unwrap_err();
        match err {
            ClientError::Build {
                status,
                pre_version_id,
                details,
                ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(pre_version_id, Some(pre));
                assert!(details.contains("timeout"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_project_url_keeps_id_in_one_segment() {
        let url = project_url("http://localhost:3000", "acme/shop", "versions").unwrap();
        assert_eq!(url.path(), "/api/v1/projects/acme%2Fshop/versions");

        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        assert_eq!(segments, ["api", "v1", "projects", "acme%2Fshop", "versions"]);
    }

    #[test]
    fn test_project_url_under_base_path() {
        let url = project_url("http://localhost:3000/siteforge", "p1", "charges").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/siteforge/api/v1/projects/p1/charges");
    }

    #[test]
    fn test_decode_non_json_failure() {
        let err = decode_build_response(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert!(matches!(err, ClientError::Build { status: 502, .. }));
    }
}
