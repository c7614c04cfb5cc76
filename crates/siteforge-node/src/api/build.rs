//! Build trigger endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use siteforge_core::{BuildError, BuildOutcome, BuildRequest};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::Authenticated;
use crate::state::AppState;

/// Request to build a project.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildBody {
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub prompt: Option<String>,
}

/// Response for a saved and charged build.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSucceededResponse {
    pub pre_version_id: Uuid,
    pub post_version_id: Uuid,
    pub charged_ledger_id: Uuid,
}

/// Response for a saved build whose charge failed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeWarningResponse {
    pub warning: String,
    pub details: String,
    pub post_version_id: Uuid,
}

/// Run a build for the authenticated caller.
pub async fn submit_build(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    payload: Result<Json<BuildBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|e| BuildError::invalid(e.body_text()))?;

    let mut builder = BuildRequest::builder().max_prompt_chars(state.max_prompt_chars);
    if let Some(project_id) = body.project_id {
        builder = builder.project(project_id);
    }
    if let Some(prompt) = body.prompt {
        builder = builder.prompt(prompt);
    }
    let request = builder.build()?;

    let outcome = state.orchestrator.run_build(&principal, &request).await?;

    let response = match outcome {
        BuildOutcome::Succeeded {
            pre_version_id,
            post_version_id,
            charge_id,
        } => (
            StatusCode::OK,
            Json(BuildSucceededResponse {
                pre_version_id,
                post_version_id,
                charged_ledger_id: charge_id,
            }),
        )
            .into_response(),
        BuildOutcome::ChargeFailed {
            post_version_id,
            details,
            ..
        } => (
            StatusCode::OK,
            Json(ChargeWarningResponse {
                warning: "Build saved but the credit charge could not be recorded".to_string(),
                details,
                post_version_id,
            }),
        )
            .into_response(),
    };

    Ok(response)
}
