//! Project history endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use siteforge_core::{CreditLedgerEntry, FailureRecord, Version};

use crate::api::error::ApiError;
use crate::auth::Authenticated;
use crate::state::AppState;

/// Charges of a project with their total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargesResponse {
    pub project_id: String,
    pub total_charged: u64,
    pub charges: Vec<CreditLedgerEntry>,
}

/// List the versions of a project.
pub async fn list_versions(
    State(state): State<AppState>,
    Authenticated(_principal): Authenticated,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Version>>, ApiError> {
    Ok(Json(state.history.versions(&project_id).await?))
}

/// List the failure records of a project.
pub async fn list_failures(
    State(state): State<AppState>,
    Authenticated(_principal): Authenticated,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<FailureRecord>>, ApiError> {
    Ok(Json(state.history.failures(&project_id).await?))
}

/// List the charges of a project.
pub async fn list_charges(
    State(state): State<AppState>,
    Authenticated(_principal): Authenticated,
    Path(project_id): Path<String>,
) -> Result<Json<ChargesResponse>, ApiError> {
    let charges = state.history.charges(&project_id).await?;
    let total_charged = charges.iter().map(|c| u64::from(c.cost)).sum();

    Ok(Json(ChargesResponse {
        project_id,
        total_charged,
        charges,
    }))
}
