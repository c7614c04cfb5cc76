//! Mapping of workflow errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use siteforge_core::{BuildError, LedgerError};
use uuid::Uuid;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_version_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_id: Option<Uuid>,
}

/// Errors surfaced by the API.
#[derive(Debug)]
pub enum ApiError {
    /// A build failed or was rejected.
    Build(BuildError),
    /// A history read failed.
    Ledger(LedgerError),
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        ApiError::Build(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

fn build_error_parts(err: &BuildError) -> (StatusCode, &'static str, String) {
    match err {
        BuildError::InvalidRequest { message } => (
            StatusCode::BAD_REQUEST,
            "Invalid request",
            message.clone(),
        ),
        BuildError::Unauthenticated => (
            StatusCode::UNAUTHORIZED,
            "Unauthenticated",
            "A valid bearer token is required".to_string(),
        ),
        BuildError::PreSnapshotFailed { details } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create pre-build snapshot",
            details.clone(),
        ),
        BuildError::GenerationFailed { details, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Build failed",
            details.clone(),
        ),
        BuildError::PostSnapshotFailed { details, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Build succeeded but could not be saved",
            details.clone(),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Build(err) => {
                let (status, error, details) = build_error_parts(err);
                let body = ErrorBody {
                    error: error.to_string(),
                    code: err.label(),
                    details,
                    pre_version_id: err.pre_version_id(),
                    failure_id: err.failure_id(),
                };
                (status, body)
            }
            ApiError::Ledger(err) => {
                let body = ErrorBody {
                    error: "Ledger read failed".to_string(),
                    code: "ledger_error",
                    details: err.to_string(),
                    pre_version_id: None,
                    failure_id: None,
                };
                (StatusCode::SERVICE_UNAVAILABLE, body)
            }
        };

        (status, Json(body)).into_response()
    }
}
