//! Build workflow orchestration.
//!
//! A build is a saga across independent ledgers:
//! pre-snapshot, generate, post-snapshot, charge. Each failure branch writes
//! an audit record instead of rolling back, and credits are charged only
//! after the post-build version is durable.

use std::sync::Arc;

use siteforge_core::{
    BuildError, BuildOutcome, BuildRequest, BuildStage, ChargeMetadata, FailureReason, Principal,
    Result, Snapshot, VersionKind, BUILD_COST,
};
use siteforge_generator::Generator;
use siteforge_ledger::{CreditLedger, VersionLedger};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const PRE_BUILD_NOTE: &str = "Pre-build snapshot";
const POST_BUILD_NOTE: &str = "Post-build snapshot";

/// Drives a single build from request to charge.
///
/// Holds only shared handles; every invocation is independent and
/// concurrent builds of the same project are not serialized.
#[derive(Clone)]
pub struct Orchestrator {
    versions: Arc<dyn VersionLedger>,
    credits: Arc<dyn CreditLedger>,
    generator: Arc<dyn Generator>,
}

impl Orchestrator {
    /// Create an orchestrator over the given ledgers and generator.
    pub fn new(
        versions: Arc<dyn VersionLedger>,
        credits: Arc<dyn CreditLedger>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            versions,
            credits,
            generator,
        }
    }

    /// Run a build for an authenticated principal.
    ///
    /// Credits are charged if and only if the post-build version was
    /// recorded and the charge call succeeded.
    pub async fn run_build(
        &self,
        principal: &Principal,
        request: &BuildRequest,
    ) -> Result<BuildOutcome> {
        let project_id = request.project_id.as_str();
        let prompt = request.prompt.as_str();
        if project_id.trim().is_empty() || prompt.trim().is_empty() {
            return Err(BuildError::invalid("projectId and prompt are required"));
        }

        let mut stage = BuildStage::Start;
        info!(project_id, user = %principal.user_id, "🏗️ Starting build");

        // Pre-snapshot
        let pre_version_id = self
            .versions
            .create_version(
                project_id,
                VersionKind::PreBuild,
                Snapshot::pre_build(prompt, principal),
                PRE_BUILD_NOTE,
            )
            .await
            .map_err(|e| {
                error!(project_id, error = %e, "❌ Pre-build snapshot failed");
                BuildError::PreSnapshotFailed {
                    details: e.to_string(),
                }
            })?;
        stage = advance(stage, BuildStage::PreSnapshotted, project_id);

        // Generate
        let site = match self.generator.generate(prompt).await {
            Ok(site) => site,
            Err(e) => {
                let details = e.to_string();
                error!(project_id, %pre_version_id, error = %details, "❌ Generator failed");
                advance(stage, BuildStage::GeneratorFailed, project_id);

                let failure_id = self
                    .audit_failure(
                        project_id,
                        FailureReason::GeneratorException,
                        pre_version_id,
                        None,
                        &details,
                        principal,
                    )
                    .await;
                return Err(BuildError::GenerationFailed {
                    pre_version_id,
                    details,
                    failure_id,
                });
            }
        };
        stage = advance(stage, BuildStage::Generated, project_id);

        // Post-snapshot
        let snapshot = Snapshot::post_build(prompt, principal, self.generator.name(), &site);
        let post_version_id = match self
            .versions
            .create_version(project_id, VersionKind::PostBuild, snapshot, POST_BUILD_NOTE)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                let details = e.to_string();
                error!(project_id, %pre_version_id, error = %details, "❌ Post-build snapshot failed");
                advance(stage, BuildStage::PostSnapshotFailed, project_id);

                let failure_id = self
                    .audit_failure(
                        project_id,
                        FailureReason::PostSnapshotFailed,
                        pre_version_id,
                        None,
                        &details,
                        principal,
                    )
                    .await;
                return Err(BuildError::PostSnapshotFailed {
                    pre_version_id,
                    details,
                    failure_id,
                });
            }
        };
        stage = advance(stage, BuildStage::Snapshotted, project_id);

        // Charge
        let metadata = ChargeMetadata {
            post_version_id,
            pre_version_id,
            requested_by: principal.user_id.clone(),
        };
        match self
            .credits
            .record_success(project_id, BUILD_COST, metadata)
            .await
        {
            Ok(charge_id) => {
                advance(stage, BuildStage::Charged, project_id);
                info!(project_id, %post_version_id, %charge_id, "✅ Build saved and charged");
                Ok(BuildOutcome::Succeeded {
                    pre_version_id,
                    post_version_id,
                    charge_id,
                })
            }
            Err(e) => {
                let details = e.to_string();
                advance(stage, BuildStage::ChargeFailed, project_id);
                warn!(
                    project_id,
                    %post_version_id,
                    error = %details,
                    "⚠️ Build saved but charge failed, needs reconciliation"
                );

                self.audit_failure(
                    project_id,
                    FailureReason::ChargeFailed,
                    pre_version_id,
                    Some(post_version_id),
                    &details,
                    principal,
                )
                .await;
                Ok(BuildOutcome::ChargeFailed {
                    pre_version_id,
                    post_version_id,
                    details,
                })
            }
        }
    }

    /// Best-effort failure audit. A failed audit write is logged and never
    /// replaces the error that caused it.
    async fn audit_failure(
        &self,
        project_id: &str,
        reason: FailureReason,
        pre_version_id: Uuid,
        post_version_id: Option<Uuid>,
        details: &str,
        principal: &Principal,
    ) -> Option<Uuid> {
        let mut metadata = serde_json::json!({
            "pre_version_id": pre_version_id.to_string(),
            "error": details,
            "requested_by": principal.user_id,
        });
        if let Some(post_version_id) = post_version_id {
            metadata["post_version_id"] = serde_json::json!(post_version_id.to_string());
        }

        match self
            .credits
            .record_failure(project_id, reason, metadata)
            .await
        {
            Ok(id) => {
                debug!(project_id, %reason, failure_id = %id, "Failure recorded");
                Some(id)
            }
            Err(e) => {
                error!(
                    project_id,
                    %reason,
                    %pre_version_id,
                    error = %e,
                    "Failed to record build failure"
                );
                None
            }
        }
    }
}

fn advance(from: BuildStage, to: BuildStage, project_id: &str) -> BuildStage {
    debug!(project_id, ?from, ?to, "Build stage transition");
    to
}
