//! Snapshot payloads stored inside versions.
//!
//! A snapshot is opaque structured content plus a SHA-256 digest of its
//! JSON serialization, so two versions can be compared without decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{Principal, VersionKind};

/// Content produced by a generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSite {
    /// Structured site content.
    pub content: serde_json::Value,

    /// When the generator produced the content.
    pub generated_at: DateTime<Utc>,
}

impl GeneratedSite {
    /// Wrap content generated now.
    pub fn new(content: serde_json::Value) -> Self {
        Self {
            content,
            generated_at: Utc::now(),
        }
    }
}

/// Immutable snapshot payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The payload.
    pub payload: serde_json::Value,

    /// Hex-encoded SHA-256 of the payload.
    pub digest: String,
}

impl Snapshot {
    /// Wrap an arbitrary payload.
    pub fn new(payload: serde_json::Value) -> Self {
        let digest = content_digest(&payload);
        Self { payload, digest }
    }

    /// Marker recorded before generation starts.
    pub fn pre_build(prompt: &str, principal: &Principal) -> Self {
        Self::new(serde_json::json!({
            "kind": VersionKind::PreBuild,
            "prompt": prompt,
            "requested_by": principal.user_id,
            "taken_at": Utc::now(),
        }))
    }

    /// Snapshot of a generated site.
    pub fn post_build(
        prompt: &str,
        principal: &Principal,
        generator: &str,
        site: &GeneratedSite,
    ) -> Self {
        Self::new(serde_json::json!({
            "kind": VersionKind::PostBuild,
            "prompt": prompt,
            "requested_by": principal.user_id,
            "generator": generator,
            "result": site.content,
            "generated_at": site.generated_at,
            "taken_at": Utc::now(),
        }))
    }

    /// Returns true if the stored digest matches the payload.
    pub fn verify(&self) -> bool {
        content_digest(&self.payload) == self.digest
    }

    /// The `prompt` field of the payload, if present.
    pub fn prompt(&self) -> Option<&str> {
        self.payload.get("prompt").and_then(|p| p.as_str())
    }
}

/// Hex-encoded SHA-256 of a JSON value.
pub fn content_digest(value: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.to_string().as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_build_snapshot() {
        let principal = Principal::new("u1");
        let snapshot = Snapshot::pre_build("Bakery site", &principal);

        assert_eq!(snapshot.payload["kind"], "pre_build");
        assert_eq!(snapshot.prompt(), Some("Bakery site"));
        assert_eq!(snapshot.payload["requested_by"], "u1");
        assert_eq!(snapshot.digest.len(), 64);
        assert!(snapshot.verify());
    }

    #[test]
    fn test_post_build_snapshot_carries_result() {
        let principal = Principal::new("u1");
        let site = GeneratedSite::new(serde_json::json!({"title": "Bakery"}));
        let snapshot = Snapshot::post_build("Bakery site", &principal, "template", &site);

        assert_eq!(snapshot.payload["kind"], "post_build");
        assert_eq!(snapshot.payload["result"]["title"], "Bakery");
        assert_eq!(snapshot.payload["generator"], "template");
    }

    #[test]
    fn test_tampered_snapshot_fails_verification() {
        let mut snapshot = Snapshot::new(serde_json::json!({"a": 1}));
        snapshot.payload["a"] = serde_json::json!(2);
        assert!(!snapshot.verify());
    }
}
