//! Artifact key and URL composition.
//!
//! Keys are namespaced by tenant first so storage-level access control or
//! sharding can follow the same boundary as the ledger's tenant isolation.
//! A key embeds the deployment id, so every build writes fresh blobs and no
//! key is ever rewritten with different content once its deployment is done.

use crate::error::CoreError;
use crate::types::DbId;

/// Cache-Control header applied to every uploaded artifact. Content at a
/// given key never changes, so it is safe to cache forever.
pub const ARTIFACT_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Content type of every artifact blob.
pub const ARTIFACT_CONTENT_TYPE: &str = "application/json";

/// The two blobs a build produces per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The canonical resolved document served to clients.
    Screen,
    /// A debug copy for draft/QA viewing, never treated as live.
    Preview,
}

impl ArtifactKind {
    /// File stem used in the object key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Preview => "preview",
        }
    }

    /// Parse from a key segment or API parameter.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "screen" => Ok(Self::Screen),
            "preview" => Ok(Self::Preview),
            other => Err(CoreError::Validation(format!(
                "Unknown artifact kind '{other}'. Must be one of: screen, preview"
            ))),
        }
    }
}

/// Deterministic object key for a deployment artifact:
/// `deployments/{tenant}/{deployment}/{kind}.json`.
pub fn artifact_key(creator_id: DbId, deployment_id: DbId, kind: ArtifactKind) -> String {
    format!(
        "deployments/{creator_id}/{deployment_id}/{}.json",
        kind.name()
    )
}

/// Key for the canonical screen artifact.
pub fn screen_key(creator_id: DbId, deployment_id: DbId) -> String {
    artifact_key(creator_id, deployment_id, ArtifactKind::Screen)
}

/// Key for the preview artifact.
pub fn preview_key(creator_id: DbId, deployment_id: DbId) -> String {
    artifact_key(creator_id, deployment_id, ArtifactKind::Preview)
}

/// Compose the public URL for a key. Pure string composition, no I/O.
///
/// Trailing slashes on `public_base_url` are tolerated so config values like
/// `https://cdn.example.com/` and `https://cdn.example.com` behave the same.
pub fn public_url(public_base_url: &str, key: &str) -> String {
    format!("{}/{key}", public_base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_embeds_tenant_then_deployment() {
        assert_eq!(
            artifact_key(7, 42, ArtifactKind::Screen),
            "deployments/7/42/screen.json"
        );
        assert_eq!(
            artifact_key(7, 42, ArtifactKind::Preview),
            "deployments/7/42/preview.json"
        );
    }

    #[test]
    fn keys_are_distinct_per_deployment_and_kind() {
        assert_ne!(screen_key(1, 1), screen_key(1, 2));
        assert_ne!(screen_key(1, 1), screen_key(2, 1));
        assert_ne!(screen_key(1, 1), preview_key(1, 1));
    }

    #[test]
    fn public_url_handles_trailing_slash() {
        let key = screen_key(1, 2);
        assert_eq!(
            public_url("https://cdn.example.com", &key),
            "https://cdn.example.com/deployments/1/2/screen.json"
        );
        assert_eq!(
            public_url("https://cdn.example.com/", &key),
            "https://cdn.example.com/deployments/1/2/screen.json"
        );
    }

    #[test]
    fn kind_from_name() {
        assert_eq!(ArtifactKind::from_name("screen").unwrap(), ArtifactKind::Screen);
        assert_eq!(ArtifactKind::from_name("preview").unwrap(), ArtifactKind::Preview);
        assert!(ArtifactKind::from_name("thumbnail").is_err());
    }
}
