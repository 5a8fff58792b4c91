//! Deployment stage resolution and per-stage policy.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::failure::ValidationFailure;
use crate::keys;
use crate::raw::RawSettings;

/// Deployment environment class. Matches .env `DEPLOYMENT_STAGE`: local | cloud | production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStage {
    #[default]
    Local,
    Cloud,
    Production,
}

/// What a stage demands from the selected backends. Checked by the bootstrap validator,
/// never by the selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StagePolicy {
    pub requires_webhook: bool,
    pub requires_external_db: bool,
    pub requires_external_storage: bool,
    pub requires_state_backend: bool,
    /// Bot token and signing key must pass the shape heuristic, not just be present.
    pub strict_secrets: bool,
}

impl DeploymentStage {
    pub const ALL: [DeploymentStage; 3] = [Self::Local, Self::Cloud, Self::Production];

    /// Matches a canonical stage name (trimmed, case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "cloud" => Some(Self::Cloud),
            "production" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
            Self::Production => "production",
        }
    }

    pub const fn policy(self) -> StagePolicy {
        match self {
            Self::Local => StagePolicy {
                requires_webhook: false,
                requires_external_db: false,
                requires_external_storage: false,
                requires_state_backend: false,
                strict_secrets: false,
            },
            Self::Cloud => StagePolicy {
                requires_webhook: false,
                requires_external_db: false,
                requires_external_storage: false,
                requires_state_backend: true,
                strict_secrets: true,
            },
            Self::Production => StagePolicy {
                requires_webhook: true,
                requires_external_db: true,
                requires_external_storage: true,
                requires_state_backend: true,
                strict_secrets: true,
            },
        }
    }
}

impl fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the stage from `DEPLOYMENT_STAGE` (falling back to `ENVIRONMENT`). Missing or
/// unknown values resolve to `Local` so local development works with zero configuration.
pub fn resolve_stage(raw: &RawSettings) -> (DeploymentStage, StagePolicy) {
    let stage = match stage_setting(raw) {
        None => DeploymentStage::Local,
        Some((key, value)) => DeploymentStage::parse(value).unwrap_or_else(|| {
            warn!(key, value = %value, "Unknown deployment stage, using local");
            DeploymentStage::Local
        }),
    };
    (stage, stage.policy())
}

/// Advisory for a stage value that is set but not recognised, named after the key it came
/// from.
pub fn unrecognized_stage(raw: &RawSettings) -> Option<ValidationFailure> {
    let (key, value) = stage_setting(raw)?;
    DeploymentStage::parse(value).is_none().then(|| {
        ValidationFailure::new(
            key,
            "is not one of local, cloud, production; using local (no webhook, database, storage or secret requirements)",
        )
    })
}

fn stage_setting(raw: &RawSettings) -> Option<(&'static str, &str)> {
    [keys::DEPLOYMENT_STAGE, keys::ENVIRONMENT]
        .into_iter()
        .find_map(|key| raw.get(key).map(|value| (key, value)))
}
