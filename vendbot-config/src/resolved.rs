//! The validated, immutable configuration handed to the bot runtime.

use url::Url;
use vendbot_core::{LogSettings, SecretString};

use crate::database::DatabaseBackend;
use crate::failure::ValidationFailure;
use crate::stage::{DeploymentStage, StagePolicy};
use crate::state::StateBackend;
use crate::storage::StorageBackend;
use crate::summary::ConfigSummary;
use crate::transport::TransportMode;

/// Result of a successful resolution run. Built once per process start and shared read-only
/// (`Arc<ResolvedConfig>`); a reload builds a new value instead of patching this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// APP_NAME
    pub app_name: String,
    pub stage: DeploymentStage,
    pub policy: StagePolicy,
    pub database: DatabaseBackend,
    /// DATABASE_POOL_SIZE, or the engine default.
    pub database_pool_size: u32,
    pub storage: StorageBackend,
    pub transport: TransportMode,
    pub state: StateBackend,
    /// BOT_TOKEN or TELEGRAM_BOT_TOKEN
    pub bot_token: SecretString,
    /// SECRET_KEY
    pub secret_key: SecretString,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<Url>,
    /// ADMIN_USER_ID
    pub admin_user_id: Option<i64>,
    pub logging: LogSettings,
    /// SENTRY_DSN
    pub sentry_dsn: Option<SecretString>,
    /// Advisory findings that did not block startup.
    pub warnings: Vec<ValidationFailure>,
}

impl ResolvedConfig {
    pub fn is_production(&self) -> bool {
        self.stage == DeploymentStage::Production
    }

    /// Operator-facing view with every secret masked.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary::from_config(self)
    }
}
