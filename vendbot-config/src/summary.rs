//! Masked configuration summary for startup logs and `vendbot show`.

use std::fmt;

use serde::Serialize;
use vendbot_core::LogLevel;

use crate::failure::ValidationFailure;
use crate::resolved::ResolvedConfig;
use crate::stage::DeploymentStage;
use crate::storage::{parse_cloudinary_url, StorageBackend, StorageKind};
use crate::transport::TransportMode;

/// What was resolved, safe to print: DSNs have passwords masked, secrets show at most their
/// last four characters.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub app_name: String,
    pub stage: DeploymentStage,
    pub database: &'static str,
    pub database_dsn: String,
    pub database_pool_size: u32,
    pub storage: StorageKind,
    pub storage_location: String,
    pub transport: &'static str,
    pub webhook_endpoint: Option<String>,
    pub webhook_secret_set: bool,
    pub state: &'static str,
    pub state_url: Option<String>,
    pub log_level: LogLevel,
    pub log_file: Option<String>,
    pub log_json: bool,
    pub admin_user_id: Option<i64>,
    pub sentry_enabled: bool,
    pub telegram_api_url: Option<String>,
    pub bot_token: String,
    pub secret_key: String,
    pub warnings: Vec<ValidationFailure>,
}

impl ConfigSummary {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let storage_location = match &config.storage {
            StorageBackend::LocalDisk { root_dir } => root_dir.display().to_string(),
            StorageBackend::Cloudinary { url } => parse_cloudinary_url(url.expose())
                .map(|c| c.cloud_name)
                .unwrap_or_default(),
            StorageBackend::S3 { bucket, region, .. } => format!("s3://{} ({})", bucket, region),
        };
        let webhook_secret_set = matches!(
            &config.transport,
            TransportMode::Webhook {
                secret: Some(_),
                ..
            }
        );

        Self {
            app_name: config.app_name.clone(),
            stage: config.stage,
            database: config.database.kind(),
            database_dsn: config.database.redacted_dsn(),
            database_pool_size: config.database_pool_size,
            storage: config.storage.kind(),
            storage_location,
            transport: config.transport.kind(),
            webhook_endpoint: config.transport.endpoint(),
            webhook_secret_set,
            state: config.state.kind(),
            state_url: config.state.redacted_url(),
            log_level: config.logging.level,
            log_file: config.logging.file.as_ref().map(|p| p.display().to_string()),
            log_json: config.logging.json,
            admin_user_id: config.admin_user_id,
            sentry_enabled: config.sentry_dsn.is_some(),
            telegram_api_url: config.telegram_api_url.as_ref().map(|u| u.to_string()),
            bot_token: config.bot_token.masked(),
            secret_key: config.secret_key.masked(),
            warnings: config.warnings.clone(),
        }
    }
}

impl fmt::Display for ConfigSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} configuration ({})", self.app_name, self.stage)?;
        writeln!(
            f,
            "  database:  {} {} (pool {})",
            self.database, self.database_dsn, self.database_pool_size
        )?;
        writeln!(f, "  storage:   {} {}", self.storage, self.storage_location)?;
        match &self.webhook_endpoint {
            Some(endpoint) => writeln!(
                f,
                "  transport: {} {}{}",
                self.transport,
                endpoint,
                if self.webhook_secret_set { " (secret set)" } else { "" }
            )?,
            None => writeln!(f, "  transport: {}", self.transport)?,
        }
        match &self.state_url {
            Some(url) => writeln!(f, "  state:     {} {}", self.state, url)?,
            None => writeln!(f, "  state:     {}", self.state)?,
        }
        writeln!(
            f,
            "  logging:   {}{}{}",
            self.log_level,
            self.log_file
                .as_deref()
                .map(|p| format!(" -> {}", p))
                .unwrap_or_default(),
            if self.log_json { " (json)" } else { "" }
        )?;
        if let Some(url) = &self.telegram_api_url {
            writeln!(f, "  bot api:   {}", url)?;
        }
        writeln!(
            f,
            "  admin:     {}",
            self.admin_user_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "not set".to_string())
        )?;
        writeln!(
            f,
            "  sentry:    {}",
            if self.sentry_enabled { "enabled" } else { "disabled" }
        )?;
        writeln!(f, "  BOT_TOKEN: {}", self.bot_token)?;
        write!(f, "  SECRET_KEY: {}", self.secret_key)?;
        for warning in &self.warnings {
            write!(f, "\n  warning:   {}", warning)?;
        }
        Ok(())
    }
}
