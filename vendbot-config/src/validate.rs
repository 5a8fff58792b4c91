//! Bootstrap validator: checks the selected backends against the stage policy and the secrets
//! guard, collecting every failure instead of stopping at the first one.

use std::path::PathBuf;

use tracing::warn;
use url::Url;
use vendbot_core::{LogLevel, LogSettings, SecretString};

use crate::database::DatabaseBackend;
use crate::failure::{FailureList, Selection, ValidationFailure};
use crate::keys;
use crate::raw::RawSettings;
use crate::resolved::ResolvedConfig;
use crate::secrets::{SecretKind, SecretsGuard};
use crate::stage::{unrecognized_stage, DeploymentStage, StagePolicy};
use crate::state::StateBackend;
use crate::storage::StorageBackend;
use crate::transport::TransportMode;

pub const DEFAULT_APP_NAME: &str = "VendBot";
pub const DEFAULT_LOG_FILE: &str = "logs/vendbot.log";

/// What the selectors produced; malformed input has already been rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedBackends {
    pub database: DatabaseBackend,
    pub storage: Selection<StorageBackend>,
    pub transport: Selection<TransportMode>,
    pub state: Selection<StateBackend>,
}

/// Runs every check and returns the resolved config, or all failures in a fixed order:
/// secrets, database, storage, transport, state, Bot API URL. An unrecognised stage value is
/// the first advisory.
pub fn validate(
    raw: &RawSettings,
    stage: DeploymentStage,
    policy: StagePolicy,
    selected: SelectedBackends,
) -> Result<ResolvedConfig, FailureList> {
    let guard = SecretsGuard::for_policy(&policy);
    let mut failures = FailureList::new();

    let bot_token = raw.get_any(&[keys::BOT_TOKEN, keys::TELEGRAM_BOT_TOKEN]);
    if let Err(failure) = guard.check(keys::BOT_TOKEN, bot_token, SecretKind::BotToken) {
        failures.push(failure.into());
    }
    let secret_key = raw.get(keys::SECRET_KEY);
    if let Err(failure) = guard.check(keys::SECRET_KEY, secret_key, SecretKind::SigningKey) {
        failures.push(failure.into());
    }

    let database = selected.database;
    if policy.requires_external_db && !database.is_external() {
        failures.push(ValidationFailure::new(
            keys::DATABASE_URL,
            format!(
                "a PostgreSQL database is required in {} stage (SQLite is not allowed)",
                stage
            ),
        ));
    }
    let database_pool_size = match raw.get(keys::DATABASE_POOL_SIZE) {
        None => database.default_pool_size(),
        Some(value) => match value.trim().parse::<u32>() {
            Ok(size) if size > 0 => size,
            _ => {
                failures.push(ValidationFailure::new(
                    keys::DATABASE_POOL_SIZE,
                    "must be a positive integer",
                ));
                database.default_pool_size()
            }
        },
    };

    let (storage, storage_failures) = selected.storage.into_parts();
    failures.extend(storage_failures);
    if let Some(storage) = &storage {
        if policy.requires_external_storage && !storage.is_external() {
            failures.push(ValidationFailure::new(
                keys::STORAGE_TYPE,
                format!(
                    "local disk storage is not allowed in {} stage; use cloudinary or s3",
                    stage
                ),
            ));
        }
    }

    let mut warnings: Vec<ValidationFailure> = unrecognized_stage(raw).into_iter().collect();

    let (transport, transport_failures) = selected.transport.into_parts();
    failures.extend(transport_failures);
    match &transport {
        Some(TransportMode::Webhook {
            public_url, secret, ..
        }) => {
            if let Some(secret) = secret {
                if let Err(failure) = guard.check(
                    keys::WEBHOOK_SECRET,
                    Some(secret.expose()),
                    SecretKind::WebhookSecret,
                ) {
                    failures.push(failure.into());
                }
            }
            if public_url.scheme() == "http" {
                warnings.push(ValidationFailure::new(
                    keys::WEBHOOK_URL,
                    "uses http; the Bot API only delivers updates to https webhooks",
                ));
            }
        }
        Some(TransportMode::Polling) if policy.requires_webhook => {
            failures.push(ValidationFailure::new(
                keys::WEBHOOK_URL,
                format!(
                    "a public webhook URL is required in {} stage (polling is not allowed)",
                    stage
                ),
            ));
        }
        _ => {}
    }

    let (state, state_failures) = selected.state.into_parts();
    failures.extend(state_failures);
    if let Some(StateBackend::Memory) = &state {
        if policy.requires_state_backend {
            failures.push(ValidationFailure::new(
                keys::REDIS_URL,
                format!(
                    "a Redis state backend is required in {} stage (in-memory state is lost on restart)",
                    stage
                ),
            ));
        }
    }

    let api_url_setting = [keys::TELEGRAM_API_URL, keys::TELOXIDE_API_URL]
        .into_iter()
        .find_map(|key| raw.get(key).map(|value| (key, value)));
    let telegram_api_url = match api_url_setting {
        None => None,
        Some((key, value)) => match Url::parse(value.trim()) {
            Ok(url) => Some(url),
            Err(_) => {
                failures.push(ValidationFailure::new(key, "is set but not a valid URL"));
                None
            }
        },
    };

    let admin_user_id = parse_admin_user_id(raw, &mut warnings);
    let sentry_dsn = parse_sentry_dsn(raw, &mut warnings);
    let logging = parse_log_settings(raw, &mut warnings);

    for warning in &warnings {
        warn!(field = warning.field, reason = %warning.reason, "Configuration advisory");
    }

    if !failures.is_empty() {
        return Err(failures);
    }
    let (Some(storage), Some(transport), Some(state), Some(bot_token), Some(secret_key)) =
        (storage, transport, state, bot_token, secret_key)
    else {
        return Err(failures);
    };

    Ok(ResolvedConfig {
        app_name: raw
            .get(keys::APP_NAME)
            .unwrap_or(DEFAULT_APP_NAME)
            .trim()
            .to_string(),
        stage,
        policy,
        database,
        database_pool_size,
        storage,
        transport,
        state,
        bot_token: SecretString::from(bot_token.trim()),
        secret_key: SecretString::from(secret_key.trim()),
        telegram_api_url,
        admin_user_id,
        logging,
        sentry_dsn,
        warnings,
    })
}

/// ADMIN_USER_ID is advisory: a non-numeric value is ignored with a warning.
fn parse_admin_user_id(raw: &RawSettings, warnings: &mut Vec<ValidationFailure>) -> Option<i64> {
    let value = raw.get(keys::ADMIN_USER_ID)?;
    match value.trim().parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            warnings.push(ValidationFailure::new(
                keys::ADMIN_USER_ID,
                "must be a positive numeric user id; ignored",
            ));
            None
        }
    }
}

/// SENTRY_DSN is advisory: `https://<public_key>@<host>/<project>`; anything else disables
/// error monitoring with a warning.
fn parse_sentry_dsn(
    raw: &RawSettings,
    warnings: &mut Vec<ValidationFailure>,
) -> Option<SecretString> {
    let value = raw.get(keys::SENTRY_DSN)?.trim();
    let valid = Url::parse(value).ok().map_or(false, |url| {
        matches!(url.scheme(), "http" | "https")
            && !url.username().is_empty()
            && url.host_str().is_some()
    });
    if valid {
        Some(SecretString::from(value))
    } else {
        warnings.push(ValidationFailure::new(
            keys::SENTRY_DSN,
            "is not a valid DSN; error monitoring disabled",
        ));
        None
    }
}

fn parse_log_settings(raw: &RawSettings, warnings: &mut Vec<ValidationFailure>) -> LogSettings {
    let level = match raw.get(keys::LOG_LEVEL) {
        None => LogLevel::Info,
        Some(value) => LogLevel::parse(value).unwrap_or_else(|| {
            warnings.push(ValidationFailure::new(
                keys::LOG_LEVEL,
                "must be one of DEBUG, INFO, WARNING, ERROR; using INFO",
            ));
            LogLevel::Info
        }),
    };
    let file = PathBuf::from(raw.get(keys::LOG_FILE).unwrap_or(DEFAULT_LOG_FILE).trim());
    let json = raw
        .get(keys::LOG_JSON)
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    LogSettings {
        level,
        file: Some(file),
        json,
    }
}
