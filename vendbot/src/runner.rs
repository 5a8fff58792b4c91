//! Startup sequence: from the environment to built backend handles.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, instrument, warn};
use vendbot_config::{resolve_from_env, ResolvedConfig};
use vendbot_core::init_tracing;

use super::components::{build_backend_handles, BackendHandles};

/// Resolved configuration and the handles built from it.
pub struct Bootstrapped {
    pub config: Arc<ResolvedConfig>,
    pub handles: BackendHandles,
}

/// Startup sequence: load and resolve configuration, initialize tracing, log the masked
/// summary, build backend handles. A rejected configuration returns
/// [`vendbot_config::BootstrapError`] inside the `anyhow::Error`.
pub fn bootstrap(env_file: Option<&Path>) -> Result<Bootstrapped> {
    let config = resolve_from_env(env_file)?;
    init_tracing(&config.logging)?;
    assemble(config)
}

/// Logs the summary and builds handles for an already resolved config. Tracing is expected to
/// be initialized by the caller.
#[instrument(skip(config), fields(app = %config.app_name))]
pub fn assemble(config: ResolvedConfig) -> Result<Bootstrapped> {
    // Advisories were found before tracing existed; repeat them now.
    for warning in &config.warnings {
        warn!(field = warning.field, reason = %warning.reason, "Configuration advisory");
    }

    let summary = config.summary();
    info!(
        stage = %summary.stage,
        database = %summary.database_dsn,
        pool_size = summary.database_pool_size,
        storage = %summary.storage,
        transport = summary.transport,
        webhook = summary.webhook_endpoint.as_deref().unwrap_or("-"),
        state = summary.state,
        bot_token = %summary.bot_token,
        "Initializing bot"
    );

    let handles = build_backend_handles(&config)?;
    Ok(Bootstrapped {
        config: Arc::new(config),
        handles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendbot_config::{resolve, RawSettings};

    #[test]
    fn assemble_shares_config_and_builds_handles() {
        let config = resolve(&RawSettings::from_pairs([
            ("BOT_TOKEN", "abc"),
            ("SECRET_KEY", "xyz"),
            ("ADMIN_USER_ID", "oops"),
        ]))
        .unwrap();

        let booted = assemble(config.clone()).unwrap();

        assert_eq!(*booted.config, config);
        assert_eq!(booted.handles.database.kind(), "sqlite");
        assert_eq!(booted.config.warnings.len(), 1);
    }
}
